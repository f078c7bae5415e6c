use std::io;
use std::path::PathBuf;

use crate::config::{PASSWORD_ENV_VAR, RootAccount, SetupConfig};
use crate::repair::{setup_root, verify_namespace};

use super::init_store;

pub fn run_setup_root(data_dir: String, password_file: String) -> anyhow::Result<()> {
    let config = SetupConfig {
        data_dir: PathBuf::from(data_dir),
        password_file: PathBuf::from(password_file),
        password_env: std::env::var(PASSWORD_ENV_VAR).ok(),
        root: RootAccount::default(),
    };

    let store = init_store(&config.data_dir)?;
    setup_root(&store, &config, &mut io::stdout().lock())?;
    Ok(())
}

pub fn run_verify_namespace(data_dir: String) -> anyhow::Result<()> {
    let store = init_store(&PathBuf::from(data_dir))?;
    verify_namespace(&store, &RootAccount::default(), &mut io::stdout().lock())?;
    Ok(())
}
