mod commands;
mod root;
mod sequences;
mod token;

pub use commands::Commands;
pub use root::{run_setup_root, run_verify_namespace};
pub use sequences::run_fix_sequences;
pub use token::run_issue_token;

use std::path::Path;

use crate::config::DB_FILE_NAME;
use crate::store::{SqliteStore, Store};

/// Creates the data directory and schema. Existing data is left untouched.
pub fn run_init(data_dir: String) -> anyhow::Result<()> {
    let data_path: std::path::PathBuf = data_dir.into();
    std::fs::create_dir_all(&data_path)?;

    let db_path = data_path.join(DB_FILE_NAME);
    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;

    println!("Database initialized at {}", db_path.display());
    Ok(())
}

/// Opens the store in an existing data directory.
pub fn init_store(data_dir: &Path) -> anyhow::Result<SqliteStore> {
    let db_path = data_dir.join(DB_FILE_NAME);

    if !db_path.exists() {
        anyhow::bail!(
            "Database not found at {}. Run 'rootstrap init' first.",
            db_path.display()
        );
    }

    SqliteStore::new(&db_path).map_err(Into::into)
}
