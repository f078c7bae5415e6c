use std::io;
use std::path::Path;

use crate::config::RootAccount;
use crate::error::Error;
use crate::repair::issue_token;

use super::init_store;

pub fn run_issue_token(data_dir: String, prefix: String, scopes: String) -> anyhow::Result<()> {
    let store = init_store(Path::new(&data_dir))?;
    let root = RootAccount::default();

    match issue_token(&store, &root.username, &prefix, &scopes, &mut io::stdout().lock()) {
        Ok(_) => Ok(()),
        Err(Error::Validation(messages)) => {
            // Printed bare, without anyhow's "Error: " prefix.
            eprintln!("Token creation failed: {}", messages.join(", "));
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}
