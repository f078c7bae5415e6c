use std::io;
use std::path::Path;

use crate::repair::fix_sequences;

use super::init_store;

pub fn run_fix_sequences(data_dir: String) -> anyhow::Result<()> {
    let store = init_store(Path::new(&data_dir))?;
    fix_sequences(&store, &mut io::stdout().lock())?;
    Ok(())
}
