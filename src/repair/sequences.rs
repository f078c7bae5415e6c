use std::io::Write;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::store::Store;

/// Sequences checked by [`fix_sequences`], in order. Each backs the `id`
/// column of the table named by dropping the `_id_seq` suffix.
pub const REPAIRED_SEQUENCES: &[&str] = &["namespaces_id_seq", "projects_id_seq", "users_id_seq"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceFix {
    pub sequence: &'static str,
    pub next_value: i64,
}

/// Moves each sequence past its table's highest id so the next generated
/// id cannot collide with rows written around the generator.
///
/// Empty tables are left alone. The first failing query aborts the run.
pub fn fix_sequences<S: Store, W: Write>(store: &S, out: &mut W) -> Result<Vec<SequenceFix>> {
    let mut fixes = Vec::new();

    for &sequence in REPAIRED_SEQUENCES {
        let table = sequence
            .strip_suffix("_id_seq")
            .ok_or_else(|| Error::Config(format!("malformed sequence name '{sequence}'")))?;

        let max_id = store.max_id(table)?.unwrap_or(0);
        if max_id <= 0 {
            debug!(sequence, table, "table empty, sequence untouched");
            continue;
        }

        let next_value = max_id + 1;
        store.set_sequence(sequence, next_value)?;
        writeln!(out, "Fixed {sequence} (set to {next_value})")?;
        info!(sequence, next_value, "sequence reset");

        fixes.push(SequenceFix {
            sequence,
            next_value,
        });
    }

    writeln!(out, "Database sequences initialized")?;
    Ok(fixes)
}
