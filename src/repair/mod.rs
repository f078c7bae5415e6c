//! Bootstrap and repair steps.
//!
//! Every step reads current state through a [`Store`](crate::store::Store),
//! decides whether to act, writes at most once per entity and reports
//! progress as plain lines on the writer it is given. Steps never share
//! state and the first error aborts the step.

mod namespace;
mod root;
mod sequences;
mod token;

pub use namespace::verify_namespace;
pub use root::{SetupReport, setup_root};
pub use sequences::{REPAIRED_SEQUENCES, SequenceFix, fix_sequences};
pub use token::{TOKEN_LIFETIME_DAYS, issue_token};

use crate::error::Result;
use crate::store::Store;
use crate::types::Namespace;

/// How an account's personal namespace was found.
#[derive(Debug, Clone)]
pub enum NamespaceLink {
    /// Resolved through the account's owner reference.
    Linked(Namespace),
    /// No owned namespace; `in_table` records whether a row with the
    /// reserved path exists anyway.
    Unlinked { in_table: bool },
}

impl NamespaceLink {
    fn resolve<S: Store>(store: &S, user_id: i64, path: &str) -> Result<Self> {
        if let Some(ns) = store.get_user_namespace(user_id)? {
            return Ok(Self::Linked(ns));
        }
        let in_table = store.get_namespace_by_path(path)?.is_some();
        Ok(Self::Unlinked { in_table })
    }
}
