use std::io::Write;

use super::NamespaceLink;
use crate::config::RootAccount;
use crate::error::{Error, Result};
use crate::store::Store;

/// Read-only check that the root account can reach its namespace, either
/// through its owner reference or, failing that, by the reserved path.
pub fn verify_namespace<S: Store, W: Write>(
    store: &S,
    root: &RootAccount,
    out: &mut W,
) -> Result<NamespaceLink> {
    let user = store
        .get_user_by_username(&root.username)?
        .ok_or_else(|| Error::AccountNotFound(root.username.clone()))?;

    if let Some(ns) = store.get_user_namespace(user.id)? {
        writeln!(out, "Root user namespace verified: {}", ns.path)?;
        return Ok(NamespaceLink::Linked(ns));
    }

    writeln!(out, "Root user namespace not linked yet")?;
    writeln!(out, "Checking for existing root namespace...")?;

    if store.get_namespace_by_path(&root.namespace_path)?.is_none() {
        return Err(Error::NamespaceNotFound(root.namespace_path.clone()));
    }

    writeln!(out, "Root namespace exists in database")?;
    writeln!(out, "The user can still create projects via API")?;
    Ok(NamespaceLink::Unlinked { in_table: true })
}
