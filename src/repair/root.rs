use std::io::Write;

use chrono::Utc;
use tracing::info;

use super::NamespaceLink;
use crate::auth::SecretHasher;
use crate::config::{PasswordSource, SetupConfig, resolve_password};
use crate::error::{Error, Result};
use crate::store::{Ensured, Store, WriteMode};
use crate::types::User;

#[derive(Debug, Clone)]
pub struct SetupReport {
    pub user: User,
    pub user_created: bool,
    pub namespace_created: bool,
    pub password_source: PasswordSource,
    pub namespace: NamespaceLink,
}

/// Provisions the root namespace and account and (re)applies the root
/// password.
///
/// Both writes to the account go through [`WriteMode::SkipValidation`]: the
/// account is created pre-confirmed and the password is set whatever the host
/// rules say. The password is then checked against a fresh read of the row,
/// so an accepted but unusable write surfaces as
/// [`Error::PasswordVerification`] rather than as a validation failure.
pub fn setup_root<S: Store, W: Write>(
    store: &S,
    config: &SetupConfig,
    out: &mut W,
) -> Result<SetupReport> {
    let root = &config.root;
    let (password, password_source) =
        resolve_password(config.password_env.as_deref(), &config.password_file)?;
    info!(source = %password_source, "resolved root password");

    let namespace = store.ensure_namespace(&root.namespace_seed())?;
    let namespace_created = namespace.was_created();
    match &namespace {
        Ensured::Existing(_) => writeln!(out, "Namespace already exists")?,
        Ensured::Created(_) => {
            writeln!(out, "Creating namespace via database...")?;
            writeln!(out, "Namespace created via database")?;
        }
        Ensured::Conflicting(ns) => {
            writeln!(out, "Creating namespace via database...")?;
            writeln!(
                out,
                "Namespace id {} already taken by '{}'; only its name was updated",
                ns.id, ns.path
            )?;
        }
    }

    let hasher = SecretHasher::new()?;
    let digest = hasher.hash(&password)?;

    let ensured = store.ensure_user(&root.new_user(digest.clone()), WriteMode::SkipValidation)?;
    let user_created = ensured.was_created();
    if user_created {
        writeln!(out, "Root user created")?;
    } else {
        writeln!(out, "Root user already exists")?;
    }

    let mut user = ensured.into_inner();
    user.encrypted_password = digest;
    user.updated_at = Utc::now();
    store.save_user(&user, WriteMode::SkipValidation)?;

    let user = store
        .get_user(user.id)?
        .ok_or_else(|| Error::AccountNotFound(root.username.clone()))?;
    if !hasher.verify(&password, &user.encrypted_password)? {
        return Err(Error::PasswordVerification(user.username));
    }
    writeln!(out, "Root user has functional password")?;

    let namespace = NamespaceLink::resolve(store, user.id, &root.namespace_path)?;
    match &namespace {
        NamespaceLink::Linked(ns) => writeln!(out, "Root user has namespace: {}", ns.path)?,
        NamespaceLink::Unlinked { in_table: true } => writeln!(
            out,
            "Namespace not linked via association, but exists in database"
        )?,
        NamespaceLink::Unlinked { in_table: false } => writeln!(
            out,
            "Namespace not linked via association and missing from database"
        )?,
    }

    writeln!(out, "Root user setup completed")?;

    Ok(SetupReport {
        user,
        user_created,
        namespace_created,
        password_source,
        namespace,
    })
}
