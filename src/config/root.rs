use std::path::PathBuf;

use crate::store::NamespaceSeed;
use crate::types::{NamespaceKind, NewUser, Visibility};

/// Identity of the administrative account and its personal namespace.
///
/// The defaults are the values a fresh deployment expects; ids are pinned so
/// that other records can reference them before the rows exist.
#[derive(Debug, Clone)]
pub struct RootAccount {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub name: String,
    pub namespace_id: i64,
    pub namespace_path: String,
    pub organization_id: i64,
}

impl Default for RootAccount {
    fn default() -> Self {
        Self {
            user_id: 1,
            username: "root".to_string(),
            email: "admin@example.com".to_string(),
            name: "Administrator".to_string(),
            namespace_id: 1,
            namespace_path: "root".to_string(),
            organization_id: 1,
        }
    }
}

impl RootAccount {
    #[must_use]
    pub fn namespace_seed(&self) -> NamespaceSeed {
        NamespaceSeed {
            id: self.namespace_id,
            name: self.name.clone(),
            path: self.namespace_path.clone(),
            owner_id: self.user_id,
            kind: NamespaceKind::User,
            visibility: Visibility::Public,
            shared_runners_enabled: true,
            project_creation_level: 20,
            organization_id: self.organization_id,
        }
    }

    /// A confirmed admin account carrying `encrypted_password`.
    #[must_use]
    pub fn new_user(&self, encrypted_password: String) -> NewUser {
        NewUser {
            id: Some(self.user_id),
            username: self.username.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            encrypted_password,
            admin: true,
            confirmed_at: Some(chrono::Utc::now()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SetupConfig {
    pub data_dir: PathBuf,
    pub password_file: PathBuf,
    /// Value of the password environment variable, if set.
    pub password_env: Option<String>,
    pub root: RootAccount,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            password_file: PathBuf::from(super::DEFAULT_PASSWORD_FILE),
            password_env: None,
            root: RootAccount::default(),
        }
    }
}
