mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Whether a write runs the host validation rules first.
///
/// `SkipValidation` is the bootstrap shortcut for records whose invariants
/// are guaranteed by the caller. It must always be requested explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Validated,
    SkipValidation,
}

/// Result of an idempotent find-or-create keyed by a natural key.
#[derive(Debug, Clone)]
pub enum Ensured<T> {
    Created(T),
    Existing(T),
    /// The natural key was free but the pinned id belongs to another record,
    /// which is returned as found after the upsert touched it.
    Conflicting(T),
}

impl<T> Ensured<T> {
    #[must_use]
    pub fn was_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Created(v) | Self::Existing(v) | Self::Conflicting(v) => v,
        }
    }
}

/// Row values for a namespace inserted by bootstrap code. `id` is pinned.
#[derive(Debug, Clone)]
pub struct NamespaceSeed {
    pub id: i64,
    pub name: String,
    pub path: String,
    pub owner_id: i64,
    pub kind: NamespaceKind,
    pub visibility: Visibility,
    pub shared_runners_enabled: bool,
    pub project_creation_level: i32,
    pub organization_id: i64,
}

/// Store defines the database interface the repair steps run against.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // Namespace operations
    fn get_namespace(&self, id: i64) -> Result<Option<Namespace>>;
    fn get_namespace_by_path(&self, path: &str) -> Result<Option<Namespace>>;
    /// Resolves the account's personal namespace through its owner reference.
    fn get_user_namespace(&self, user_id: i64) -> Result<Option<Namespace>>;
    /// Finds the namespace at `seed.path`, or upserts `seed` by id.
    fn ensure_namespace(&self, seed: &NamespaceSeed) -> Result<Ensured<Namespace>>;

    // User operations
    fn get_user(&self, id: i64) -> Result<Option<User>>;
    fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    /// Finds the account named `user.username`, or inserts `user`.
    fn ensure_user(&self, user: &NewUser, mode: WriteMode) -> Result<Ensured<User>>;
    fn save_user(&self, user: &User, mode: WriteMode) -> Result<()>;

    // Token operations
    fn create_token(&self, token: &NewAccessToken) -> Result<AccessToken>;
    fn list_user_tokens(&self, user_id: i64) -> Result<Vec<AccessToken>>;

    // Sequence operations
    fn next_id(&self, sequence: &str) -> Result<i64>;
    fn sequence_value(&self, sequence: &str) -> Result<i64>;
    /// Sets the value the next `next_id` call returns.
    fn set_sequence(&self, sequence: &str, next_value: i64) -> Result<()>;
    /// Returns `MAX(id)` of `table`, or None when the table is empty.
    fn max_id(&self, table: &str) -> Result<Option<i64>>;
}
