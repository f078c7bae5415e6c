use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use super::Scopes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceKind {
    User,
    Group,
}

impl NamespaceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Group => "Group",
        }
    }
}

impl fmt::Display for NamespaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NamespaceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "User" => Ok(Self::User),
            "Group" => Ok(Self::Group),
            other => Err(format!("unknown namespace type '{other}'")),
        }
    }
}

/// Visibility levels as stored in `namespaces.visibility_level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Private,
    Internal,
    Public,
}

impl Visibility {
    #[must_use]
    pub const fn level(self) -> i32 {
        match self {
            Self::Private => 0,
            Self::Internal => 10,
            Self::Public => 20,
        }
    }

    #[must_use]
    pub const fn from_level(level: i32) -> Self {
        match level {
            20.. => Self::Public,
            10..=19 => Self::Internal,
            _ => Self::Private,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Namespace {
    pub id: i64,
    pub name: String,
    pub path: String,
    pub owner_id: Option<i64>,
    pub kind: NamespaceKind,
    pub visibility: Visibility,
    pub shared_runners_enabled: bool,
    pub project_creation_level: i32,
    pub organization_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub name: String,
    pub encrypted_password: String,
    pub admin: bool,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An account that has not been written yet.
///
/// `id` is normally `None` so the row draws from `users_id_seq`; bootstrap
/// code pins it to a fixed value.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Option<i64>,
    pub username: String,
    pub email: String,
    pub name: String,
    pub encrypted_password: String,
    pub admin: bool,
    pub confirmed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct AccessToken {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub scopes: Scopes,
    pub token_digest: String,
    pub token_lookup: String,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewAccessToken {
    pub user_id: i64,
    pub name: String,
    pub scopes: Scopes,
    pub token_digest: String,
    pub token_lookup: String,
    pub expires_at: DateTime<Utc>,
}
