use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("not found")]
    NotFound,

    #[error("account '{0}' not found")]
    AccountNotFound(String),

    #[error("no namespace found at path '{0}'")]
    NamespaceNotFound(String),

    #[error("unknown sequence '{0}'")]
    SequenceNotFound(String),

    /// Write rejected by the host validation rules.
    #[error("{}", .0.join(", "))]
    Validation(Vec<String>),

    /// The write was accepted but the stored password does not verify.
    #[error("password verification failed for account '{0}'")]
    PasswordVerification(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("token lookup collision")]
    TokenLookupCollision,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
