mod password;
mod root;

pub use password::{PasswordSource, resolve_password};
pub use root::{RootAccount, SetupConfig};

pub const DB_FILE_NAME: &str = "rootstrap.db";
pub const PASSWORD_ENV_VAR: &str = "ROOTSTRAP_PASSWORD";
pub const DEFAULT_PASSWORD_FILE: &str = "/etc/rootstrap/initial_root_password/password";
pub const FALLBACK_PASSWORD: &str = "changeme";
