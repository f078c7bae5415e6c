use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::Result;

use super::FALLBACK_PASSWORD;

/// Where the effective root password came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordSource {
    Environment,
    File(PathBuf),
    Fallback,
}

impl fmt::Display for PasswordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Environment => f.write_str("environment"),
            Self::File(path) => write!(f, "file {}", path.display()),
            Self::Fallback => f.write_str("built-in default"),
        }
    }
}

/// Picks the root password: environment value, then the trimmed file
/// contents, then the fallback. Blank values fall through.
pub fn resolve_password(env_value: Option<&str>, file: &Path) -> Result<(String, PasswordSource)> {
    if let Some(value) = env_value.filter(|v| !v.trim().is_empty()) {
        return Ok((value.to_string(), PasswordSource::Environment));
    }

    match fs::read_to_string(file) {
        Ok(contents) => {
            let trimmed = contents.trim();
            if !trimmed.is_empty() {
                return Ok((trimmed.to_string(), PasswordSource::File(file.to_path_buf())));
            }
            tracing::warn!("password file {} is empty, ignoring it", file.display());
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    Ok((FALLBACK_PASSWORD.to_string(), PasswordSource::Fallback))
}
