use rand::Rng;

use super::SecretHasher;
use crate::error::Result;

const TOKEN_PREFIX: &str = "rst";
const LOOKUP_LENGTH: usize = 8;
const SECRET_BYTES: usize = 12;

/// A freshly minted token. `raw` is never persisted.
pub struct MintedToken {
    pub raw: String,
    pub lookup: String,
    pub digest: String,
}

pub struct TokenGenerator {
    hasher: SecretHasher,
}

impl TokenGenerator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            hasher: SecretHasher::new()?,
        })
    }

    /// Mints a token of the form `rst_<lookup>_<secret>`.
    pub fn generate(&self) -> Result<MintedToken> {
        let lookup = generate_lookup();
        let raw = format!("{TOKEN_PREFIX}_{lookup}_{}", generate_secret());
        let digest = self.hasher.hash(&raw)?;
        Ok(MintedToken {
            raw,
            lookup,
            digest,
        })
    }

    pub fn verify(&self, raw: &str, digest: &str) -> Result<bool> {
        self.hasher.verify(raw, digest)
    }
}

fn generate_lookup() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..LOOKUP_LENGTH].to_string()
}

fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::thread_rng().fill(&mut bytes);
    hex::encode(bytes)
}
