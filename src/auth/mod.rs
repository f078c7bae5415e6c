mod secret;
mod token;

pub use secret::SecretHasher;
pub use token::{MintedToken, TokenGenerator};
