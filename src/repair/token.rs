use std::io::Write;

use chrono::{Duration, Utc};
use tracing::{info, warn};

use crate::auth::TokenGenerator;
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{AccessToken, NewAccessToken, Scopes, Validate};

pub const TOKEN_LIFETIME_DAYS: i64 = 365;

const MAX_MINT_ATTEMPTS: usize = 3;

/// Mints an access token for `username` named `<prefix>-<unix epoch>`.
///
/// The raw token is written to `out` on a line of its own and is not
/// recoverable afterwards. Scope parse errors and token validation errors are
/// reported together as one [`Error::Validation`].
pub fn issue_token<S: Store, W: Write>(
    store: &S,
    username: &str,
    prefix: &str,
    scopes: &str,
    out: &mut W,
) -> Result<AccessToken> {
    let user = store
        .get_user_by_username(username)?
        .ok_or_else(|| Error::AccountNotFound(username.to_string()))?;

    let now = Utc::now();
    let (scopes, mut errors) = Scopes::parse_list(scopes);

    let draft = NewAccessToken {
        user_id: user.id,
        name: format!("{prefix}-{}", now.timestamp()),
        scopes,
        token_digest: String::new(),
        token_lookup: String::new(),
        expires_at: now + Duration::days(TOKEN_LIFETIME_DAYS),
    };
    errors.extend(draft.errors());
    if !errors.is_empty() {
        return Err(Error::Validation(errors));
    }

    let generator = TokenGenerator::new()?;

    for attempt in 1..=MAX_MINT_ATTEMPTS {
        let minted = generator.generate()?;
        let request = NewAccessToken {
            token_digest: minted.digest,
            token_lookup: minted.lookup,
            ..draft.clone()
        };

        match store.create_token(&request) {
            Ok(token) => {
                writeln!(out, "{}", minted.raw)?;
                info!(
                    token_id = token.id,
                    name = %token.name,
                    scopes = %token.scopes,
                    expires_at = %token.expires_at,
                    "issued access token"
                );
                return Ok(token);
            }
            Err(Error::TokenLookupCollision) => {
                warn!(attempt, "token lookup collision, minting again");
            }
            Err(e) => return Err(e),
        }
    }

    Err(Error::TokenLookupCollision)
}
