use sha2::{Digest, Sha256};
use std::{future::Future, pin::Pin, time::Duration};

use crate::services::cache::CacheError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Denylist of bearer tokens that must not be trusted before their natural expiry.
///
/// Entries are keyed by `revocation_key(token)`, never by the raw token.
/// Lookups must not parse the token: a revoked token is rejected even if it is garbage.
pub trait RevocationStore: Send + Sync {
    // Backend name for logs.
    fn backend_name(&self) -> &'static str;

    // Returns:
    // - Ok(true)  => token was revoked and the entry has not lapsed
    // - Ok(false) => not revoked
    // - Err(_)    => backend failure (caller must treat as authentication failure)
    fn is_revoked<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<bool, RevocationError>>;

    // Revoke `token` for at least `ttl`.
    // Revoking an already revoked token is not an error and never shortens the entry:
    // it stays revoked until the later of the two deadlines.
    fn revoke<'a>(
        &'a self,
        token: &'a str,
        ttl: Duration,
    ) -> BoxFuture<'a, Result<(), RevocationError>>;
}

#[derive(Debug, thiserror::Error)]
pub enum RevocationError {
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("revocation store lock poisoned")]
    Poisoned,
}

/// sha256(token) as lowercase hex.
pub fn revocation_key(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
