//! Key/value cache interface used by the revocation store.
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub type CacheResult<T> = Result<T, CacheError>;

/// Cache-layer errors (transport/command).
///
/// Kept apart from `AppError`: the caller decides whether a cache outage fails open or closed.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    BackendConnection(String),
    #[error("cache command error: {0}")]
    BackendCommand(String),
}

/// Minimal string-keyed cache.
///
/// Implementations must be cheap to share (`Arc<...>` or a cloneable handle inside).
#[async_trait]
pub trait CacheClient: Send + Sync + 'static {
    // Backend name for logs.
    fn backend_name(&self) -> &'static str;

    async fn exists(&self, key: &str) -> CacheResult<bool>;

    // Set `key` to `value`, expiring after `ttl`.
    // An existing key keeps its value; its expiry is extended to `ttl` but never shortened.
    async fn set_extending_ttl(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;
}
