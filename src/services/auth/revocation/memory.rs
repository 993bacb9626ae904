use std::{
    collections::HashMap,
    sync::RwLock,
    time::{Duration, Instant},
};

use crate::services::auth::revocation::store::{
    BoxFuture, RevocationError, RevocationStore, revocation_key,
};

/// In-process revocation set for single-instance deployments and tests.
///
/// Entries carry their own deadline; a lapsed entry reads as "not revoked" and is pruned on the next write.
#[derive(Debug, Default)]
pub struct InMemoryRevocationStore {
    entries: RwLock<HashMap<String, Instant>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    fn lookup(&self, token: &str) -> Result<bool, RevocationError> {
        let key = revocation_key(token);
        let entries = self.entries.read().map_err(|_| RevocationError::Poisoned)?;
        Ok(entries
            .get(&key)
            .is_some_and(|deadline| Instant::now() < *deadline))
    }

    fn insert(&self, token: &str, ttl: Duration) -> Result<(), RevocationError> {
        let now = Instant::now();
        let deadline = now + ttl;
        let mut entries = self.entries.write().map_err(|_| RevocationError::Poisoned)?;

        entries.retain(|_, d| now < *d);

        // Keep the later deadline if the token was already revoked
        let slot = entries.entry(revocation_key(token)).or_insert(deadline);
        if *slot < deadline {
            *slot = deadline;
        }
        Ok(())
    }
}

impl RevocationStore for InMemoryRevocationStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn is_revoked<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<bool, RevocationError>> {
        Box::pin(async move { self.lookup(token) })
    }

    fn revoke<'a>(
        &'a self,
        token: &'a str,
        ttl: Duration,
    ) -> BoxFuture<'a, Result<(), RevocationError>> {
        Box::pin(async move { self.insert(token, ttl) })
    }
}
