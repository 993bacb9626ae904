use std::{sync::Arc, time::Duration};

use crate::services::{
    auth::revocation::store::{BoxFuture, RevocationError, RevocationStore, revocation_key},
    cache::{CacheClient, ValkeyClient},
};

/// Valkey-backed revocation store (Redis protocol), shared by every API instance.
///
/// Entries expire on their own through the key TTL.
pub struct ValkeyRevocationStore<C: CacheClient> {
    cache: Arc<C>,
    // Key prefix to avoid collisions across environments
    prefix: String,
}

impl ValkeyRevocationStore<ValkeyClient> {
    pub async fn connect(url: &str, prefix: impl Into<String>) -> Result<Self, RevocationError> {
        let client = ValkeyClient::connect(url).await?;
        Ok(Self::new_with_cache(Arc::new(client), prefix))
    }
}

impl<C: CacheClient> ValkeyRevocationStore<C> {
    pub fn new_with_cache(cache: Arc<C>, prefix: impl Into<String>) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
        }
    }

    pub fn key(&self, token: &str) -> String {
        format!("{}:{}", self.prefix, revocation_key(token))
    }
}

impl<C: CacheClient> RevocationStore for ValkeyRevocationStore<C> {
    fn backend_name(&self) -> &'static str {
        self.cache.backend_name()
    }

    fn is_revoked<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<bool, RevocationError>> {
        Box::pin(async move { Ok(self.cache.exists(&self.key(token)).await?) })
    }

    fn revoke<'a>(
        &'a self,
        token: &'a str,
        ttl: Duration,
    ) -> BoxFuture<'a, Result<(), RevocationError>> {
        Box::pin(async move {
            self.cache
                .set_extending_ttl(&self.key(token), "1", ttl)
                .await?;
            Ok(())
        })
    }
}
