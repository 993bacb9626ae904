/// Factories: build auth components from application `Config`.
use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::error::AppError;
use crate::services::auth::{
    TokenService,
    revocation::{InMemoryRevocationStore, RevocationStore, ValkeyRevocationStore},
};

pub fn build_token_service(config: &Config) -> Arc<TokenService> {
    Arc::new(TokenService::new(
        config.jwt_secret.as_bytes(),
        config.access_token_ttl_seconds,
    ))
}

pub async fn build_revocation_store(config: &Config) -> Result<Arc<dyn RevocationStore>, AppError> {
    match config.valkey_url.as_deref() {
        Some(url) => {
            let store = ValkeyRevocationStore::connect(url, config.revocation_key_prefix.clone())
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "failed to connect revocation store");
                    AppError::Internal
                })?;
            info!(prefix = %config.revocation_key_prefix, "using valkey revocation store");
            Ok(Arc::new(store))
        }
        None => {
            info!("VALKEY_URL not set; using in-memory revocation store");
            Ok(Arc::new(InMemoryRevocationStore::new()))
        }
    }
}
