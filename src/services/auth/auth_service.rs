use chrono::Utc;
use std::{sync::Arc, time::Duration};
use tracing::{debug, info};

use crate::services::auth::{
    credentials::CredentialVerifier,
    error::AuthFailure,
    revocation::RevocationStore,
    token_service::{IssuedToken, TokenService},
};

/// Login and logout.
///
/// Login checks credentials and then mints a token; logout puts the presented token on the denylist
/// for the rest of its lifetime.
#[derive(Clone)]
pub struct AuthService {
    tokens: Arc<TokenService>,
    credentials: CredentialVerifier,
    revocations: Arc<dyn RevocationStore>,
}

impl AuthService {
    pub fn new(
        tokens: Arc<TokenService>,
        credentials: CredentialVerifier,
        revocations: Arc<dyn RevocationStore>,
    ) -> Self {
        Self {
            tokens,
            credentials,
            revocations,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedToken, AuthFailure> {
        let principal = self.credentials.verify(email, password).await?;
        let issued = self.tokens.issue(&principal.email)?;

        info!(profile_id = %principal.profile_id, "login succeeded");
        Ok(issued)
    }

    pub async fn logout(&self, token: &str) -> Result<(), AuthFailure> {
        let exp = self.tokens.expires_at(token)?;
        let remaining = (exp - Utc::now().timestamp()).max(1) as u64;

        self.revocations
            .revoke(token, Duration::from_secs(remaining))
            .await
            .map_err(AuthFailure::RevocationBackend)?;

        debug!(
            backend = self.revocations.backend_name(),
            ttl_seconds = remaining,
            "token revoked"
        );
        Ok(())
    }
}
