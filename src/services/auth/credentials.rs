use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

use crate::services::auth::identity::{IdentityError, IdentityStore, Principal};

#[derive(Debug, Error)]
pub enum CredentialError {
    // Unknown email and wrong password are deliberately the same variant
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("identity store failure")]
    Backend(#[source] IdentityError),
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Hash a password into an Argon2 PHC string (random salt, default params).
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| CredentialError::Hash(e.to_string()))
}

/// Checks an (email, password) pair against the identity store.
#[derive(Clone)]
pub struct CredentialVerifier {
    identities: Arc<dyn IdentityStore>,
}

impl CredentialVerifier {
    pub fn new(identities: Arc<dyn IdentityStore>) -> Self {
        Self { identities }
    }

    pub async fn verify(&self, email: &str, password: &str) -> Result<Principal, CredentialError> {
        let principal = match self.identities.load_principal(email).await {
            Ok(p) => p,
            Err(IdentityError::NotFound) => {
                debug!("login for unknown email");
                return Err(CredentialError::InvalidCredentials);
            }
            Err(e) => return Err(CredentialError::Backend(e)),
        };

        let parsed = PasswordHash::new(&principal.password_hash).map_err(|e| {
            error!(profile_id = %principal.profile_id, error = %e, "stored password hash is unreadable");
            CredentialError::Hash(e.to_string())
        })?;

        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_err()
        {
            debug!(profile_id = %principal.profile_id, "password mismatch");
            return Err(CredentialError::InvalidCredentials);
        }

        Ok(principal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::identity::testing::StaticIdentityStore;

    fn verifier(store: StaticIdentityStore) -> CredentialVerifier {
        CredentialVerifier::new(Arc::new(store))
    }

    #[test]
    fn hashes_are_salted_phc_strings() {
        let a = hash_password("hunter22").unwrap();
        let b = hash_password("hunter22").unwrap();

        assert!(a.starts_with("$argon2"));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn correct_password_returns_principal() {
        let v = verifier(StaticIdentityStore::new().with_password("alice@example.com", "s3cret!"));

        let principal = v.verify("alice@example.com", "s3cret!").await.unwrap();
        assert_eq!(principal.email, "alice@example.com");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let v = verifier(StaticIdentityStore::new().with_password("alice@example.com", "s3cret!"));

        assert!(matches!(
            v.verify("alice@example.com", "nope").await,
            Err(CredentialError::InvalidCredentials)
        ));
        assert!(matches!(
            v.verify("nobody@example.com", "s3cret!").await,
            Err(CredentialError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn store_outage_is_not_reported_as_bad_credentials() {
        let v = verifier(StaticIdentityStore::failing());

        assert!(matches!(
            v.verify("alice@example.com", "s3cret!").await,
            Err(CredentialError::Backend(_))
        ));
    }
}
