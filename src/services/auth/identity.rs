use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::repos::{ProfileRepo, ProfileRow, ProfileStore, error::RepoError};

/// Account resolved from a subject (email).
#[derive(Clone)]
pub struct Principal {
    pub profile_id: Uuid,
    pub email: String,
    pub password_hash: String,
}

impl std::fmt::Debug for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Principal")
            .field("profile_id", &self.profile_id)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("principal not found")]
    NotFound,
    #[error("identity store failure")]
    Backend(#[from] RepoError),
}

#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn load_principal(&self, email: &str) -> Result<Principal, IdentityError>;
}

impl From<ProfileRow> for Principal {
    fn from(row: ProfileRow) -> Self {
        Self {
            profile_id: row.profile_id,
            email: row.email,
            password_hash: row.password_hash,
        }
    }
}

#[async_trait]
impl IdentityStore for ProfileRepo {
    async fn load_principal(&self, email: &str) -> Result<Principal, IdentityError> {
        let row = self
            .find_by_email(email)
            .await?
            .ok_or(IdentityError::NotFound)?;

        Ok(row.into())
    }
}
