use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::repos::{NewProfile, ProfileRow, ProfileStore, error::RepoError};
use crate::services::{auth::credentials::hash_password, error::ServiceError};

#[derive(Clone)]
pub struct ProfileService {
    repo: Arc<dyn ProfileStore>,
}

impl ProfileService {
    pub fn new(repo: Arc<dyn ProfileStore>) -> Self {
        Self { repo }
    }

    /// Create a profile with a hashed password. Duplicate emails are a conflict.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<ProfileRow, ServiceError> {
        if self.repo.exists_by_email(email).await? {
            return Err(duplicate(email));
        }

        let password_hash = hash_password(password).map_err(|e| ServiceError::Hash(e.to_string()))?;

        let row = self
            .repo
            .insert(NewProfile {
                profile_id: Uuid::new_v4(),
                name,
                email,
                password_hash: &password_hash,
            })
            .await
            .map_err(|e| match e {
                // Lost a race with another registration for the same email
                RepoError::Conflict => duplicate(email),
                e => e.into(),
            })?;

        info!(profile_id = %row.profile_id, "profile registered");
        Ok(row)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<ProfileRow, ServiceError> {
        self.repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Profile not found for the email {email}")))
    }
}

fn duplicate(email: &str) -> ServiceError {
    ServiceError::Conflict(format!("Profile already exists {email}"))
}
