use thiserror::Error;

use crate::error::AppError;
use crate::repos::error::RepoError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("password hashing failed: {0}")]
    Hash(String),
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound(msg) => AppError::not_found(msg),
            ServiceError::Conflict(msg) => AppError::conflict(msg),
            ServiceError::Repo(e) => e.into(),
            ServiceError::Hash(msg) => {
                tracing::error!(error = %msg, "password hashing failed");
                AppError::Internal
            }
        }
    }
}
