use thiserror::Error;

use crate::error::AppError;
use crate::services::auth::{
    credentials::CredentialError, identity::IdentityError, revocation::RevocationError,
    token_service::{IssueError, TokenError},
};

/// Why a request or a login was not authenticated.
///
/// Clients only ever see a single 401 for the authentication variants; this type exists for logs.
#[derive(Debug, Error)]
pub enum AuthFailure {
    #[error("token revoked")]
    Revoked,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("no principal for token subject")]
    IdentityNotFound,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("revocation store failure")]
    RevocationBackend(#[source] RevocationError),
    #[error("identity store failure")]
    IdentityBackend(#[source] IdentityError),
    #[error("password hashing failure: {0}")]
    Hash(String),
    #[error("token issuance failure")]
    Issue(#[from] IssueError),
}

impl AuthFailure {
    /// Stable label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthFailure::Revoked => "revoked",
            AuthFailure::Token(TokenError::Malformed(_)) => "malformed",
            AuthFailure::Token(TokenError::Expired) => "expired",
            AuthFailure::IdentityNotFound => "identity_not_found",
            AuthFailure::InvalidCredentials => "invalid_credentials",
            AuthFailure::RevocationBackend(_) => "revocation_backend",
            AuthFailure::IdentityBackend(_) => "identity_backend",
            AuthFailure::Hash(_) => "hash",
            AuthFailure::Issue(_) => "issue",
        }
    }
}

impl From<CredentialError> for AuthFailure {
    fn from(e: CredentialError) -> Self {
        match e {
            CredentialError::InvalidCredentials => AuthFailure::InvalidCredentials,
            CredentialError::Backend(e) => AuthFailure::IdentityBackend(e),
            CredentialError::Hash(msg) => AuthFailure::Hash(msg),
        }
    }
}

impl From<IdentityError> for AuthFailure {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::NotFound => AuthFailure::IdentityNotFound,
            e => AuthFailure::IdentityBackend(e),
        }
    }
}

impl From<AuthFailure> for AppError {
    fn from(e: AuthFailure) -> Self {
        match e {
            // Revocation lookups fail closed
            AuthFailure::Revoked
            | AuthFailure::Token(_)
            | AuthFailure::IdentityNotFound
            | AuthFailure::InvalidCredentials
            | AuthFailure::RevocationBackend(_) => AppError::Unauthorized,
            AuthFailure::IdentityBackend(_) | AuthFailure::Hash(_) | AuthFailure::Issue(_) => {
                AppError::Internal
            }
        }
    }
}
