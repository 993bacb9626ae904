pub mod auth_service;
pub mod credentials;
pub mod error;
pub mod factory;
pub mod identity;
pub mod jwt;
pub mod revocation;
pub mod token_service;

pub use auth_service::AuthService;
pub use credentials::CredentialVerifier;
pub use error::AuthFailure;
pub use identity::IdentityStore;
pub use revocation::RevocationStore;
pub use token_service::TokenService;
