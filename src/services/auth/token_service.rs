use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::services::auth::jwt::JwtCodec;

/// Claims carried by every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    // Random per issuance; two logins in the same second still get distinct tokens
    #[serde(default)]
    pub jti: String,
}

/// Hard failures while reading a token.
///
/// `Malformed` and `Expired` both end up as 401 for the client; they are kept apart for logs.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("token expired")]
    Expired,
}

#[derive(Debug, Error)]
pub enum IssueError {
    #[error("subject must not be empty")]
    EmptySubject,
    #[error("validity window of {0}s does not fit a token expiry")]
    WindowOverflow(u64),
    #[error("failed to sign token")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: i64,
    pub expires_in: u64,
}

/// Issues and validates bearer tokens.
///
/// Two tiers of outcome:
/// - a token that cannot be read (bad structure, bad signature) is an `Err`
/// - a readable token that is expired or names someone else is `Ok(false)` from `validate`
#[derive(Debug, Clone)]
pub struct TokenService {
    codec: JwtCodec,
    ttl_seconds: u64,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl_seconds: u64) -> Self {
        Self {
            codec: JwtCodec::new(secret, &["sub", "iat", "exp"]),
            ttl_seconds,
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    pub fn issue(&self, subject: &str) -> Result<IssuedToken, IssueError> {
        self.issue_at(subject, now())
    }

    pub fn issue_at(&self, subject: &str, now: i64) -> Result<IssuedToken, IssueError> {
        if subject.trim().is_empty() {
            return Err(IssueError::EmptySubject);
        }

        let exp = i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .ok_or(IssueError::WindowOverflow(self.ttl_seconds))?;
        let claims = AccessTokenClaims {
            sub: subject.to_string(),
            iat: now,
            exp,
            jti: Uuid::new_v4().to_string(),
        };

        Ok(IssuedToken {
            token: self.codec.sign(&claims)?,
            expires_at: exp,
            expires_in: self.ttl_seconds,
        })
    }

    pub fn parse_subject(&self, token: &str) -> Result<String, TokenError> {
        self.parse_subject_at(token, now())
    }

    pub fn parse_subject_at(&self, token: &str, now: i64) -> Result<String, TokenError> {
        let claims = self.read_claims(token)?;
        if is_expired(&claims, now) {
            return Err(TokenError::Expired);
        }
        Ok(claims.sub)
    }

    pub fn validate(&self, token: &str, expected_subject: &str) -> Result<bool, TokenError> {
        self.validate_at(token, expected_subject, now())
    }

    pub fn validate_at(
        &self,
        token: &str,
        expected_subject: &str,
        now: i64,
    ) -> Result<bool, TokenError> {
        let claims = self.read_claims(token)?;
        Ok(claims.sub == expected_subject && !is_expired(&claims, now))
    }

    /// Expiry (unix seconds) of a readable token, whether or not it has passed.
    pub fn expires_at(&self, token: &str) -> Result<i64, TokenError> {
        Ok(self.read_claims(token)?.exp)
    }

    fn read_claims(&self, token: &str) -> Result<AccessTokenClaims, TokenError> {
        let claims = self
            .codec
            .decode::<AccessTokenClaims>(token)
            .map_err(|e| TokenError::Malformed(e.to_string()))?;

        if claims.sub.trim().is_empty() {
            return Err(TokenError::Malformed("empty 'sub' claim".to_string()));
        }

        Ok(claims)
    }
}

fn is_expired(claims: &AccessTokenClaims, now: i64) -> bool {
    now >= claims.exp
}

fn now() -> i64 {
    Utc::now().timestamp()
}
