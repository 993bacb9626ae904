//! Request gate: bearer token → revocation check → validation → `AuthCtx` in extensions.
//!
//! Runs once per request in front of every `/api/v1` handler.
//! - No `Authorization: Bearer ...` header: the request passes through anonymous.
//! - Revoked token: 401 immediately; the token is never parsed.
//! - Unreadable or expired token, or unknown subject: 401.
//! - Otherwise the principal is loaded, the token is checked against it, and the identity is bound.
//!
//! Handlers that need a caller use `AuthCtxExtractor`, which turns "anonymous" into 401.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};
use tracing::{debug, warn};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::{AuthFailure, IdentityStore, RevocationStore, TokenService};

const BEARER_PREFIX: &str = "Bearer ";

/// Everything the gate needs, injected at construction.
#[derive(Clone)]
pub struct RequestGate {
    tokens: Arc<TokenService>,
    revocations: Arc<dyn RevocationStore>,
    identities: Arc<dyn IdentityStore>,
}

impl RequestGate {
    pub fn new(
        tokens: Arc<TokenService>,
        revocations: Arc<dyn RevocationStore>,
        identities: Arc<dyn IdentityStore>,
    ) -> Self {
        Self {
            tokens,
            revocations,
            identities,
        }
    }

    /// Decide what a presented token is worth.
    ///
    /// - `Ok(Some(ctx))`: bind `ctx` to the request
    /// - `Ok(None)`: leave the request as it is (already bound, or token does not match its principal)
    /// - `Err(_)`: stop the request
    pub async fn authenticate(
        &self,
        token: &str,
        already_bound: bool,
    ) -> Result<Option<AuthCtx>, AuthFailure> {
        let revoked = self
            .revocations
            .is_revoked(token)
            .await
            .map_err(AuthFailure::RevocationBackend)?;
        if revoked {
            return Err(AuthFailure::Revoked);
        }

        let subject = self.tokens.parse_subject(token)?;

        if already_bound {
            return Ok(None);
        }

        let principal = self.identities.load_principal(&subject).await?;

        if !self.tokens.validate(token, &principal.email)? {
            debug!(profile_id = %principal.profile_id, "token does not match principal");
            return Ok(None);
        }

        Ok(Some(AuthCtx::new(principal.email, principal.profile_id)))
    }
}

/// Put the gate in front of every route of `router`.
pub fn apply<S>(router: Router<S>, gate: RequestGate) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(gate, access_middleware))
}

/// Token part of `Authorization: Bearer <token>`, if the header has that shape.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
}

async fn access_middleware(
    State(gate): State<RequestGate>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = bearer_token(req.headers()).map(str::to_owned) else {
        return Ok(next.run(req).await);
    };

    let already_bound = req.extensions().get::<AuthCtx>().is_some();

    match gate.authenticate(&token, already_bound).await {
        Ok(Some(auth_ctx)) => {
            req.extensions_mut().insert(auth_ctx);
        }
        Ok(None) => {}
        Err(failure) => {
            warn!(
                kind = failure.kind(),
                error = %failure,
                method = %req.method(),
                path = %req.uri().path(),
                "request authentication failed"
            );
            return Err(failure.into());
        }
    }

    Ok(next.run(req).await)
}
