/*
 * Responsibility
 * - register / login / logout / current profile
 * - login maps bad credentials to an explicit 401
 */
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use tracing::info;

use crate::{
    api::v1::{
        dto::{
            auth::{LoginRequest, LoginResponse},
            profiles::{ProfileResponse, RegisterRequest},
        },
        extractors::{AuthCtxExtractor, JsonBody},
    },
    error::AppError,
    middleware::auth::bearer_token,
    state::AppState,
};

pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<ProfileResponse>), AppError> {
    info!(email = %req.email, "API POST /register called");
    req.validate().map_err(AppError::validation)?;

    let row = state
        .profiles
        .register(req.name.trim(), req.email.trim(), &req.password)
        .await?;

    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    info!(email = %req.email, "API POST /login called");
    req.validate().map_err(AppError::validation)?;

    let email = req.email.trim();
    let issued = state.auth.login(email, &req.password).await.map_err(|e| {
        tracing::warn!(kind = e.kind(), error = %e, "login failed");
        AppError::from(e)
    })?;

    Ok(Json(LoginResponse {
        token: issued.token,
        email: email.to_string(),
        token_type: "Bearer",
        expires_in: issued.expires_in,
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    // The gate only binds a context for a bearer token, so the header is present here
    let token = bearer_token(&headers).ok_or(AppError::Unauthorized)?;

    state.auth.logout(token).await.map_err(|e| {
        tracing::warn!(kind = e.kind(), error = %e, "logout failed");
        AppError::from(e)
    })?;

    info!(profile_id = %ctx.profile_id, "logged out");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn current_profile(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<ProfileResponse>, AppError> {
    let row = state.profiles.get_by_email(&ctx.email).await?;
    Ok(Json(row.into()))
}
