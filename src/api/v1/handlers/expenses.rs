/*
 * Responsibility
 * - /expenses CRUD handler (authenticated callers only)
 * - Path carries the public expense_id as a string; the service decides what "not found" means
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;

use crate::{
    api::v1::{
        dto::expenses::{ExpenseRequest, ExpenseResponse},
        extractors::{AuthCtxExtractor, JsonBody},
    },
    error::AppError,
    state::AppState,
};

pub async fn list_expenses(
    State(state): State<AppState>,
    AuthCtxExtractor(_ctx): AuthCtxExtractor,
) -> Result<Json<Vec<ExpenseResponse>>, AppError> {
    info!("API GET /expenses called");
    let rows = state.expenses.list().await?;
    Ok(Json(rows.into_iter().map(ExpenseResponse::from).collect()))
}

pub async fn get_expense(
    State(state): State<AppState>,
    AuthCtxExtractor(_ctx): AuthCtxExtractor,
    Path(expense_id): Path<String>,
) -> Result<Json<ExpenseResponse>, AppError> {
    info!(%expense_id, "API GET /expenses/{{id}} called");
    let row = state.expenses.get(&expense_id).await?;
    Ok(Json(row.into()))
}

pub async fn create_expense(
    State(state): State<AppState>,
    AuthCtxExtractor(_ctx): AuthCtxExtractor,
    JsonBody(req): JsonBody<ExpenseRequest>,
) -> Result<(StatusCode, Json<ExpenseResponse>), AppError> {
    info!("API POST /expenses called");
    req.validate().map_err(AppError::validation)?;

    let row = state.expenses.create(req.into_new_expense()).await?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn update_expense(
    State(state): State<AppState>,
    AuthCtxExtractor(_ctx): AuthCtxExtractor,
    Path(expense_id): Path<String>,
    JsonBody(req): JsonBody<ExpenseRequest>,
) -> Result<Json<ExpenseResponse>, AppError> {
    info!(%expense_id, "API PUT /expenses/{{id}} called");
    req.validate().map_err(AppError::validation)?;

    let row = state
        .expenses
        .update(&expense_id, req.into_new_expense())
        .await?;
    Ok(Json(row.into()))
}

pub async fn delete_expense(
    State(state): State<AppState>,
    AuthCtxExtractor(_ctx): AuthCtxExtractor,
    Path(expense_id): Path<String>,
) -> Result<StatusCode, AppError> {
    info!(%expense_id, "API DELETE /expenses/{{id}} called");
    state.expenses.delete(&expense_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
