/*
 * Responsibility
 * - v1 URL structure
 * - The request gate wraps all of v1; which routes demand a caller is decided by AuthCtxExtractor
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use crate::api::v1::handlers::{
    auth::{current_profile, login, logout, register},
    expenses::{create_expense, delete_expense, get_expense, list_expenses, update_expense},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/profile", get(current_profile))
        .route("/expenses", get(list_expenses).post(create_expense))
        .route(
            "/expenses/{expense_id}",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
}
