/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 * - Clone is cheap: every field is an Arc or a pool handle
 */
use std::sync::Arc;

use crate::services::{ExpenseService, ProfileService, auth::AuthService};

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub profiles: Arc<ProfileService>,
    pub expenses: Arc<ExpenseService>,
}

impl AppState {
    pub fn new(
        auth: Arc<AuthService>,
        profiles: Arc<ProfileService>,
        expenses: Arc<ExpenseService>,
    ) -> Self {
        Self {
            auth,
            profiles,
            expenses,
        }
    }
}
