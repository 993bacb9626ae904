use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::repos::{ExpenseRow, ExpenseStore, NewExpense};
use crate::services::error::ServiceError;

#[derive(Clone)]
pub struct ExpenseService {
    repo: Arc<dyn ExpenseStore>,
}

impl ExpenseService {
    pub fn new(repo: Arc<dyn ExpenseStore>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<ExpenseRow>, ServiceError> {
        let rows = self.repo.list().await?;
        debug!(count = rows.len(), "listed expenses");
        Ok(rows)
    }

    pub async fn get(&self, expense_id: &str) -> Result<ExpenseRow, ServiceError> {
        let id = parse_expense_id(expense_id)?;
        self.repo
            .find_by_expense_id(id)
            .await?
            .ok_or_else(|| not_found(expense_id))
    }

    pub async fn create(&self, expense: NewExpense) -> Result<ExpenseRow, ServiceError> {
        let row = self.repo.insert(Uuid::new_v4(), &expense).await?;
        info!(expense_id = %row.expense_id, "expense created");
        Ok(row)
    }

    pub async fn update(
        &self,
        expense_id: &str,
        expense: NewExpense,
    ) -> Result<ExpenseRow, ServiceError> {
        let id = parse_expense_id(expense_id)?;
        let row = self
            .repo
            .update(id, &expense)
            .await?
            .ok_or_else(|| not_found(expense_id))?;

        info!(expense_id = %row.expense_id, "expense updated");
        Ok(row)
    }

    pub async fn delete(&self, expense_id: &str) -> Result<(), ServiceError> {
        let id = parse_expense_id(expense_id)?;
        if !self.repo.delete(id).await? {
            return Err(not_found(expense_id));
        }

        info!(expense_id = %id, "expense deleted");
        Ok(())
    }
}

// An id that is not even a UUID cannot exist, so it is reported the same way as a missing one.
fn parse_expense_id(raw: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw.trim()).map_err(|_| not_found(raw))
}

fn not_found(expense_id: &str) -> ServiceError {
    ServiceError::NotFound(format!("Expense not found for the id {expense_id}"))
}
