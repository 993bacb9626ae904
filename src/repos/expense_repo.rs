/*
 * Responsibility
 * - expenses CRUD
 * - Rows are addressed by the public expense_id; the serial id stays internal
 */
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, FromRow)]
pub struct ExpenseRow {
    pub id: i64,
    pub expense_id: Uuid,
    pub name: String,
    pub note: Option<String>,
    pub category: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column values written on insert and update.
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub name: String,
    pub note: Option<String>,
    pub category: String,
    pub date: NaiveDate,
    pub amount: Decimal,
}

#[derive(Clone, Debug)]
pub struct ExpenseRepo {
    pool: PgPool,
}

#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Newest first (`created_at` descending).
    async fn list(&self) -> RepoResult<Vec<ExpenseRow>>;
    async fn find_by_expense_id(&self, expense_id: Uuid) -> RepoResult<Option<ExpenseRow>>;
    async fn insert(&self, expense_id: Uuid, expense: &NewExpense) -> RepoResult<ExpenseRow>;
    /// Replace the editable columns and bump `updated_at`. `None` when no row matches.
    async fn update(
        &self,
        expense_id: Uuid,
        expense: &NewExpense,
    ) -> RepoResult<Option<ExpenseRow>>;
    /// `false` when no row matched.
    async fn delete(&self, expense_id: Uuid) -> RepoResult<bool>;
}

impl ExpenseRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExpenseStore for ExpenseRepo {
    async fn list(&self) -> RepoResult<Vec<ExpenseRow>> {
        let rows = sqlx::query_as::<_, ExpenseRow>(
            r#"
            SELECT id, expense_id, name, note, category, date, amount, created_at, updated_at
            FROM expenses
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find_by_expense_id(&self, expense_id: Uuid) -> RepoResult<Option<ExpenseRow>> {
        let row = sqlx::query_as::<_, ExpenseRow>(
            r#"
            SELECT id, expense_id, name, note, category, date, amount, created_at, updated_at
            FROM expenses
            WHERE expense_id = $1
            "#,
        )
        .bind(expense_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn insert(&self, expense_id: Uuid, expense: &NewExpense) -> RepoResult<ExpenseRow> {
        let row = sqlx::query_as::<_, ExpenseRow>(
            r#"
            INSERT INTO expenses (expense_id, name, note, category, date, amount)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, expense_id, name, note, category, date, amount, created_at, updated_at
            "#,
        )
        .bind(expense_id)
        .bind(&expense.name)
        .bind(expense.note.as_deref())
        .bind(&expense.category)
        .bind(expense.date)
        .bind(expense.amount)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    // id, expense_id and created_at are left untouched
    async fn update(
        &self,
        expense_id: Uuid,
        expense: &NewExpense,
    ) -> RepoResult<Option<ExpenseRow>> {
        let row = sqlx::query_as::<_, ExpenseRow>(
            r#"
            UPDATE expenses
            SET
                name = $2,
                note = $3,
                category = $4,
                date = $5,
                amount = $6,
                updated_at = now()
            WHERE expense_id = $1
            RETURNING id, expense_id, name, note, category, date, amount, created_at, updated_at
            "#,
        )
        .bind(expense_id)
        .bind(&expense.name)
        .bind(expense.note.as_deref())
        .bind(&expense.category)
        .bind(expense.date)
        .bind(expense.amount)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete(&self, expense_id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM expenses
            WHERE expense_id = $1
            "#,
        )
        .bind(expense_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
