//! In-memory stores for service and router tests.
//!
//! They keep the same contracts as the SQL repos: emails are unique, expense ids are
//! stable across updates, lists come back newest first.
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::repos::{
    ExpenseRow, ExpenseStore, NewExpense, NewProfile, ProfileRow, ProfileStore,
    error::{RepoError, RepoResult},
};
use crate::services::auth::credentials::hash_password;

#[derive(Default)]
pub struct InMemoryProfileStore {
    rows: Mutex<HashMap<String, ProfileRow>>,
    next_id: Mutex<i64>,
    // exists_by_email always answers "no", as if another request inserted in between
    racing: bool,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The existence pre-check misses, so duplicates only show up at insert.
    pub fn racing() -> Self {
        Self {
            racing: true,
            ..Self::default()
        }
    }

    pub fn with_profile(self, name: &str, email: &str, password: &str) -> Self {
        let hash = hash_password(password).unwrap();
        self.put(NewProfile {
            profile_id: Uuid::new_v4(),
            name,
            email,
            password_hash: &hash,
        })
        .unwrap();
        self
    }

    fn put(&self, profile: NewProfile<'_>) -> RepoResult<ProfileRow> {
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(profile.email) {
            return Err(RepoError::Conflict);
        }

        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let now = Utc::now();
        let row = ProfileRow {
            id: *next_id,
            profile_id: profile.profile_id,
            name: profile.name.to_string(),
            email: profile.email.to_string(),
            password_hash: profile.password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        rows.insert(row.email.clone(), row.clone());
        Ok(row)
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<ProfileRow>> {
        Ok(self.rows.lock().unwrap().get(email).cloned())
    }

    async fn exists_by_email(&self, email: &str) -> RepoResult<bool> {
        if self.racing {
            return Ok(false);
        }
        Ok(self.rows.lock().unwrap().contains_key(email))
    }

    async fn insert(&self, profile: NewProfile<'_>) -> RepoResult<ProfileRow> {
        self.put(profile)
    }
}

#[derive(Default)]
pub struct InMemoryExpenseStore {
    rows: Mutex<Vec<ExpenseRow>>,
}

impl InMemoryExpenseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExpenseStore for InMemoryExpenseStore {
    async fn list(&self) -> RepoResult<Vec<ExpenseRow>> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn find_by_expense_id(&self, expense_id: Uuid) -> RepoResult<Option<ExpenseRow>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|r| r.expense_id == expense_id).cloned())
    }

    async fn insert(&self, expense_id: Uuid, expense: &NewExpense) -> RepoResult<ExpenseRow> {
        let mut rows = self.rows.lock().unwrap();
        let now = Utc::now();
        let row = ExpenseRow {
            id: rows.iter().map(|r| r.id).max().unwrap_or(0) + 1,
            expense_id,
            name: expense.name.clone(),
            note: expense.note.clone(),
            category: expense.category.clone(),
            date: expense.date,
            amount: expense.amount,
            created_at: now,
            updated_at: now,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        expense_id: Uuid,
        expense: &NewExpense,
    ) -> RepoResult<Option<ExpenseRow>> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|r| r.expense_id == expense_id) else {
            return Ok(None);
        };

        row.name = expense.name.clone();
        row.note = expense.note.clone();
        row.category = expense.category.clone();
        row.date = expense.date;
        row.amount = expense.amount;
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, expense_id: Uuid) -> RepoResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.expense_id != expense_id);
        Ok(rows.len() < before)
    }
}
