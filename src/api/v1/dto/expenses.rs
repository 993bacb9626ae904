/*
 * Responsibility
 * - Expense request/response DTO
 * - The public expense_id is returned; the serial id never leaves the repo
 */
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::{ExpenseRow, NewExpense};

const MAX_NAME_LEN: usize = 255;

#[derive(Debug, Deserialize)]
pub struct ExpenseRequest {
    pub name: String,
    #[serde(default)]
    pub note: Option<String>,
    pub category: String,
    pub date: NaiveDate,
    pub amount: Decimal,
}

impl ExpenseRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("name is required");
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err("name must be <= 255 chars");
        }
        if self.category.trim().is_empty() {
            return Err("category is required");
        }
        if self.amount < Decimal::ZERO {
            return Err("amount must not be negative");
        }
        Ok(())
    }

    pub fn into_new_expense(self) -> NewExpense {
        NewExpense {
            name: self.name.trim().to_string(),
            note: self.note.filter(|n| !n.trim().is_empty()),
            category: self.category.trim().to_string(),
            date: self.date,
            amount: self.amount,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExpenseResponse {
    pub expense_id: Uuid,
    pub name: String,
    pub note: Option<String>,
    pub category: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ExpenseRow> for ExpenseResponse {
    fn from(row: ExpenseRow) -> Self {
        Self {
            expense_id: row.expense_id,
            name: row.name,
            note: row.note,
            category: row.category,
            date: row.date,
            amount: row.amount,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> ExpenseRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn accepts_a_typical_body() {
        let req = parse(json!({
            "name": "Water bill",
            "category": "Bills",
            "date": "2024-03-01",
            "amount": 42.5
        }));

        assert_eq!(req.validate(), Ok(()));
        assert_eq!(req.amount, Decimal::new(425, 1));
        assert!(req.note.is_none());
    }

    #[test]
    fn rejects_blank_fields_and_negative_amounts() {
        let mut req = parse(json!({
            "name": " ", "category": "Bills", "date": "2024-03-01", "amount": 1
        }));
        assert_eq!(req.validate(), Err("name is required"));

        req.name = "Rent".into();
        req.category = "".into();
        assert_eq!(req.validate(), Err("category is required"));

        req.category = "Housing".into();
        req.amount = Decimal::new(-1, 0);
        assert_eq!(req.validate(), Err("amount must not be negative"));

        req.name = "x".repeat(256);
        req.amount = Decimal::ZERO;
        assert_eq!(req.validate(), Err("name must be <= 255 chars"));
    }

    #[test]
    fn new_expense_trims_and_drops_blank_note() {
        let expense = parse(json!({
            "name": "  Lunch ", "note": "  ", "category": " Food ",
            "date": "2024-03-02", "amount": 12
        }))
        .into_new_expense();

        assert_eq!(expense.name, "Lunch");
        assert_eq!(expense.category, "Food");
        assert!(expense.note.is_none());
    }
}
