pub mod error;
pub mod expense_repo;
pub mod profile_repo;
#[cfg(test)]
pub mod testing;

pub use expense_repo::{ExpenseRepo, ExpenseRow, ExpenseStore, NewExpense};
pub use profile_repo::{NewProfile, ProfileRepo, ProfileRow, ProfileStore};
