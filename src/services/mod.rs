pub mod auth;
pub mod cache;
pub mod error;
pub mod expense_service;
pub mod profile_service;

pub use expense_service::ExpenseService;
pub use profile_service::ProfileService;
