pub mod access;

pub use access::{RequestGate, bearer_token};
