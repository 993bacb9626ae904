/*
 * Responsibility
 * - Router-level layers: request gate, CORS, transport concerns
 */
pub mod auth;
pub mod cors;
pub mod http;
