/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - Hand the identity bound by the request gate to handlers
 * - axum specifics stay in core; the plain type lives in types
 */

mod core;
mod types;

pub use core::AuthCtxExtractor;
pub use types::AuthCtx;
