/*
 * Responsibility
 * - The authenticated identity as handlers see it
 * - Inserted into request extensions by the request gate, dropped with the request
 */
use uuid::Uuid;

/// Identity bound to a request whose bearer token passed every check.
///
/// - `email` is the token subject and the principal's login name
/// - `profile_id` is the public id of the principal's profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub email: String,
    pub profile_id: Uuid,
}

impl AuthCtx {
    pub fn new(email: impl Into<String>, profile_id: Uuid) -> Self {
        Self {
            email: email.into(),
            profile_id,
        }
    }
}
