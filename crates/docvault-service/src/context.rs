//! Request context carrying the authenticated principal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docvault_core::types::PrincipalId;
use docvault_entity::principal::Principal;

/// Context for the current authenticated request.
///
/// Built by the transport layer from an already-authenticated principal
/// and passed into service methods so every operation knows *who* is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated principal's ID.
    pub principal_id: PrincipalId,
    /// The principal's email.
    pub email: String,
    /// Whether the one-time content bootstrap already ran for this principal.
    pub bootstrapped: bool,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context for a principal.
    pub fn new(principal: &Principal) -> Self {
        Self {
            principal_id: principal.id,
            email: principal.email.clone(),
            bootstrapped: principal.is_bootstrapped(),
            request_time: Utc::now(),
        }
    }
}

impl From<&Principal> for RequestContext {
    fn from(principal: &Principal) -> Self {
        Self::new(principal)
    }
}
