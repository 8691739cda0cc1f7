//! Permission grant entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use docvault_core::types::{NodeId, PrincipalId};

use super::capability::Capability;

/// One capability held by a principal on a chain root.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PermissionGrant {
    /// Grantee.
    pub principal_id: PrincipalId,
    /// Chain root the grant is attached to.
    pub root_id: NodeId,
    /// Granted capability.
    pub capability: Capability,
    /// Chain owner who issued the grant.
    pub granted_by: PrincipalId,
    /// When the grant was written.
    pub created_at: DateTime<Utc>,
}
