//! Effective capability resolver.
//!
//! Resolution order:
//! 1. Owner check: the chain owner holds every capability.
//! 2. Grants: capabilities stored for (principal, chain root).
//!
//! Upload, query and sharing all go through this type, so read-path and
//! write-path authorization cannot drift apart.

use serde::Serialize;
use sqlx::SqliteConnection;
use tracing::debug;

use docvault_core::error::AppError;
use docvault_core::types::PrincipalId;
use docvault_database::repositories::GrantRepository;
use docvault_entity::node::VersionNode;
use docvault_entity::permission::{Capability, CapabilitySet};

/// Result of resolving a principal's capabilities on a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EffectiveCapabilities {
    /// Capabilities held.
    pub capabilities: CapabilitySet,
    /// Where they come from.
    pub source: CapabilitySource,
}

impl EffectiveCapabilities {
    /// Whether a capability is held.
    pub fn allows(&self, capability: Capability) -> bool {
        self.capabilities.contains(capability)
    }
}

/// Where effective capabilities were derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilitySource {
    /// Principal owns the chain.
    Owner,
    /// Principal holds stored grants on the chain root.
    Grant,
    /// No relationship to the chain.
    None,
}

/// Resolves what a principal may do with a version chain.
#[derive(Debug, Clone)]
pub struct CapabilityResolver {
    grants: GrantRepository,
}

impl CapabilityResolver {
    /// Creates a new capability resolver.
    pub fn new(grants: GrantRepository) -> Self {
        Self { grants }
    }

    /// Combine ownership with stored grants.
    fn decide(principal: PrincipalId, node: &VersionNode, stored: CapabilitySet) -> EffectiveCapabilities {
        if node.is_owned_by(principal) {
            return EffectiveCapabilities {
                capabilities: CapabilitySet::FULL,
                source: CapabilitySource::Owner,
            };
        }
        let source = if stored.is_empty() {
            CapabilitySource::None
        } else {
            CapabilitySource::Grant
        };
        EffectiveCapabilities {
            capabilities: stored,
            source,
        }
    }

    /// Resolve capabilities on the chain containing `node`.
    pub async fn resolve(
        &self,
        principal: PrincipalId,
        node: &VersionNode,
    ) -> Result<EffectiveCapabilities, AppError> {
        if node.is_owned_by(principal) {
            return Ok(Self::decide(principal, node, CapabilitySet::default()));
        }
        let stored = self
            .grants
            .find_capabilities(principal, node.chain_root_id())
            .await?;
        Ok(Self::decide(principal, node, stored))
    }

    /// Same as [`Self::resolve`] inside an open transaction.
    pub async fn resolve_with(
        conn: &mut SqliteConnection,
        principal: PrincipalId,
        node: &VersionNode,
    ) -> Result<EffectiveCapabilities, AppError> {
        if node.is_owned_by(principal) {
            return Ok(Self::decide(principal, node, CapabilitySet::default()));
        }
        let stored =
            GrantRepository::capabilities_with(conn, principal, node.chain_root_id()).await?;
        Ok(Self::decide(principal, node, stored))
    }

    /// Whether `principal` holds `capability` on the chain containing `node`.
    pub async fn has_capability(
        &self,
        principal: PrincipalId,
        node: &VersionNode,
        capability: Capability,
    ) -> Result<bool, AppError> {
        let effective = self.resolve(principal, node).await?;
        debug!(
            principal_id = %principal,
            root_id = %node.chain_root_id(),
            capability = %capability,
            source = ?effective.source,
            granted = effective.allows(capability),
            "Resolved capability"
        );
        Ok(effective.allows(capability))
    }

    /// Fails with `PermissionDenied` unless the capability is held.
    pub async fn require(
        &self,
        principal: PrincipalId,
        node: &VersionNode,
        capability: Capability,
        message: impl Into<String>,
    ) -> Result<(), AppError> {
        if self.has_capability(principal, node, capability).await? {
            Ok(())
        } else {
            Err(AppError::permission_denied(message))
        }
    }
}
