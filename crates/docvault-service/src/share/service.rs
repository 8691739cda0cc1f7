//! Sharing service: grant, revoke and list capabilities on a chain.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use docvault_auth::capability::{CapabilityResolver, CapabilitySource};
use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::types::{NodeId, PrincipalId};
use docvault_database::error::classify;
use docvault_database::repositories::{GrantRepository, PrincipalRepository, VersionNodeRepository};
use docvault_entity::node::VersionNode;
use docvault_entity::permission::{Capability, CapabilitySet};
use docvault_entity::principal::Principal;

use crate::context::RequestContext;

/// Input for [`SharingService::grant`].
#[derive(Debug, Clone)]
pub struct ShareRequest {
    /// Any node of the chain to share.
    pub node_id: NodeId,
    /// Email of the principal receiving access.
    pub target_email: String,
    /// Whether to grant `edit` in addition to `view`.
    pub can_edit: bool,
}

/// Capabilities one principal holds on a chain, for owner-facing listings.
#[derive(Debug, Clone, Serialize)]
pub struct GrantSummary {
    pub principal_id: PrincipalId,
    pub email: String,
    pub capabilities: CapabilitySet,
}

/// Grants and revokes per-chain capabilities.
#[derive(Debug, Clone)]
pub struct SharingService {
    /// Version node repository.
    nodes: Arc<VersionNodeRepository>,
    /// Principal repository, for target lookup by email.
    principals: Arc<PrincipalRepository>,
    /// Grant repository.
    grants: Arc<GrantRepository>,
    /// Capability decision point.
    resolver: Arc<CapabilityResolver>,
}

impl SharingService {
    /// Creates a new sharing service.
    pub fn new(
        nodes: Arc<VersionNodeRepository>,
        principals: Arc<PrincipalRepository>,
        grants: Arc<GrantRepository>,
        resolver: Arc<CapabilityResolver>,
    ) -> Self {
        Self {
            nodes,
            principals,
            grants,
            resolver,
        }
    }

    /// Grant `view`, and `edit` if requested, on the chain containing a
    /// node. Sharing view-only retracts a previous `edit` grant.
    pub async fn grant(
        &self,
        ctx: &RequestContext,
        request: ShareRequest,
    ) -> AppResult<CapabilitySet> {
        let node = self.owned_node(ctx, request.node_id, "share").await?;
        let target = self.target(ctx, &request.target_email).await?;
        let root_id = node.chain_root_id();

        let mut tx = self.grants.begin().await?;
        GrantRepository::upsert(&mut tx, target.id, root_id, Capability::View, ctx.principal_id)
            .await?;
        if request.can_edit {
            GrantRepository::upsert(&mut tx, target.id, root_id, Capability::Edit, ctx.principal_id)
                .await?;
        } else {
            GrantRepository::revoke(&mut tx, target.id, root_id, Capability::Edit).await?;
        }
        let granted = GrantRepository::capabilities_with(&mut *tx, target.id, root_id).await?;
        tx.commit()
            .await
            .map_err(|e| classify(e, "Failed to commit grant"))?;

        info!(
            owner_id = %ctx.principal_id,
            target_id = %target.id,
            root_id = %root_id,
            can_edit = request.can_edit,
            "Chain shared"
        );
        Ok(granted)
    }

    /// Remove every capability a principal holds on the chain containing a
    /// node. Returns the number of grants removed.
    pub async fn revoke(
        &self,
        ctx: &RequestContext,
        node_id: NodeId,
        target_email: &str,
    ) -> AppResult<u64> {
        let node = self.owned_node(ctx, node_id, "unshare").await?;
        let target = self.target(ctx, target_email).await?;
        let root_id = node.chain_root_id();

        let mut tx = self.grants.begin().await?;
        let removed = GrantRepository::revoke_all(&mut tx, target.id, root_id).await?;
        tx.commit()
            .await
            .map_err(|e| classify(e, "Failed to commit revoke"))?;

        info!(
            owner_id = %ctx.principal_id,
            target_id = %target.id,
            root_id = %root_id,
            removed,
            "Chain access revoked"
        );
        Ok(removed)
    }

    /// Who holds what on the chain containing a node.
    pub async fn list_grants(
        &self,
        ctx: &RequestContext,
        node_id: NodeId,
    ) -> AppResult<Vec<GrantSummary>> {
        let node = self.owned_node(ctx, node_id, "inspect sharing of").await?;
        let rows = self.grants.find_by_root(node.chain_root_id()).await?;

        let mut by_email: BTreeMap<String, GrantSummary> = BTreeMap::new();
        for row in rows {
            by_email
                .entry(row.email.clone())
                .or_insert_with(|| GrantSummary {
                    principal_id: row.principal_id,
                    email: row.email,
                    capabilities: CapabilitySet::default(),
                })
                .capabilities
                .insert(row.capability);
        }
        Ok(by_email.into_values().collect())
    }

    /// Load a node and require the caller to own its chain.
    async fn owned_node(
        &self,
        ctx: &RequestContext,
        node_id: NodeId,
        action: &str,
    ) -> AppResult<VersionNode> {
        let node = self
            .nodes
            .find_by_id(node_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Document {node_id} not found")))?;

        let effective = self.resolver.resolve(ctx.principal_id, &node).await?;
        if effective.source != CapabilitySource::Owner {
            return Err(AppError::permission_denied(format!(
                "Only the owner can {action} this document"
            )));
        }
        Ok(node)
    }

    async fn target(&self, ctx: &RequestContext, email: &str) -> AppResult<Principal> {
        let target = self
            .principals
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User with email '{}' not found", email.trim())))?;
        if target.id == ctx.principal_id {
            return Err(AppError::validation("You cannot share a document with yourself"));
        }
        Ok(target)
    }
}
