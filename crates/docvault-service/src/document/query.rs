//! Read path: listings, detail, download by path and comparison.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, info};

use docvault_auth::capability::CapabilityResolver;
use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_core::traits::BlobStore;
use docvault_core::types::{NodeId, PrincipalId};
use docvault_database::repositories::VersionNodeRepository;
use docvault_entity::node::VersionNode;
use docvault_entity::permission::{Capability, CapabilitySet};

use crate::context::RequestContext;
use crate::extract::TextExtractor;

/// A chain root shared with the caller.
#[derive(Debug, Clone, Serialize)]
pub struct SharedDocument {
    /// The chain root.
    #[serde(flatten)]
    pub node: VersionNode,
    /// Email of the chain owner.
    pub owner_email: String,
    /// What the caller may do with the chain.
    pub capabilities: CapabilitySet,
}

/// A node together with every version of its chain.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentDetail {
    /// The requested node.
    pub node: VersionNode,
    /// Chain nodes, newest first.
    pub versions: Vec<VersionNode>,
}

/// Content resolved by path.
#[derive(Debug, Clone)]
pub struct Download {
    /// The node served.
    pub node: VersionNode,
    /// Its content.
    pub data: Bytes,
}

/// One side of a comparison.
#[derive(Debug, Clone, Serialize)]
pub struct ComparedSide {
    pub id: NodeId,
    pub name: String,
    pub version_number: i32,
    pub text: String,
}

/// Text of two nodes, side by side.
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub left: ComparedSide,
    pub right: ComparedSide,
}

/// Which side of a comparison a node is on.
#[derive(Debug, Clone, Copy)]
enum Side {
    Left,
    Right,
}

impl Side {
    fn label(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }
}

/// How a download candidate relates to the caller. Lower is preferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Relation {
    Owner,
    Viewer,
    Stranger,
}

/// Read-side service for documents.
#[derive(Clone)]
pub struct QueryService {
    /// Version node repository.
    nodes: Arc<VersionNodeRepository>,
    /// Capability decision point.
    resolver: Arc<CapabilityResolver>,
    /// Blob store for content.
    blobs: Arc<dyn BlobStore>,
    /// Text projection used by compare.
    extractor: Arc<dyn TextExtractor>,
}

impl std::fmt::Debug for QueryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryService")
            .field("blobs", &self.blobs.provider_type())
            .field("extractor", &self.extractor)
            .finish()
    }
}

impl QueryService {
    /// Creates a new query service.
    pub fn new(
        nodes: Arc<VersionNodeRepository>,
        resolver: Arc<CapabilityResolver>,
        blobs: Arc<dyn BlobStore>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        Self {
            nodes,
            resolver,
            blobs,
            extractor,
        }
    }

    /// Chain roots owned by the caller, oldest first.
    pub async fn list_owned(&self, ctx: &RequestContext) -> AppResult<Vec<VersionNode>> {
        self.nodes.find_roots_by_owner(ctx.principal_id).await
    }

    /// Chain roots owned by others on which the caller holds `view`.
    pub async fn list_shared_with_me(
        &self,
        ctx: &RequestContext,
    ) -> AppResult<Vec<SharedDocument>> {
        let roots = self.nodes.find_roots_shared_with(ctx.principal_id).await?;
        let mut shared = Vec::with_capacity(roots.len());
        for root in roots {
            let effective = self.resolver.resolve(ctx.principal_id, &root.node).await?;
            shared.push(SharedDocument {
                node: root.node,
                owner_email: root.owner_email,
                capabilities: effective.capabilities,
            });
        }
        Ok(shared)
    }

    /// A node and its chain's versions. Nodes the caller cannot view are
    /// reported as missing.
    pub async fn get_detail(
        &self,
        ctx: &RequestContext,
        node_id: NodeId,
    ) -> AppResult<DocumentDetail> {
        let node = self.visible_node(ctx.principal_id, node_id).await?;
        let versions = self.nodes.find_chain(node.chain_root_id()).await?;
        Ok(DocumentDetail { node, versions })
    }

    /// The versions of the chain containing a node, newest first.
    pub async fn list_versions(
        &self,
        ctx: &RequestContext,
        node_id: NodeId,
    ) -> AppResult<Vec<VersionNode>> {
        let node = self.visible_node(ctx.principal_id, node_id).await?;
        self.nodes.find_chain(node.chain_root_id()).await
    }

    /// Resolve a path (and optional revision) to content.
    ///
    /// When several chains share the path, the caller's own chain is
    /// preferred, then chains the caller can view. Within a chain the
    /// requested revision or the newest version is served.
    pub async fn download_by_path(
        &self,
        principal: Option<PrincipalId>,
        virtual_path: &str,
        revision: Option<i32>,
    ) -> AppResult<Download> {
        let Some(principal) = principal else {
            return Err(AppError::permission_denied(
                "Authentication is required to download this file",
            ));
        };

        let at_path = self.nodes.find_by_path(virtual_path).await?;
        if at_path.is_empty() {
            return Err(AppError::not_found("No such file found"));
        }

        let candidates: Vec<VersionNode> = match revision {
            Some(rev) => at_path
                .into_iter()
                .filter(|n| n.version_number == rev)
                .collect(),
            None => at_path,
        };
        if candidates.is_empty() {
            return Err(AppError::not_found("Specified revision not found"));
        }

        let mut relations: HashMap<NodeId, Relation> = HashMap::new();
        let mut best: Option<(Relation, VersionNode)> = None;
        for node in candidates {
            let root_id = node.chain_root_id();
            let relation = match relations.get(&root_id) {
                Some(r) => *r,
                None => {
                    let r = self.relation(principal, &node).await?;
                    relations.insert(root_id, r);
                    r
                }
            };
            let better = match &best {
                None => true,
                Some((best_rel, best_node)) => {
                    (relation, std::cmp::Reverse(node.version_number), node.created_at)
                        < (
                            *best_rel,
                            std::cmp::Reverse(best_node.version_number),
                            best_node.created_at,
                        )
                }
            };
            if better {
                best = Some((relation, node));
            }
        }

        let Some((relation, node)) = best else {
            return Err(AppError::not_found("No such file found"));
        };
        if relation == Relation::Stranger {
            return Err(AppError::permission_denied(
                "You do not have permission to download this file",
            ));
        }

        let data = self.blobs.get(&node.blob_handle).await.map_err(|e| {
            if e.kind == ErrorKind::NotFound {
                AppError::with_source(ErrorKind::NotFound, "File not found on disk", e)
            } else {
                e
            }
        })?;

        info!(
            principal_id = %principal,
            node_id = %node.id,
            virtual_path,
            version = node.version_number,
            "File downloaded"
        );
        Ok(Download { node, data })
    }

    /// Text of two nodes for side-by-side display. Both nodes must exist
    /// before either is access-checked; failures name the side.
    pub async fn compare(
        &self,
        ctx: &RequestContext,
        left_id: NodeId,
        right_id: NodeId,
    ) -> AppResult<Comparison> {
        let left = self.compared_node(left_id, Side::Left).await?;
        let right = self.compared_node(right_id, Side::Right).await?;
        self.require_view(ctx.principal_id, &left, Side::Left).await?;
        self.require_view(ctx.principal_id, &right, Side::Right).await?;

        let left = self.project(left).await?;
        let right = self.project(right).await?;
        debug!(left = %left.id, right = %right.id, "Compared documents");
        Ok(Comparison { left, right })
    }

    async fn compared_node(&self, node_id: NodeId, side: Side) -> AppResult<VersionNode> {
        self.nodes
            .find_by_id(node_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("{} file not found", side.title())))
    }

    async fn require_view(
        &self,
        principal: PrincipalId,
        node: &VersionNode,
        side: Side,
    ) -> AppResult<()> {
        self.resolver
            .require(
                principal,
                node,
                Capability::View,
                format!("You do not have permission to view the {} file", side.label()),
            )
            .await
    }

    async fn project(&self, node: VersionNode) -> AppResult<ComparedSide> {
        let data = self.blobs.get(&node.blob_handle).await?;
        let extractor = Arc::clone(&self.extractor);
        let (node, text) = tokio::task::spawn_blocking(move || {
            let text = extractor.extract_text(&node, &data);
            (node, text)
        })
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Text extraction task panicked", e))?;

        Ok(ComparedSide {
            id: node.id,
            name: node.name,
            version_number: node.version_number,
            text,
        })
    }

    async fn relation(&self, principal: PrincipalId, node: &VersionNode) -> AppResult<Relation> {
        if node.is_owned_by(principal) {
            return Ok(Relation::Owner);
        }
        if self
            .resolver
            .has_capability(principal, node, Capability::View)
            .await?
        {
            Ok(Relation::Viewer)
        } else {
            Ok(Relation::Stranger)
        }
    }

    /// A node the caller may view; anything else is NotFound.
    async fn visible_node(&self, principal: PrincipalId, node_id: NodeId) -> AppResult<VersionNode> {
        let not_found = || AppError::not_found(format!("Document {node_id} not found"));
        let node = self.nodes.find_by_id(node_id).await?.ok_or_else(not_found)?;
        if self
            .resolver
            .has_capability(principal, &node, Capability::View)
            .await?
        {
            Ok(node)
        } else {
            Err(not_found())
        }
    }
}
