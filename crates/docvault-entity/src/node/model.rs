//! Version node entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use docvault_core::traits::BlobHandle;
use docvault_core::types::{NodeId, PrincipalId};

/// Default MIME type when none is declared or guessable.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// One immutable uploaded file instance within a version chain.
///
/// A chain root has no previous version and no stored root reference; every
/// later node points at the root and at the node it supersedes. All nodes of
/// a chain carry the chain's original owner.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VersionNode {
    /// Unique node identifier.
    pub id: NodeId,
    /// Display name (usually the uploaded file name).
    pub name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// Content size in bytes.
    pub size_bytes: i64,
    /// SHA-256 hex digest of the content.
    pub checksum: String,
    /// Where the blob store keeps the content.
    #[serde(skip_serializing)]
    pub blob_handle: BlobHandle,
    /// Logical path naming the document family.
    pub virtual_path: String,
    /// Position in the chain, starting at 1.
    pub version_number: i32,
    /// Owner of the whole chain.
    pub owner_id: PrincipalId,
    /// Principal who uploaded this particular node.
    pub uploader_id: PrincipalId,
    /// The node this one supersedes; `None` for a chain root.
    pub previous_version_id: Option<NodeId>,
    /// The chain root; `None` means this node is the root.
    pub root_id: Option<NodeId>,
    /// Free-text notes.
    pub notes: String,
    /// When the node was created.
    pub created_at: DateTime<Utc>,
}

impl VersionNode {
    /// Identifier of the chain root, resolving an absent root reference to self.
    pub fn chain_root_id(&self) -> NodeId {
        self.root_id.unwrap_or(self.id)
    }

    /// Whether this node starts its chain.
    pub fn is_root(&self) -> bool {
        self.previous_version_id.is_none()
    }

    /// Whether the given principal owns this node's chain.
    pub fn is_owned_by(&self, principal: PrincipalId) -> bool {
        self.owner_id == principal
    }
}

/// Data required to insert a new version node.
#[derive(Debug, Clone)]
pub struct NewVersionNode {
    /// Pre-allocated identifier.
    pub id: NodeId,
    /// Display name.
    pub name: String,
    /// MIME type.
    pub mime_type: String,
    /// Content size in bytes.
    pub size_bytes: i64,
    /// SHA-256 hex digest.
    pub checksum: String,
    /// Blob store handle.
    pub blob_handle: BlobHandle,
    /// Logical path.
    pub virtual_path: String,
    /// Assigned version number.
    pub version_number: i32,
    /// Chain owner.
    pub owner_id: PrincipalId,
    /// Uploading principal.
    pub uploader_id: PrincipalId,
    /// Superseded node, if any.
    pub previous_version_id: Option<NodeId>,
    /// Chain root, if this is not the root.
    pub root_id: Option<NodeId>,
    /// Free-text notes.
    pub notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(root_id: Option<NodeId>, previous_version_id: Option<NodeId>) -> VersionNode {
        let owner = PrincipalId::new();
        VersionNode {
            id: NodeId::new(),
            name: "notes.txt".to_string(),
            mime_type: "text/plain".to_string(),
            size_bytes: 2,
            checksum: "00".repeat(32),
            blob_handle: BlobHandle::new("00/00/x"),
            virtual_path: "/doc".to_string(),
            version_number: 1,
            owner_id: owner,
            uploader_id: owner,
            previous_version_id,
            root_id,
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_root_resolves_to_itself() {
        let root = node(None, None);
        assert!(root.is_root());
        assert_eq!(root.chain_root_id(), root.id);
    }

    #[test]
    fn test_successor_resolves_to_stored_root() {
        let root_id = NodeId::new();
        let successor = node(Some(root_id), Some(root_id));
        assert!(!successor.is_root());
        assert_eq!(successor.chain_root_id(), root_id);
    }

    #[test]
    fn test_blob_handle_is_not_serialized() {
        let json = serde_json::to_value(node(None, None)).expect("serialize");
        assert!(json.get("blob_handle").is_none());
        assert_eq!(json["version_number"], 1);
    }
}
