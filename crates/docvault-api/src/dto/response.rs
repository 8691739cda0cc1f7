//! Response DTOs.

use serde::{Deserialize, Serialize};

use docvault_entity::node::VersionNode;
use docvault_entity::permission::CapabilitySet;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Database reachability.
    pub database: String,
    /// Blob store reachability.
    pub storage: String,
}

/// Result of an upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    /// Human-readable outcome.
    pub message: String,
    /// Version number assigned.
    pub version: i32,
    /// SHA-256 of the content.
    pub checksum: String,
    /// The created node.
    pub document: VersionNode,
}

impl From<VersionNode> for UploadResponse {
    fn from(node: VersionNode) -> Self {
        let message = if node.is_root() {
            format!("Created '{}'", node.virtual_path)
        } else {
            format!(
                "Uploaded version {} of '{}'",
                node.version_number, node.virtual_path
            )
        };
        Self {
            message,
            version: node.version_number,
            checksum: node.checksum.clone(),
            document: node,
        }
    }
}

/// Result of a grant.
#[derive(Debug, Clone, Serialize)]
pub struct ShareResponse {
    /// Human-readable outcome.
    pub message: String,
    /// Capabilities the recipient now holds.
    pub permissions: CapabilitySet,
}

/// Result of a revoke.
#[derive(Debug, Clone, Serialize)]
pub struct UnshareResponse {
    /// Human-readable outcome.
    pub message: String,
    /// Grants removed.
    pub removed: u64,
}
