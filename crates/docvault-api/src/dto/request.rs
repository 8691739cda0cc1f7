//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use docvault_core::types::NodeId;

/// Share a document with another principal.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ShareRequest {
    /// Any version of the document.
    pub file_id: NodeId,
    /// Email of the recipient.
    #[validate(email(message = "A valid user_email is required"))]
    pub user_email: String,
    /// Grant edit in addition to view.
    #[serde(default)]
    pub can_edit: bool,
}

/// Withdraw all access a principal holds on a document.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UnshareRequest {
    /// Any version of the document.
    pub file_id: NodeId,
    /// Email of the principal losing access.
    #[validate(email(message = "A valid user_email is required"))]
    pub user_email: String,
}

/// Query string of the download endpoint. A `token` parameter is read by
/// the auth extractor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadQuery {
    /// Exact version number to serve.
    pub revision: Option<i32>,
}

/// Query string of the compare endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompareQuery {
    pub left_id: Option<NodeId>,
    pub right_id: Option<NodeId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_request_requires_email() {
        let request: ShareRequest = serde_json::from_value(serde_json::json!({
            "file_id": NodeId::new(),
            "user_email": "not-an-email",
        }))
        .expect("deserialize");
        assert!(!request.can_edit);
        assert!(request.validate().is_err());

        let request = ShareRequest {
            user_email: "bob@example.com".to_string(),
            ..request
        };
        assert!(request.validate().is_ok());
    }
}
