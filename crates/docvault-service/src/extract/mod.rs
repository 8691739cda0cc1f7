//! Projection of stored bytes to human-readable text for comparison.

mod error;
mod office;
mod pdf;

use std::fmt::Debug;

use tracing::warn;

use docvault_entity::node::VersionNode;
use docvault_entity::node::model::DEFAULT_MIME_TYPE;
use docvault_storage::mime::mime_from_name;

pub use error::ExtractError;

/// Turns a node's content into text.
///
/// Implementations never fail: content they cannot read yields a
/// placeholder line instead.
pub trait TextExtractor: Send + Sync + Debug + 'static {
    /// Extract text from `data`, the content of `node`.
    fn extract_text(&self, node: &VersionNode, data: &[u8]) -> String;
}

const PDF_MIME: &str = "application/pdf";
const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const ODT_MIME: &str = "application/vnd.oasis.opendocument.text";

/// MIME types read as text.
const TEXT_MIME_TYPES: &[&str] = &[
    "text/plain",
    "text/markdown",
    "text/html",
    "text/xml",
    "text/csv",
    "text/javascript",
    "text/x-python",
    "text/x-ini",
    "text/x-config",
    "text/x-rst",
    "application/xml",
    "application/json",
    "application/javascript",
    "application/x-tex",
];

/// Extractor for text-like formats, PDF, DOCX and ODT.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentTextExtractor;

impl DocumentTextExtractor {
    /// Creates a new extractor.
    pub fn new() -> Self {
        Self
    }

    /// The MIME type to dispatch on, falling back to the file name when the
    /// stored type is generic.
    fn effective_mime(node: &VersionNode) -> String {
        let declared = node.mime_type.trim().to_lowercase();
        // Strip parameters such as "; charset=utf-8".
        let declared = declared
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        if declared.is_empty() || declared == DEFAULT_MIME_TYPE {
            if let Some(guessed) = mime_from_name(&node.name) {
                return guessed.to_string();
            }
        }
        declared
    }
}

impl TextExtractor for DocumentTextExtractor {
    fn extract_text(&self, node: &VersionNode, data: &[u8]) -> String {
        let mime = Self::effective_mime(node);
        let extracted = match mime.as_str() {
            PDF_MIME => pdf::extract(data),
            DOCX_MIME => office::extract(data, &office::DOCX),
            ODT_MIME => office::extract(data, &office::ODT),
            m if TEXT_MIME_TYPES.contains(&m) => {
                Ok(String::from_utf8_lossy(data).replace('\u{FFFD}', ""))
            }
            _ => return format!("Unsupported MIME type: {}", node.mime_type),
        };

        extracted.unwrap_or_else(|e| {
            warn!(node_id = %node.id, mime_type = %mime, error = %e, "Text extraction failed");
            format!("Unable to extract text: {e}")
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use docvault_core::traits::BlobHandle;
    use docvault_core::types::{NodeId, PrincipalId};

    use super::*;

    fn node(name: &str, mime: &str) -> VersionNode {
        let owner = PrincipalId::new();
        VersionNode {
            id: NodeId::new(),
            name: name.to_string(),
            mime_type: mime.to_string(),
            size_bytes: 0,
            checksum: String::new(),
            blob_handle: BlobHandle::new("00/00/x"),
            virtual_path: "/x".to_string(),
            version_number: 1,
            owner_id: owner,
            uploader_id: owner,
            previous_version_id: None,
            root_id: None,
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_text_types_are_decoded() {
        let extractor = DocumentTextExtractor::new();
        let text = extractor.extract_text(&node("a.json", "application/json"), br#"{"a":1}"#);
        assert_eq!(text, r#"{"a":1}"#);

        let text = extractor.extract_text(&node("a.txt", "text/plain; charset=utf-8"), b"hi");
        assert_eq!(text, "hi");
    }

    #[test]
    fn test_invalid_utf8_is_dropped() {
        let text = DocumentTextExtractor.extract_text(&node("a.txt", "text/plain"), b"ok\xff\xfe!");
        assert_eq!(text, "ok!");
    }

    #[test]
    fn test_generic_type_falls_back_to_name() {
        let text =
            DocumentTextExtractor.extract_text(&node("readme.txt", DEFAULT_MIME_TYPE), b"# Title");
        assert_eq!(text, "# Title");
    }

    #[test]
    fn test_unreadable_documents_get_reason() {
        let docx = node("a.docx", DOCX_MIME);
        let text = DocumentTextExtractor.extract_text(&docx, b"PK not really");
        assert!(text.starts_with("Unable to extract text: Invalid document archive"));
    }

    #[test]
    fn test_unknown_types_get_placeholder() {
        let image = node("a.png", "image/png");
        assert_eq!(
            DocumentTextExtractor.extract_text(&image, b"\x89PNG"),
            "Unsupported MIME type: image/png"
        );

        let blob = node("blob", DEFAULT_MIME_TYPE);
        assert_eq!(
            DocumentTextExtractor.extract_text(&blob, b"\x00"),
            format!("Unsupported MIME type: {DEFAULT_MIME_TYPE}")
        );
    }
}
