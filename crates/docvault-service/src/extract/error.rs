//! Failures while reading a document format.

use thiserror::Error;

/// Why a document's text could not be read.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The container is not a readable ZIP archive.
    #[error("Invalid document archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// The document body is not well-formed XML.
    #[error("Invalid document XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Reading an archive entry failed.
    #[error("Failed to read document entry: {0}")]
    Io(#[from] std::io::Error),

    /// The document body exceeds the extraction limit.
    #[error("Document body exceeds {limit} bytes")]
    TooLarge {
        /// Maximum body size in bytes.
        limit: u64,
    },

    /// The PDF parser rejected the document.
    #[error("Invalid PDF: {0}")]
    Pdf(String),
}
