//! # docvault-service
//!
//! Business logic service layer for DocVault. Each service orchestrates
//! repositories, the blob store, and the capability resolver to implement
//! one group of use cases:
//!
//! - [`UploadService`]: root-or-version resolution, deduplication, and
//!   version number assignment under concurrency
//! - [`QueryService`]: listings, detail, download by path and revision,
//!   and two-document comparison
//! - [`SharingService`]: owner-initiated grant and revoke
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod context;
pub mod document;
pub mod extract;
pub mod share;

pub use context::RequestContext;
pub use document::{QueryService, UploadRequest, UploadService};
pub use extract::{DocumentTextExtractor, TextExtractor};
pub use share::SharingService;
