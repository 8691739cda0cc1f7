//! Document use cases: uploading versions and reading them back.

pub mod query;
pub mod upload;

pub use query::{
    ComparedSide, Comparison, DocumentDetail, Download, QueryService, SharedDocument,
};
pub use upload::{UploadRequest, UploadService};
