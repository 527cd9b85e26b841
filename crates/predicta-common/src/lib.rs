//! Predicta Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, error handling and logging for the Predicta workspace.
//!
//! # Overview
//!
//! This crate is used by both the server and the CLI:
//!
//! - **Types**: file identifiers, lifecycle status, content kinds and the wire
//!   projections exchanged over HTTP
//! - **Error Handling**: the shared error and result types
//! - **Logging**: `tracing` subscriber bootstrap driven by `LOG_*` variables
//!
//! # Example
//!
//! ```
//! use predicta_common::types::{ContentKind, FileStatus};
//!
//! let kind = ContentKind::from_mime("text/csv; charset=utf-8");
//! assert_eq!(kind, Some(ContentKind::Csv));
//! assert!(FileStatus::Uploaded.can_transition_to(FileStatus::Processing));
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{PredictaError, Result};
pub use types::{
    ContentKind, FileId, FileMetadata, FileStatus, FileSummary, ProcessingStarted, UploadReceipt,
    MAX_UPLOAD_BYTES,
};
