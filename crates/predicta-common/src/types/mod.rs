//! Common types used across Predicta
//!
//! These are the domain values and wire projections shared by the server and
//! the CLI. Field names serialise in camelCase.

mod content;
mod file;
mod id;
mod status;

pub use content::ContentKind;
pub use file::{FileMetadata, FileSummary, ProcessingStarted, UploadReceipt};
pub use id::FileId;
pub use status::FileStatus;

/// Largest payload accepted by the intake (100 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;
