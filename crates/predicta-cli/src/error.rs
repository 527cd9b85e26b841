//! Error types for the Predicta CLI
//!
//! Every variant is user-facing, so messages say what went wrong and what to
//! try next.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Comprehensive error type for CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    /// The server answered with a non-success status
    #[error("Server error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The server answered, but not with the body we expected
    #[error("Unexpected server response: {0}. Check that --server-url points at a Predicta server.")]
    UnexpectedResponse(String),

    /// HTTP request failed
    #[error("Network request failed: {0}. Check that the server is running and the server URL is correct.")]
    Http(#[from] reqwest::Error),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your environment variables.")]
    Config(String),

    /// A local file cannot be queued for upload
    #[error("Cannot upload '{}': {reason}", path.display())]
    UnsupportedFile { path: PathBuf, reason: String },

    /// Nothing was left to upload after local checks
    #[error("No files to upload. Supported types are .csv, .xls, .xlsx and .json up to 100 MB.")]
    NoFilesSelected,

    /// The queue cannot change while a batch is being sent
    #[error("An upload is already in progress. Wait for it to finish or cancel it first.")]
    UploadInProgress,

    /// A queue entry id did not match anything
    #[error("No queued upload with id '{0}'.")]
    UnknownDescriptor(String),

    /// Processing was requested before anything was uploaded
    #[error("Nothing to process. Upload a file first.")]
    NothingToProcess,

    /// One or more files in a batch failed
    #[error("{failed} of {attempted} uploads failed. Last error: {last_error}")]
    BatchFailed {
        failed: usize,
        attempted: usize,
        last_error: String,
    },

    /// Waiting for a terminal status took too long
    #[error("Timed out after {0} seconds waiting for processing to finish. Run 'predicta status <id>' to check again later.")]
    WaitTimedOut(u64),

    /// Shared type validation failed (for example an unparsable file id)
    #[error(transparent)]
    Common(#[from] predicta_common::PredictaError),

    /// JSON parsing failed
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Generic anyhow error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Create an API error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an unsupported file error
    pub fn unsupported_file(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::UnsupportedFile {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether the server reported the file as unknown
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}
