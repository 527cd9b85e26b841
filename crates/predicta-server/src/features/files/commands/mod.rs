pub mod delete;
pub mod process;
pub mod upload;

pub use delete::{DeleteFileCommand, DeleteFileError};
pub use process::{StartProcessingCommand, StartProcessingError};
pub use upload::{IntakeError, UploadFileCommand};
