pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{
    DeleteFileCommand, DeleteFileError, IntakeError, StartProcessingCommand, StartProcessingError,
    UploadFileCommand,
};

pub use queries::{
    DownloadFileError, DownloadFileQuery, DownloadFileResponse, GetFileError, GetFileQuery,
    ListFilesError, ListFilesQuery,
};

pub use routes::files_routes;
