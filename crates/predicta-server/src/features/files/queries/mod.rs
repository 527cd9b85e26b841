pub mod download;
pub mod get;
pub mod list;

pub use download::{DownloadFileError, DownloadFileQuery, DownloadFileResponse};
pub use get::{GetFileError, GetFileQuery};
pub use list::{ListFilesError, ListFilesQuery};
