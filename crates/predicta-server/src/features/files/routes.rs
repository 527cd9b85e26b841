use crate::api::response::{ApiResponse, ErrorResponse};
use crate::features::FeatureState;
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, Path, State,
    },
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::TryStreamExt;
use predicta_common::{ContentKind, FileId, ProcessingStarted};
use serde::Serialize;

use super::{
    commands::{
        self, DeleteFileCommand, DeleteFileError, IntakeError, StartProcessingCommand,
        StartProcessingError, UploadFileCommand,
    },
    queries::{
        self, DownloadFileError, DownloadFileQuery, GetFileError, GetFileQuery, ListFilesError,
        ListFilesQuery,
    },
};
use crate::staging::StagingError;

/// Multipart framing allowance on top of the payload limit, so the staging
/// counter rather than the body limit decides when an upload is too large.
const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

pub fn files_routes(max_upload_bytes: u64) -> Router<FeatureState> {
    let body_limit =
        usize::try_from(max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES)).unwrap_or(usize::MAX);

    Router::new()
        .route("/", get(list_files))
        .route("/upload", post(upload_file).layer(DefaultBodyLimit::max(body_limit)))
        .route("/:id", get(get_file).delete(delete_file))
        .route("/:id/download", get(download_file))
        .route("/:id/process", post(start_processing))
}

/// Unparsable ids cannot name a stored file.
fn parse_id(raw: &str) -> Result<FileId, FileApiError> {
    raw.parse().map_err(|_| FileApiError::NotFound)
}

fn from_multipart(err: MultipartError, limit: u64) -> StagingError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        StagingError::TooLarge { limit }
    } else {
        StagingError::Stream(err.body_text())
    }
}

#[tracing::instrument(skip(state, multipart))]
async fn upload_file(
    State(state): State<FeatureState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, FileApiError> {
    let Ok(mut multipart) = multipart else {
        return Err(IntakeError::NoFilePresent.into());
    };
    let limit = state.staging.max_bytes();
    let mut command = UploadFileCommand::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| IntakeError::from(from_multipart(e, limit)))?
    {
        if field.name() != Some("file") || command.payload.is_some() {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        // Reject before staging so unsupported bodies never touch disk.
        let content_type = field.content_type().map(str::to_string);
        if content_type.as_deref().and_then(ContentKind::from_mime).is_none() {
            return Err(IntakeError::UnsupportedType { declared: content_type }.into());
        }

        let staged = state
            .staging
            .stage(field.map_err(move |e| from_multipart(e, limit)))
            .await
            .map_err(IntakeError::from)?;

        command.filename = filename;
        command.content_type = content_type;
        command.payload = Some(staged);
    }

    let receipt = commands::upload::handle(state.store.as_ref(), command, limit).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(receipt, "File uploaded successfully")),
    )
        .into_response())
}

async fn list_files(State(state): State<FeatureState>) -> Result<Response, FileApiError> {
    let files = queries::list::handle(state.store.as_ref(), ListFilesQuery).await?;
    Ok(ApiResponse::list(files).into_response())
}

async fn get_file(
    State(state): State<FeatureState>,
    Path(id): Path<String>,
) -> Result<Response, FileApiError> {
    let query = GetFileQuery { id: parse_id(&id)? };
    let summary = queries::get::handle(state.store.as_ref(), query).await?;
    Ok(ApiResponse::success(summary).into_response())
}

#[tracing::instrument(skip(state))]
async fn download_file(
    State(state): State<FeatureState>,
    Path(id): Path<String>,
) -> Result<Response, FileApiError> {
    let query = DownloadFileQuery { id: parse_id(&id)? };
    let response = queries::download::handle(state.store.as_ref(), query).await?;

    let content_type = HeaderValue::from_str(&response.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        disposition_filename(&response.filename)
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type), (header::CONTENT_DISPOSITION, disposition)],
        response.payload,
    )
        .into_response())
}

/// Quoted-string safe rendering of a client-supplied name.
fn disposition_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect()
}

#[tracing::instrument(skip(state))]
async fn delete_file(
    State(state): State<FeatureState>,
    Path(id): Path<String>,
) -> Result<Response, FileApiError> {
    let command = DeleteFileCommand { id: parse_id(&id)? };
    commands::delete::handle(state.store.as_ref(), command).await?;
    Ok(ApiResponse::message("File deleted successfully").into_response())
}

#[tracing::instrument(skip(state))]
async fn start_processing(
    State(state): State<FeatureState>,
    Path(id): Path<String>,
) -> Result<Response, FileApiError> {
    let command = StartProcessingCommand { id: parse_id(&id)? };
    let ticket = commands::process::handle(&state.processing, command).await?;

    let message = if ticket.armed {
        "File processing started".to_string()
    } else {
        format!("File is already {}", ticket.status)
    };
    let body = ProcessingStarted { file_id: ticket.file_id, status: ticket.status };

    Ok(Json(ProcessingResponse {
        file_id: ticket.file_id,
        envelope: ApiResponse::with_message(body, message),
    })
    .into_response())
}

/// Processing acknowledgement; `fileId` is repeated at the top level.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessingResponse {
    #[serde(flatten)]
    envelope: ApiResponse<ProcessingStarted>,
    file_id: FileId,
}

#[derive(Debug, thiserror::Error)]
enum FileApiError {
    #[error("File not found")]
    NotFound,
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    List(#[from] ListFilesError),
    #[error(transparent)]
    Get(#[from] GetFileError),
    #[error(transparent)]
    Download(#[from] DownloadFileError),
    #[error(transparent)]
    Delete(#[from] DeleteFileError),
    #[error(transparent)]
    Process(#[from] StartProcessingError),
}

impl FileApiError {
    fn not_found() -> Response {
        ErrorResponse::new("NOT_FOUND", "File not found").into_response_with(StatusCode::NOT_FOUND)
    }

    fn storage_failure(&self) -> Response {
        tracing::error!(error = %self, "File store failure");
        ErrorResponse::new("STORAGE_ERROR", "A storage error occurred")
            .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for FileApiError {
    fn into_response(self) -> Response {
        match &self {
            FileApiError::NotFound
            | FileApiError::Get(GetFileError::NotFound)
            | FileApiError::Download(DownloadFileError::NotFound)
            | FileApiError::Delete(DeleteFileError::NotFound)
            | FileApiError::Process(StartProcessingError::NotFound) => Self::not_found(),

            FileApiError::Intake(IntakeError::NoFilePresent) => {
                ErrorResponse::new("NO_FILE", self.to_string())
                    .into_response_with(StatusCode::BAD_REQUEST)
            },
            FileApiError::Intake(IntakeError::UnsupportedType { declared }) => {
                tracing::debug!(declared = ?declared, "Rejected upload type");
                ErrorResponse::new("UNSUPPORTED_TYPE", self.to_string())
                    .into_response_with(StatusCode::BAD_REQUEST)
            },
            FileApiError::Intake(IntakeError::PayloadTooLarge { .. }) => {
                ErrorResponse::new("PAYLOAD_TOO_LARGE", self.to_string())
                    .into_response_with(StatusCode::PAYLOAD_TOO_LARGE)
            },
            FileApiError::Intake(IntakeError::Malformed(_)) => {
                ErrorResponse::new("MALFORMED_UPLOAD", self.to_string())
                    .into_response_with(StatusCode::BAD_REQUEST)
            },
            FileApiError::Intake(IntakeError::Staging(_)) => {
                tracing::error!(error = %self, "Upload staging failed");
                ErrorResponse::new("STAGING_ERROR", "The upload could not be staged")
                    .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
            },

            FileApiError::Intake(IntakeError::Store(_))
            | FileApiError::List(_)
            | FileApiError::Get(GetFileError::Store(_))
            | FileApiError::Download(DownloadFileError::Store(_))
            | FileApiError::Delete(DeleteFileError::Store(_))
            | FileApiError::Process(StartProcessingError::Processing(_)) => self.storage_failure(),
        }
    }
}
