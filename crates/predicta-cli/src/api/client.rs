//! HTTP API client for the Predicta server

use crate::api::{endpoints, types::*};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::orchestrator::{Transport, UploadSource};
use async_trait::async_trait;
use predicta_common::FileId;
use reqwest::{header, multipart, Body, Client, Response};
use serde::de::DeserializeOwned;
use tokio_util::io::ReaderStream;

/// API client for the Predicta server
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_config(&Config::with_server_url(base_url)?)
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::with_config(&Config::from_env()?)
    }

    pub fn with_config(config: &Config) -> Result<Self> {
        let client = Client::builder().timeout(config.api_timeout).build()?;
        Ok(Self {
            client,
            base_url: config.server_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check server health
    pub async fn health_check(&self) -> Result<bool> {
        let url = endpoints::health_url(&self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// All stored files, oldest first
    pub async fn list_files(&self) -> Result<Vec<FileSummary>> {
        let url = endpoints::files_url(&self.base_url);
        let response = self.client.get(&url).send().await?;
        let envelope: ApiEnvelope<Vec<FileSummary>> = decode(response).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// One stored file, without its payload
    pub async fn get_file(&self, id: FileId) -> Result<FileSummary> {
        let url = endpoints::file_url(&self.base_url, id);
        let response = self.client.get(&url).send().await?;
        let envelope: ApiEnvelope<FileSummary> = decode(response).await?;
        require_data(envelope)
    }

    /// Upload a local file as the `file` field of a multipart form. The body
    /// is streamed from disk.
    #[tracing::instrument(skip(self, source), fields(name = %source.name, size = source.size))]
    pub async fn upload_file(&self, source: &UploadSource) -> Result<UploadReceipt> {
        let file = tokio::fs::File::open(&source.path).await?;
        let length = file.metadata().await?.len();
        let body = Body::wrap_stream(ReaderStream::new(file));
        let part = multipart::Part::stream_with_length(body, length)
            .file_name(source.name.clone())
            .mime_str(&source.content_type)?;
        let form = multipart::Form::new().part("file", part);

        let url = endpoints::upload_url(&self.base_url);
        let response = self.client.post(&url).multipart(form).send().await?;
        let envelope: ApiEnvelope<UploadReceipt> = decode(response).await?;
        require_data(envelope)
    }

    /// Fetch a stored payload
    pub async fn download_file(&self, id: FileId) -> Result<DownloadedFile> {
        let url = endpoints::download_url(&self.base_url, id);
        let response = self.client.get(&url).send().await?;
        let response = check_status(response).await?;

        let header_text = |name: header::HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        let filename = header_text(header::CONTENT_DISPOSITION)
            .as_deref()
            .and_then(disposition_filename);
        let content_type = header_text(header::CONTENT_TYPE);

        let bytes = response.bytes().await?.to_vec();

        Ok(DownloadedFile {
            filename,
            content_type,
            bytes,
        })
    }

    /// Delete a stored file; returns the server's confirmation message
    pub async fn delete_file(&self, id: FileId) -> Result<String> {
        let url = endpoints::file_url(&self.base_url, id);
        let response = self.client.delete(&url).send().await?;
        let envelope: ApiEnvelope<serde_json::Value> = decode(response).await?;
        Ok(envelope
            .message
            .unwrap_or_else(|| "File deleted successfully".to_string()))
    }

    /// Ask the server to start processing
    pub async fn start_processing(&self, id: FileId) -> Result<ProcessingReply> {
        let url = endpoints::process_url(&self.base_url, id);
        let response = self.client.post(&url).send().await?;
        let envelope: ApiEnvelope<ProcessingStarted> = decode(response).await?;
        let message = envelope.message.clone();
        Ok(ProcessingReply {
            message,
            started: require_data(envelope)?,
        })
    }
}

#[async_trait]
impl Transport for ApiClient {
    async fn upload(&self, source: &UploadSource) -> Result<UploadReceipt> {
        self.upload_file(source).await
    }

    async fn start_processing(&self, id: FileId) -> Result<ProcessingReply> {
        ApiClient::start_processing(self, id).await
    }
}

/// Turn a non-success status into [`CliError::Api`] using the server's
/// error body when it has one.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&text)
        .ok()
        .and_then(|body| body.message)
        .or_else(|| (!text.trim().is_empty()).then(|| text.trim().to_string()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

    Err(CliError::api(status.as_u16(), message))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<ApiEnvelope<T>> {
    let response = check_status(response).await?;
    let envelope: ApiEnvelope<T> = response
        .json()
        .await
        .map_err(|e| CliError::UnexpectedResponse(e.to_string()))?;

    if !envelope.success {
        return Err(CliError::UnexpectedResponse(
            envelope
                .message
                .unwrap_or_else(|| "the server reported failure".to_string()),
        ));
    }
    Ok(envelope)
}

fn require_data<T>(envelope: ApiEnvelope<T>) -> Result<T> {
    envelope
        .data
        .ok_or_else(|| CliError::UnexpectedResponse("response has no data".to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client = ApiClient::new("http://localhost:5000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(ApiClient::new("localhost:5000").is_err());
    }
}
