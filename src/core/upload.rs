//! Client for the backend's document ingestion endpoint.
//!
//! Uploads are independent of any conversation: nothing here reads or
//! writes session state.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::api::{UploadResponse, UPLOAD_ENDPOINT, UPLOAD_FIELD};
use crate::core::error::{status_label, BackendError};
use crate::core::http::read_json;
use crate::utils::url::construct_api_url;

pub const PDF_MIME: &str = "application/pdf";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub filename: String,
    pub processed_chunks: u64,
}

impl UploadResult {
    pub fn summary(&self) -> String {
        format!(
            "PDF '{}' uploaded successfully! Processed {} pages.",
            self.filename, self.processed_chunks
        )
    }
}

impl From<UploadResponse> for UploadResult {
    fn from(response: UploadResponse) -> Self {
        Self {
            filename: response.filename,
            processed_chunks: response.processed_chunks,
        }
    }
}

#[derive(Clone)]
pub struct DocumentUploadClient {
    client: reqwest::Client,
    base_url: String,
}

impl DocumentUploadClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn endpoint(&self) -> String {
        construct_api_url(&self.base_url, UPLOAD_ENDPOINT)
    }

    pub async fn upload_document(
        &self,
        file_name: &str,
        content: Vec<u8>,
        mime_type: &str,
    ) -> Result<UploadResult, BackendError> {
        let url = self.endpoint();
        debug!(url = %url, file_name, bytes = content.len(), mime_type, "Uploading document");

        let part = Part::bytes(content)
            .file_name(file_name.to_string())
            .mime_str(mime_type)
            .map_err(|err| BackendError::unexpected(format!("Invalid MIME type {mime_type}: {err}")))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|err| BackendError::from_reqwest(&url, err))?;

        let body: UploadResponse = read_json(&url, response).await?;
        Ok(body.into())
    }

    /// Read a PDF from disk and upload it under its own file name.
    pub async fn upload_path(&self, path: &Path) -> Result<UploadResult, BackendError> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| BackendError::unexpected(format!("Not a file: {}", path.display())))?;

        let mime_type = guess_mime(path);
        if mime_type != PDF_MIME {
            return Err(BackendError::unexpected(format!(
                "Only PDF documents can be uploaded (got {file_name}, {mime_type})"
            )));
        }

        let content = tokio::fs::read(path).await.map_err(|err| {
            BackendError::unexpected(format!("Failed to read {}: {err}", path.display()))
        })?;

        self.upload_document(&file_name, content, &mime_type).await
    }
}

pub fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// User-facing text for a failed upload.
pub fn upload_failure_message(err: &BackendError) -> String {
    match err {
        BackendError::Connection { .. } => {
            "Could not connect to the backend. Please ensure it's running.".to_string()
        }
        BackendError::Protocol { status, .. } => format!(
            "Error uploading document: HTTP {}. Response: {}",
            status_label(*status),
            err.backend_detail()
                .unwrap_or_else(|| "No response from backend.".to_string())
        ),
        BackendError::Decode { .. } => {
            format!("Error uploading document: {err}")
        }
        BackendError::Unexpected { detail } => {
            format!("An unexpected error occurred during upload: {detail}")
        }
    }
}
