//! Wire payloads for the agent backend's HTTP endpoints.

use serde::{Deserialize, Serialize};

use crate::core::trace::TraceEvent;

pub const CHAT_ENDPOINT: &str = "chat/";
pub const UPLOAD_ENDPOINT: &str = "upload-document/";

/// Name of the multipart field the ingestion endpoint reads the document from.
pub const UPLOAD_FIELD: &str = "file";

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub session_id: String,
    pub query: String,
    pub enable_web_search: bool,
}

#[derive(Deserialize, Debug)]
pub struct ChatResponse {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub trace_events: Option<Vec<TraceEvent>>,
}

#[derive(Deserialize, Debug)]
pub struct UploadResponse {
    pub filename: String,
    pub processed_chunks: u64,
}
