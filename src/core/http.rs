use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::core::error::BackendError;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the HTTP client shared by the chat and upload clients.
///
/// `timeout` bounds the whole request; an elapsed wait surfaces as a
/// connection failure.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, BackendError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
        .user_agent(concat!("ragchat/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|err| BackendError::unexpected(format!("Failed to build HTTP client: {err}")))
}

/// Read a response body, mapping non-success statuses and malformed JSON onto
/// the matching [`BackendError`] kind.
pub async fn read_json<T: DeserializeOwned>(
    url: &str,
    response: reqwest::Response,
) -> Result<T, BackendError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| BackendError::from_reqwest(url, err))?;
    debug!(url, status = status.as_u16(), bytes = body.len(), "Backend responded");

    if !status.is_success() {
        return Err(BackendError::protocol(status.as_u16(), Some(body)));
    }

    serde_json::from_str(&body).map_err(|err| BackendError::decode(err.to_string()))
}
