use std::error::Error as StdError;
use std::fmt;

/// Failure kinds surfaced by the backend clients.
///
/// The set is closed so callers can recover with an exhaustive `match`.
#[derive(Debug)]
pub enum BackendError {
    /// The backend could not be reached, or the bounded wait elapsed.
    Connection { url: String, detail: String },

    /// The backend answered with a non-success status.
    Protocol { status: u16, body: Option<String> },

    /// The response body was not the structured data we expected.
    Decode { detail: String },

    /// Anything that does not fit the categories above.
    Unexpected { detail: String },
}

impl BackendError {
    pub fn connection(url: impl Into<String>, detail: impl Into<String>) -> Self {
        BackendError::Connection {
            url: url.into(),
            detail: detail.into(),
        }
    }

    pub fn protocol(status: u16, body: Option<String>) -> Self {
        let body = body.filter(|text| !text.trim().is_empty());
        BackendError::Protocol { status, body }
    }

    pub fn decode(detail: impl Into<String>) -> Self {
        BackendError::Decode {
            detail: detail.into(),
        }
    }

    pub fn unexpected(detail: impl Into<String>) -> Self {
        BackendError::Unexpected {
            detail: detail.into(),
        }
    }

    /// Classify a transport-level error raised while sending or reading.
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            BackendError::connection(url, err.to_string())
        } else if err.is_decode() {
            BackendError::decode(err.to_string())
        } else if let Some(status) = err.status() {
            BackendError::protocol(status.as_u16(), None)
        } else {
            BackendError::unexpected(err.to_string())
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            BackendError::Connection { .. } => "connection",
            BackendError::Protocol { .. } => "protocol",
            BackendError::Decode { .. } => "decode",
            BackendError::Unexpected { .. } => "unexpected",
        }
    }

    /// Human-readable error text from a protocol failure body.
    ///
    /// JSON bodies are searched for `detail`, `error.message`, `error` and
    /// `message`; anything else is returned trimmed as-is.
    pub fn backend_detail(&self) -> Option<String> {
        let BackendError::Protocol {
            body: Some(body), ..
        } = self
        else {
            return None;
        };
        let trimmed = body.trim();
        let summary = serde_json::from_str::<serde_json::Value>(trimmed)
            .ok()
            .and_then(|value| extract_error_summary(&value));
        Some(summary.unwrap_or_else(|| trimmed.to_string()))
    }
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .get("detail")
        .and_then(|v| match v {
            serde_json::Value::String(s) => Some(s.to_string()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        })
        .or_else(|| {
            value
                .pointer("/error/message")
                .and_then(|v| v.as_str())
                .map(str::to_owned)
        })
        .or_else(|| value.get("error").and_then(|v| v.as_str().map(str::to_owned)))
        .or_else(|| value.get("message").and_then(|v| v.as_str().map(str::to_owned)));

    summary.map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
}

pub(crate) fn status_label(status: u16) -> String {
    match reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
    {
        Some(reason) => format!("{status} {reason}"),
        None => status.to_string(),
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Connection { url, detail } => {
                write!(f, "Could not connect to the backend at {url}: {detail}")
            }
            BackendError::Protocol { status, .. } => match self.backend_detail() {
                Some(detail) => write!(f, "HTTP {}: {}", status_label(*status), detail),
                None => write!(f, "HTTP {}", status_label(*status)),
            },
            BackendError::Decode { detail } => {
                write!(f, "Invalid response from backend: {detail}")
            }
            BackendError::Unexpected { detail } => write!(f, "{detail}"),
        }
    }
}

impl StdError for BackendError {}
