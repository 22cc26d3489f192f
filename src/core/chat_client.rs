//! Client for the backend's `/chat/` endpoint.

use async_trait::async_trait;
use tracing::debug;

use crate::api::{ChatRequest, ChatResponse, CHAT_ENDPOINT};
use crate::core::error::BackendError;
use crate::core::http::read_json;
use crate::core::trace::TraceEvent;
use crate::utils::url::construct_api_url;

pub const FALLBACK_RESPONSE: &str = "Sorry, I couldn't get a response from the agent.";

#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub response: String,
    pub trace_events: Vec<TraceEvent>,
}

/// Anything that can answer a query for a session.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send_query(
        &self,
        session_id: &str,
        query: &str,
        enable_web_search: bool,
    ) -> Result<ChatReply, BackendError>;
}

#[derive(Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn endpoint(&self) -> String {
        construct_api_url(&self.base_url, CHAT_ENDPOINT)
    }
}

#[async_trait]
impl ChatBackend for ChatClient {
    async fn send_query(
        &self,
        session_id: &str,
        query: &str,
        enable_web_search: bool,
    ) -> Result<ChatReply, BackendError> {
        if query.trim().is_empty() {
            return Err(BackendError::unexpected("query must not be empty"));
        }

        let url = self.endpoint();
        let request = ChatRequest {
            session_id: session_id.to_string(),
            query: query.to_string(),
            enable_web_search,
        };
        debug!(url = %url, session_id, enable_web_search, "Sending chat query");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|err| BackendError::from_reqwest(&url, err))?;

        let body: ChatResponse = read_json(&url, response).await?;
        Ok(ChatReply {
            response: body
                .response
                .unwrap_or_else(|| FALLBACK_RESPONSE.to_string()),
            trace_events: body.trace_events.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::{
        serve_once, serve_stalled, test_http_client, unreachable_base_url,
    };
    use serde_json::json;

    #[tokio::test]
    async fn send_query_posts_json_and_decodes_trace() {
        let body = json!({
            "response": "Paris is the capital of France.",
            "trace_events": [
                {"step": 1, "node_name": "router", "description": "Routed to RAG", "details": {}},
                {"step": 2, "node_name": "rag_lookup", "description": "Searched KB",
                 "details": {"sufficiency_verdict": "Sufficient"}}
            ]
        })
        .to_string();
        let (base_url, server) = serve_once("200 OK", "application/json", &body).await;
        let client = ChatClient::new(test_http_client(), format!("{base_url}/"));

        let reply = client
            .send_query("session-1", "Capital of France?", true)
            .await
            .expect("query should succeed");

        assert_eq!(reply.response, "Paris is the capital of France.");
        assert_eq!(reply.trace_events.len(), 2);
        assert_eq!(reply.trace_events[1].node_name, "rag_lookup");

        let captured = server.await.expect("server task").expect("server io");
        assert_eq!(captured.request_line, "POST /chat/ HTTP/1.1");
        assert!(captured
            .header("content-type")
            .is_some_and(|value| value.starts_with("application/json")));
        assert_eq!(
            captured.body_json(),
            json!({"session_id": "session-1", "query": "Capital of France?", "enable_web_search": true})
        );
    }

    #[tokio::test]
    async fn missing_fields_fall_back_to_defaults() {
        let (base_url, server) = serve_once("200 OK", "application/json", "{}").await;
        let client = ChatClient::new(test_http_client(), base_url);

        let reply = client
            .send_query("s", "hello", false)
            .await
            .expect("query should succeed");

        assert_eq!(reply.response, FALLBACK_RESPONSE);
        assert!(reply.trace_events.is_empty());
        server.await.expect("server task").expect("server io");
    }

    #[tokio::test]
    async fn non_success_status_is_protocol_failure_with_body() {
        let (base_url, server) = serve_once(
            "500 Internal Server Error",
            "application/json",
            r#"{"detail":"graph execution failed"}"#,
        )
        .await;
        let client = ChatClient::new(test_http_client(), base_url);

        let err = client
            .send_query("s", "hello", true)
            .await
            .expect_err("query should fail");

        match &err {
            BackendError::Protocol { status, .. } => assert_eq!(*status, 500),
            other => panic!("expected protocol failure, got {other:?}"),
        }
        assert_eq!(err.backend_detail().as_deref(), Some("graph execution failed"));
        server.await.expect("server task").expect("server io");
    }

    #[tokio::test]
    async fn malformed_body_is_decode_failure() {
        let (base_url, server) = serve_once("200 OK", "text/html", "<html>oops</html>").await;
        let client = ChatClient::new(test_http_client(), base_url);

        let err = client
            .send_query("s", "hello", true)
            .await
            .expect_err("query should fail");

        assert_eq!(err.kind(), "decode");
        server.await.expect("server task").expect("server io");
    }

    #[tokio::test]
    async fn unreachable_backend_is_connection_failure() {
        let client = ChatClient::new(test_http_client(), unreachable_base_url().await);

        let err = client
            .send_query("s", "hello", true)
            .await
            .expect_err("query should fail");

        assert_eq!(err.kind(), "connection");
    }

    #[tokio::test]
    async fn elapsed_wait_is_connection_failure() {
        let (base_url, server) = serve_stalled().await;
        let http = reqwest::Client::builder()
            .no_proxy()
            .timeout(std::time::Duration::from_millis(200))
            .build()
            .expect("client");
        let client = ChatClient::new(http, base_url);

        let err = client
            .send_query("s", "hello", true)
            .await
            .expect_err("query should time out");

        assert_eq!(err.kind(), "connection");
        server.abort();
    }

    #[tokio::test]
    async fn empty_query_is_rejected_without_network() {
        let client = ChatClient::new(test_http_client(), unreachable_base_url().await);
        let err = client
            .send_query("s", "   ", true)
            .await
            .expect_err("empty query should fail");
        assert_eq!(err.kind(), "unexpected");
    }
}
