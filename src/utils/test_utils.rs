use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use crate::core::chat_client::{ChatBackend, ChatReply};
use crate::core::error::BackendError;

/// HTTP client for tests that never routes through an environment proxy.
pub fn test_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("test client should build")
}

#[derive(Debug)]
pub struct CapturedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn body_json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body should be json")
    }
}

/// Serve exactly one canned HTTP response and hand back what the client sent.
pub async fn serve_once(
    status: &str,
    content_type: &str,
    body: &str,
) -> (String, JoinHandle<Result<CapturedRequest, String>>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("local addr should resolve");
    let response = format!(
        "HTTP/1.1 {status}\r\ncontent-type: {content_type}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.map_err(|err| err.to_string())?;
        let captured = read_http_request(&mut stream).await?;
        stream
            .write_all(response.as_bytes())
            .await
            .map_err(|err| err.to_string())?;
        stream.shutdown().await.map_err(|err| err.to_string())?;
        Ok(captured)
    });

    (format!("http://{addr}"), handle)
}

/// Accept one connection and never answer it.
pub async fn serve_stalled() -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("local addr should resolve");
    let handle = tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await {
            tokio::time::sleep(std::time::Duration::from_secs(30)).await;
            drop(stream);
        }
    });
    (format!("http://{addr}"), handle)
}

/// A base URL on which nothing is listening.
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("local addr should resolve");
    drop(listener);
    format!("http://{addr}")
}

async fn read_http_request(stream: &mut TcpStream) -> Result<CapturedRequest, String> {
    let mut buffer = Vec::new();
    let mut header_end = None;
    while header_end.is_none() {
        let mut chunk = [0_u8; 1024];
        let read = stream
            .read(&mut chunk)
            .await
            .map_err(|err| err.to_string())?;
        if read == 0 {
            return Err("Unexpected EOF while reading HTTP headers".to_string());
        }
        buffer.extend_from_slice(&chunk[..read]);
        header_end = buffer
            .windows(4)
            .position(|window| window == b"\r\n\r\n")
            .map(|index| index + 4);
    }

    let header_end = header_end.ok_or("Missing header terminator")?;
    let header_text =
        std::str::from_utf8(&buffer[..header_end]).map_err(|err| err.to_string())?;
    let mut lines = header_text.split("\r\n").filter(|line| !line.is_empty());
    let request_line = lines
        .next()
        .ok_or_else(|| "Missing HTTP request line".to_string())?
        .to_string();

    let mut headers = Vec::new();
    let mut content_length = None;
    let mut chunked = false;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        if name.eq_ignore_ascii_case("content-length") {
            content_length = Some(value.parse::<usize>().map_err(|err| err.to_string())?);
        }
        if name.eq_ignore_ascii_case("transfer-encoding") && value.contains("chunked") {
            chunked = true;
        }
        headers.push((name.to_string(), value));
    }

    let mut body = buffer[header_end..].to_vec();
    if chunked {
        while !body.ends_with(b"0\r\n\r\n") {
            read_more(stream, &mut body).await?;
        }
        body = decode_chunked(&body)?;
    } else {
        let content_length = content_length.unwrap_or(0);
        while body.len() < content_length {
            read_more(stream, &mut body).await?;
        }
        body.truncate(content_length);
    }

    Ok(CapturedRequest {
        request_line,
        headers,
        body,
    })
}

async fn read_more(stream: &mut TcpStream, body: &mut Vec<u8>) -> Result<(), String> {
    let mut chunk = [0_u8; 4096];
    let read = stream
        .read(&mut chunk)
        .await
        .map_err(|err| err.to_string())?;
    if read == 0 {
        return Err("Unexpected EOF while reading HTTP body".to_string());
    }
    body.extend_from_slice(&chunk[..read]);
    Ok(())
}

fn decode_chunked(raw: &[u8]) -> Result<Vec<u8>, String> {
    let mut decoded = Vec::new();
    let mut rest = raw;
    loop {
        let line_end = rest
            .windows(2)
            .position(|window| window == b"\r\n")
            .ok_or("Malformed chunk header")?;
        let size_text = std::str::from_utf8(&rest[..line_end]).map_err(|err| err.to_string())?;
        let size = usize::from_str_radix(size_text.split(';').next().unwrap_or("").trim(), 16)
            .map_err(|err| err.to_string())?;
        rest = &rest[line_end + 2..];
        if size == 0 {
            return Ok(decoded);
        }
        if rest.len() < size + 2 {
            return Err("Truncated chunk".to_string());
        }
        decoded.extend_from_slice(&rest[..size]);
        rest = &rest[size + 2..];
    }
}

/// Backend double that replays queued results and records every call.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<ChatReply, BackendError>>>,
    calls: Mutex<Vec<(String, String, bool)>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, reply: Result<ChatReply, BackendError>) -> &Self {
        self.replies
            .lock()
            .expect("replies lock")
            .push_back(reply);
        self
    }

    pub fn calls(&self) -> Vec<(String, String, bool)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn send_query(
        &self,
        session_id: &str,
        query: &str,
        enable_web_search: bool,
    ) -> Result<ChatReply, BackendError> {
        self.calls.lock().expect("calls lock").push((
            session_id.to_string(),
            query.to_string(),
            enable_web_search,
        ));
        self.replies
            .lock()
            .expect("replies lock")
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::unexpected("no scripted reply")))
    }
}

pub fn reply(text: &str) -> Result<ChatReply, BackendError> {
    Ok(ChatReply {
        response: text.to_string(),
        trace_events: Vec::new(),
    })
}
