//! Client library for the commander dispatch daemon.
//!
//! Speaks HTTP/1.1 directly over the daemon's Unix socket; one connection
//! per request, closed by the daemon after the response.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;

pub const DEFAULT_SOCK: &str = "/tmp/commanderd.sock";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("daemon not available at {0}")]
    DaemonUnavailable(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("request failed with status {status}: {body}")]
    Failed { status: u16, body: Value },
}

/// One parsed HTTP reply from the daemon.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
}

impl Reply {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

pub struct CommanderClient {
    socket: PathBuf,
}

impl CommanderClient {
    pub fn new<P: AsRef<Path>>(socket: P) -> Self {
        Self {
            socket: socket.as_ref().to_path_buf(),
        }
    }

    /// Fetches the command listing.
    pub async fn listing(&self) -> Result<Value> {
        self.expect_success(self.get("/listing").await?)
    }

    /// Fetches uptime and execution counters.
    pub async fn status(&self) -> Result<Value> {
        self.expect_success(self.get("/status").await?)
    }

    /// Dispatches a command. Returns the full reply so callers can inspect
    /// error payloads and their status codes.
    pub async fn dispatch(&self, command: &str, parameters: Value) -> Result<Reply> {
        let envelope = serde_json::json!({
            "command": command,
            "parameters": parameters,
        });
        self.post("/dispatch", &envelope).await
    }

    /// Sends a raw request body to the dispatch endpoint, useful for probing
    /// the daemon's handling of malformed envelopes.
    pub async fn dispatch_raw(&self, body: &str) -> Result<Reply> {
        let request = format_request("POST", "/dispatch", Some(body));
        self.roundtrip(request).await
    }

    async fn get(&self, path: &str) -> Result<Reply> {
        self.roundtrip(format_request("GET", path, None)).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Reply> {
        let payload = serde_json::to_string(body)?;
        self.roundtrip(format_request("POST", path, Some(&payload)))
            .await
    }

    fn expect_success(&self, reply: Reply) -> Result<Value> {
        if reply.is_success() {
            Ok(reply.body)
        } else {
            Err(ClientError::Failed {
                status: reply.status,
                body: reply.body,
            }
            .into())
        }
    }

    async fn roundtrip(&self, request: String) -> Result<Reply> {
        let mut stream = UnixStream::connect(&self.socket).await.map_err(|_| {
            ClientError::DaemonUnavailable(self.socket.display().to_string())
        })?;

        stream
            .write_all(request.as_bytes())
            .await
            .context("writing request")?;

        // `Connection: close` makes the daemon end the stream after the
        // response, so reading to EOF captures exactly one reply.
        let mut raw = Vec::new();
        stream
            .read_to_end(&mut raw)
            .await
            .context("reading response")?;

        parse_reply(&raw)
    }
}

fn format_request(method: &str, path: &str, body: Option<&str>) -> String {
    match body {
        Some(payload) => format!(
            "{method} {path} HTTP/1.1\r\nHost: commanderd\r\nConnection: close\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{payload}",
            payload.len()
        ),
        None => format!("{method} {path} HTTP/1.1\r\nHost: commanderd\r\nConnection: close\r\n\r\n"),
    }
}

fn parse_reply(raw: &[u8]) -> Result<Reply> {
    let text = String::from_utf8(raw.to_vec())
        .map_err(|_| ClientError::InvalidResponse("not utf-8".to_string()))?;

    let (head, body) = text
        .split_once("\r\n\r\n")
        .ok_or_else(|| ClientError::InvalidResponse("missing header terminator".to_string()))?;

    let status_line = head
        .lines()
        .next()
        .ok_or_else(|| ClientError::InvalidResponse("empty response".to_string()))?;
    let status: u16 = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .ok_or_else(|| ClientError::InvalidResponse(format!("bad status line: {status_line}")))?;

    let body = if body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(body.trim())
            .map_err(|err| ClientError::InvalidResponse(format!("unparseable body: {err}")))?
    };

    Ok(Reply { status, body })
}
