//! HTTP chat transport (`POST /api/chat`).
//!
//! Constructed once at startup, then cheaply cloned because
//! `reqwest::Client` is an `Arc` internally.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, trace};

use crate::transport::{ChatReply, ChatRequest, TransportError};

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    chat_url: String,
    reset_url: String,
}

impl HttpTransport {
    /// Build a transport rooted at `base_url`.
    ///
    /// `timeout_seconds = None` leaves requests unbounded: a hung backend
    /// keeps the call pending.
    pub fn new(
        base_url: String,
        chat_path: String,
        reset_path: String,
        timeout_seconds: Option<u64>,
    ) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(secs) = timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            chat_url: join_url(&base_url, &chat_path),
            reset_url: join_url(&base_url, &reset_path),
        })
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }

    pub async fn send(&self, request: &ChatRequest) -> Result<ChatReply, TransportError> {
        debug!(url = %self.chat_url, content_len = request.message.len(), "sending chat request");

        // `.json()` sets `Content-Type: application/json`.
        let response = self
            .client
            .post(&self.chat_url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                debug!(url = %self.chat_url, error = %e, "chat request failed (transport)");
                TransportError::Request(e.to_string())
            })?;

        let response = check_status(response).await?;

        let body = response.json::<Value>().await.map_err(|e| {
            debug!(error = %e, "failed to deserialize chat response");
            TransportError::Decode(e.to_string())
        })?;

        if tracing::enabled!(tracing::Level::TRACE) {
            trace!(body = %body, "full chat response payload");
        }

        let reply = ChatReply::from_body(&body);
        debug!(
            has_response = reply.response.is_some(),
            has_message = reply.message.is_some(),
            "received chat response"
        );
        Ok(reply)
    }

    pub async fn reset(&self) -> Result<(), TransportError> {
        debug!(url = %self.reset_url, "sending reset request");
        let response = self
            .client
            .post(&self.reset_url)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| {
                debug!(url = %self.reset_url, error = %e, "reset request failed (transport)");
                TransportError::Request(e.to_string())
            })?;
        check_status(response).await.map(|_| ())
    }
}

/// Join `base` and `path` with exactly one `/` between them.
fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Return the response if successful, or a `Status` error carrying the body.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());

    debug!(%status, body = %body, "chat backend returned HTTP error");
    Err(TransportError::Status { status: status.as_u16(), body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_normalises_slashes() {
        assert_eq!(join_url("http://h:5000", "/api/chat"), "http://h:5000/api/chat");
        assert_eq!(join_url("http://h:5000/", "/api/chat"), "http://h:5000/api/chat");
        assert_eq!(join_url("http://h:5000", "api/chat"), "http://h:5000/api/chat");
    }

    #[test]
    fn new_builds_urls() {
        let t = HttpTransport::new(
            "http://localhost:5000/".into(),
            "/api/chat".into(),
            "/api/reset".into(),
            Some(5),
        )
        .unwrap();
        assert_eq!(t.chat_url(), "http://localhost:5000/api/chat");
        assert_eq!(t.reset_url, "http://localhost:5000/api/reset");
    }

    #[tokio::test]
    async fn unreachable_host_is_request_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let t = HttpTransport::new(
            format!("http://127.0.0.1:{port}"),
            "/api/chat".into(),
            "/api/reset".into(),
            Some(5),
        )
        .unwrap();
        let err = t.send(&ChatRequest::new("hello")).await.unwrap_err();
        assert!(matches!(err, TransportError::Request(_)), "got {err:?}");
    }
}
