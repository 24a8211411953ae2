//! Chat backend transport.
//!
//! `ChatTransport` is an enum over concrete backends. Add a new variant +
//! module for each additional backend. Instances are cheap to clone.
//!
//! Every backend makes exactly one attempt per call: no retries, no
//! cancellation. The bridge layer decides what a failure means for the user.

pub mod dummy;
pub mod http;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::TransportConfig;

/// Fallback reply text when a 2xx body carries neither `response` nor `message`.
pub const NOT_UNDERSTOOD_TEXT: &str = "I'm sorry, I didn't understand that.";

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("unknown transport: {0}")]
    UnknownTransport(String),
    /// DNS, connect, timeout, or any other failure before a status line arrived.
    #[error("chat request failed: {0}")]
    Request(String),
    #[error("HTTP error! status: {status}")]
    Status { status: u16, body: String },
    #[error("failed to parse chat response: {0}")]
    Decode(String),
}

// ── Wire types ────────────────────────────────────────────────────────────────

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub stream: bool,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), stream: false }
    }
}

/// The reply-bearing fields of a successful chat response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatReply {
    pub response: Option<String>,
    pub message: Option<String>,
}

impl ChatReply {
    pub fn from_response(text: impl Into<String>) -> Self {
        Self { response: Some(text.into()), message: None }
    }

    /// Pick the reply fields out of an arbitrary JSON body.
    ///
    /// Only non-empty strings count. Any other shape (array, scalar, `null`,
    /// numbers in place of strings) yields an empty reply.
    pub fn from_body(body: &Value) -> Self {
        let field = |name: &str| {
            body.get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Self { response: field("response"), message: field("message") }
    }

    /// `response`, else `message`, else [`NOT_UNDERSTOOD_TEXT`].
    pub fn into_text(self) -> String {
        self.response
            .or(self.message)
            .unwrap_or_else(|| NOT_UNDERSTOOD_TEXT.to_string())
    }
}

// ── Transport enum ────────────────────────────────────────────────────────────

/// All available chat backends.
///
/// Enum dispatch avoids `dyn` trait objects and the `async-trait` dependency.
#[derive(Debug, Clone)]
pub enum ChatTransport {
    Http(http::HttpTransport),
    Dummy(dummy::DummyTransport),
}

impl ChatTransport {
    /// Construct a transport from config. `kind` is `"http"` or `"dummy"`.
    pub fn build(config: &TransportConfig) -> Result<Self, TransportError> {
        match config.kind.as_str() {
            "http" => {
                let t = http::HttpTransport::new(
                    config.base_url.clone(),
                    config.chat_path.clone(),
                    config.reset_path.clone(),
                    config.timeout_seconds,
                )?;
                Ok(ChatTransport::Http(t))
            }
            "dummy" => Ok(ChatTransport::Dummy(dummy::DummyTransport)),
            other => Err(TransportError::UnknownTransport(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChatTransport::Http(_) => "http",
            ChatTransport::Dummy(_) => "dummy",
        }
    }

    /// One request/response exchange with the chat backend.
    pub async fn send(&self, request: &ChatRequest) -> Result<ChatReply, TransportError> {
        match self {
            ChatTransport::Http(t) => t.send(request).await,
            ChatTransport::Dummy(t) => t.send(request).await,
        }
    }

    /// Ask the backend to drop its conversation.
    pub async fn reset(&self) -> Result<(), TransportError> {
        match self {
            ChatTransport::Http(t) => t.reset().await,
            ChatTransport::Dummy(t) => t.reset().await,
        }
    }
}
