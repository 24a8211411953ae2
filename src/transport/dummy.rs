//! Dummy transport: echoes the message back prefixed with `[echo]`.
//! Used to exercise the bridge and console without a running backend.

use crate::transport::{ChatReply, ChatRequest, TransportError};

#[derive(Debug, Clone)]
pub struct DummyTransport;

impl DummyTransport {
    pub async fn send(&self, request: &ChatRequest) -> Result<ChatReply, TransportError> {
        Ok(ChatReply::from_response(format!("[echo] {}", request.message)))
    }

    pub async fn reset(&self) -> Result<(), TransportError> {
        Ok(())
    }
}
