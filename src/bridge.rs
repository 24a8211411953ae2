//! ChatBridge: forwards learner text to the chat backend and keeps the
//! UI-facing [`BridgeState`] in step with the latest reply.
//!
//! Construct one bridge at startup and hand an `Arc<ChatBridge>` to whatever
//! UI layer needs it. The state lock is never held across the network call,
//! so concurrent `send_message` calls resolve independently and the last one
//! to finish wins the state.

use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::classifier::ReplyClassifier;
use crate::state::{BridgeState, QuizQuestion};
use crate::transport::{ChatRequest, ChatTransport, TransportError};

/// Text shown to the learner when the exchange failed for any reason.
pub const ERROR_REPLY_TEXT: &str = "I'm sorry, I encountered an error. Please try again. 😊";

/// Outcome of one exchange with the backend.
#[derive(Debug)]
pub enum Exchange {
    /// The backend answered; the text may be the didn't-understand fallback.
    Replied(String),
    /// The exchange failed and was recovered into [`ERROR_REPLY_TEXT`].
    Degraded { text: String, error: TransportError },
}

impl Exchange {
    pub fn text(&self) -> &str {
        match self {
            Exchange::Replied(text) | Exchange::Degraded { text, .. } => text.as_str(),
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Exchange::Replied(text) | Exchange::Degraded { text, .. } => text,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Exchange::Degraded { .. })
    }
}

pub struct ChatBridge {
    transport: ChatTransport,
    classifier: ReplyClassifier,
    state: RwLock<BridgeState>,
}

impl ChatBridge {
    pub fn new(transport: ChatTransport, classifier: ReplyClassifier) -> Self {
        Self { transport, classifier, state: RwLock::new(BridgeState::default()) }
    }

    pub fn transport(&self) -> &ChatTransport {
        &self.transport
    }

    /// Send `input` and return the reply text. Never fails.
    pub async fn send_message(&self, input: &str) -> String {
        self.exchange(input).await.into_text()
    }

    /// Send `input` and report whether the reply came from the backend or
    /// from error recovery.
    ///
    /// State is updated only when the backend replied.
    pub async fn exchange(&self, input: &str) -> Exchange {
        let request = ChatRequest::new(input);
        match self.transport.send(&request).await {
            Ok(reply) => {
                let text = reply.into_text();
                self.update_state(&text).await;
                Exchange::Replied(text)
            }
            Err(e) => {
                error!(transport = self.transport.name(), error = %e, "error communicating with agent");
                Exchange::Degraded { text: ERROR_REPLY_TEXT.to_string(), error: e }
            }
        }
    }

    /// Ask the backend to start over and restore local state to defaults.
    ///
    /// Local state is reset even when the backend call fails.
    pub async fn reset(&self) -> Result<(), TransportError> {
        let result = self.transport.reset().await;
        *self.state.write().await = BridgeState::default();
        match &result {
            Ok(()) => info!("conversation reset"),
            Err(e) => error!(error = %e, "backend reset failed; local state cleared"),
        }
        result
    }

    /// Snapshot of the current state.
    pub async fn state(&self) -> BridgeState {
        self.state.read().await.clone()
    }

    pub async fn show_next_button(&self) -> bool {
        self.state.read().await.show_next_button
    }

    pub async fn current_quiz_question(&self) -> Option<QuizQuestion> {
        self.state.read().await.current_quiz_question.clone()
    }

    async fn update_state(&self, reply: &str) {
        let classification = self.classifier.classify(reply);
        debug!(
            show_next_button = classification.show_next_button,
            quiz_options = classification.quiz.as_ref().map_or(0, |q| q.options.len()),
            "classified reply"
        );
        self.state.write().await.apply(classification);
    }
}
