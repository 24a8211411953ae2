//! UI-facing bridge state.

use serde::{Deserialize, Serialize};

use crate::classifier::Classification;

/// Label `conversation_state` starts with. Nothing in the bridge moves it.
pub const INITIAL_CONVERSATION_STATE: &str = "WELCOME";

/// A multiple-choice question detected in a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    /// Full reply text the options were found in.
    pub question: String,
    /// Option labels in order of appearance; serialized as one-letter strings.
    pub options: Vec<char>,
}

/// Flags derived from the most recent reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeState {
    pub show_next_button: bool,
    pub current_quiz_question: Option<QuizQuestion>,
    /// Kept for consumers that read it; never transitioned.
    pub conversation_state: String,
}

impl Default for BridgeState {
    fn default() -> Self {
        Self {
            show_next_button: false,
            current_quiz_question: None,
            conversation_state: INITIAL_CONVERSATION_STATE.to_string(),
        }
    }
}

impl BridgeState {
    /// Overwrite the reply-derived flags. `conversation_state` is left alone.
    pub fn apply(&mut self, classification: Classification) {
        self.show_next_button = classification.show_next_button;
        self.current_quiz_question = classification.quiz;
    }
}
