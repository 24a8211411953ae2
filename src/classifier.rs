//! Reply classification: turns reply text into UI affordance flags.
//!
//! Rules are data (`next_triggers`, `quiz_markers`, `option_labels`) so they
//! can be swapped from config without touching the matching code.

use crate::config::ClassifierConfig;
use crate::state::QuizQuestion;

pub const DEFAULT_NEXT_TRIGGERS: [&str; 3] = ["next", "continue", "ready to move on"];
pub const DEFAULT_QUIZ_MARKERS: [&str; 2] = ["a)", "b)"];
pub const DEFAULT_OPTION_LABELS: [char; 4] = ['A', 'B', 'C', 'D'];

/// Flags derived from one reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub show_next_button: bool,
    pub quiz: Option<QuizQuestion>,
}

#[derive(Debug, Clone)]
pub struct ReplyClassifier {
    /// Lowercased; any one substring match shows the next button.
    next_triggers: Vec<String>,
    /// Lowercased; all must be present before options are extracted.
    quiz_markers: Vec<String>,
    option_labels: Vec<char>,
}

impl Default for ReplyClassifier {
    fn default() -> Self {
        Self::new(
            DEFAULT_NEXT_TRIGGERS.iter().map(|s| s.to_string()).collect(),
            DEFAULT_QUIZ_MARKERS.iter().map(|s| s.to_string()).collect(),
            DEFAULT_OPTION_LABELS.to_vec(),
        )
    }
}

impl ReplyClassifier {
    pub fn new(next_triggers: Vec<String>, quiz_markers: Vec<String>, option_labels: Vec<char>) -> Self {
        Self {
            next_triggers: next_triggers.into_iter().map(|t| t.to_lowercase()).collect(),
            quiz_markers: quiz_markers.into_iter().map(|m| m.to_lowercase()).collect(),
            option_labels,
        }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(
            config.next_triggers.clone(),
            config.quiz_markers.clone(),
            config.option_labels.clone(),
        )
    }

    pub fn classify(&self, text: &str) -> Classification {
        let lower = text.to_lowercase();

        let show_next_button = self.next_triggers.iter().any(|t| lower.contains(t.as_str()));

        let quiz = if self.quiz_gate_open(&lower) {
            let options = self.extract_options(text);
            if options.is_empty() {
                None
            } else {
                Some(QuizQuestion { question: text.to_string(), options })
            }
        } else {
            None
        };

        Classification { show_next_button, quiz }
    }

    /// Labels that sit immediately before a `)`, in order of appearance.
    ///
    /// Matching ignores ASCII case; each label keeps the case it was written in.
    /// Repeats are kept.
    pub fn extract_options(&self, text: &str) -> Vec<char> {
        let mut options = Vec::new();
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            if chars.peek() == Some(&')') && self.is_label(c) {
                options.push(c);
            }
        }
        options
    }

    fn quiz_gate_open(&self, lower: &str) -> bool {
        !self.quiz_markers.is_empty() && self.quiz_markers.iter().all(|m| lower.contains(m.as_str()))
    }

    fn is_label(&self, c: char) -> bool {
        self.option_labels.iter().any(|l| l.eq_ignore_ascii_case(&c))
    }
}
