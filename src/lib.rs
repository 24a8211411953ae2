// Library root: exposes the bridge for the console binary and integration tests.
// The binary entry point is src/main.rs.

pub mod bridge;
pub mod classifier;
pub mod config;
pub mod console;
pub mod error;
pub mod logger;
pub mod state;
pub mod transport;

pub use bridge::{ChatBridge, Exchange, ERROR_REPLY_TEXT};
pub use state::{BridgeState, QuizQuestion};
