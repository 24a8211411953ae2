//! Console front end: reads lines from stdin, sends them through the
//! bridge, prints the reply and the affordances derived from it.
//!
//! Runs until the `shutdown` token is cancelled (Ctrl-C), stdin is closed,
//! or the learner types `/quit`.

use std::io::Write as _;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bridge::ChatBridge;
use crate::error::AppError;
use crate::state::BridgeState;

/// One line of learner input.
#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Send(&'a str),
    Reset,
    State,
    Quit,
    Unknown(&'a str),
    Empty,
}

impl<'a> Command<'a> {
    /// Surrounding whitespace is ignored for command detection only;
    /// `Send` carries the line exactly as typed.
    pub fn parse(line: &'a str) -> Self {
        match line.trim() {
            "" => Command::Empty,
            "/reset" => Command::Reset,
            "/state" => Command::State,
            "/quit" | "/exit" => Command::Quit,
            cmd if cmd.starts_with('/') => Command::Unknown(cmd),
            _ => Command::Send(line),
        }
    }
}

/// Lines to print under a reply: the next hint, then the quiz options.
pub fn render_affordances(state: &BridgeState) -> Vec<String> {
    let mut lines = Vec::new();
    if state.show_next_button {
        lines.push("  [ next ▸ ]".to_string());
    }
    if let Some(quiz) = &state.current_quiz_question {
        let options: Vec<String> = quiz.options.iter().map(char::to_string).collect();
        lines.push(format!("  quiz: {}", options.join(" | ")));
    }
    lines
}

pub async fn run_console(bridge: Arc<ChatBridge>, shutdown: CancellationToken) -> Result<(), AppError> {
    info!(transport = bridge.transport().name(), "console started");
    println!("─────────────────────────────────");
    println!(" Tutor console  (/quit or Ctrl-C to leave)");
    println!("─────────────────────────────────");

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    loop {
        print!("> ");
        let _ = std::io::stdout().flush();

        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                println!();
                info!("console shutting down");
                break;
            }

            line = lines.next_line() => {
                let input = match line {
                    Err(e) => {
                        warn!("console read error: {e}");
                        break;
                    }
                    Ok(None) => {
                        info!("console stdin closed");
                        break;
                    }
                    Ok(Some(input)) => input,
                };

                match Command::parse(&input) {
                    Command::Empty => continue,
                    Command::Quit => break,
                    Command::Unknown(cmd) => println!("unknown command: {cmd}"),
                    Command::State => {
                        let state = bridge.state().await;
                        match serde_json::to_string_pretty(&state) {
                            Ok(json) => println!("{json}"),
                            Err(e) => warn!("failed to render state: {e}"),
                        }
                    }
                    Command::Reset => match bridge.reset().await {
                        Ok(()) => println!("(conversation reset)"),
                        Err(e) => println!("(local state cleared; backend reset failed: {e})"),
                    },
                    Command::Send(text) => {
                        debug!(input = %text, "console received line");
                        let reply = tokio::select! {
                            biased;
                            _ = shutdown.cancelled() => break,
                            reply = bridge.send_message(text) => reply,
                        };
                        println!("{reply}");
                        for line in render_affordances(&bridge.state().await) {
                            println!("{line}");
                        }
                    }
                }
            }
        }
    }

    Ok(())
}
