//! Tracing setup for the bridge.
//!
//! Levels are validated while config is resolved ([`parse_level`]), so
//! [`init`] only ever sees a well-formed [`LevelFilter`].

use std::path::Path;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::error::AppError;

/// Parse a `[logging] log_level` value (`"error"` … `"trace"`, `"off"`,
/// any case).
pub fn parse_level(level: &str) -> Result<LevelFilter, AppError> {
    let level = level.trim();
    if level.is_empty() {
        return Err(AppError::Logger("log level must not be empty".into()));
    }
    level
        .parse::<LevelFilter>()
        .map_err(|_| AppError::Logger(format!("unrecognised log level: '{level}'")))
}

/// Build the filter: a `-v` level from the command line beats `RUST_LOG`;
/// otherwise `RUST_LOG` beats the configured level.
fn build_filter(level: LevelFilter, from_cli: bool) -> EnvFilter {
    if from_cli {
        EnvFilter::default().add_directive(level.into())
    } else {
        EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy()
    }
}

/// Install the global subscriber. Call once, after config is resolved.
///
/// Output goes to stderr, or is appended to `log_file`; stdout carries the
/// console transcript.
pub fn init(level: LevelFilter, from_cli: bool, log_file: Option<&Path>) -> Result<(), AppError> {
    let writer = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| AppError::Logger(format!("failed to open log file '{}': {e}", path.display())))?;
            BoxMakeWriter::new(file)
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    tracing_subscriber::fmt()
        .with_env_filter(build_filter(level, from_cli))
        .with_writer(writer)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))
}
