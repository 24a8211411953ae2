//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory (or
//! an explicit path), then applies `TUTOR_BRIDGE_BASE_URL` and
//! `TUTOR_BRIDGE_LOG_LEVEL` env overrides. When no path is given and the
//! default file is missing, built-in defaults are used.

use std::{
    env,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::level_filters::LevelFilter;

use crate::classifier::{DEFAULT_NEXT_TRIGGERS, DEFAULT_OPTION_LABELS, DEFAULT_QUIZ_MARKERS};
use crate::error::AppError;
use crate::logger;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Chat backend configuration (`[bridge]`).
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Which backend is active: `"http"` or `"dummy"`.
    pub kind: String,
    /// Scheme + authority of the chat server, e.g. `http://localhost:5000`.
    pub base_url: String,
    pub chat_path: String,
    pub reset_path: String,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout_seconds: Option<u64>,
}

/// Reply classification rules (`[classifier]`).
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub next_triggers: Vec<String>,
    pub quiz_markers: Vec<String>,
    pub option_labels: Vec<char>,
}

/// Fully-resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub transport: TransportConfig,
    pub classifier: ClassifierConfig,
    pub log_level: LevelFilter,
    /// Append logs here instead of stderr. Already expanded, no `~`.
    pub log_file: Option<PathBuf>,
}

/// Raw TOML shape, `serde` target before resolution.
#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    bridge: RawBridge,
    #[serde(default)]
    logging: RawLogging,
    #[serde(default)]
    classifier: RawClassifier,
}

#[derive(Deserialize)]
struct RawBridge {
    #[serde(default = "default_transport")]
    transport: String,
    #[serde(default = "default_base_url")]
    base_url: String,
    #[serde(default = "default_chat_path")]
    chat_path: String,
    #[serde(default = "default_reset_path")]
    reset_path: String,
    #[serde(default)]
    timeout_seconds: Option<u64>,
}

impl Default for RawBridge {
    fn default() -> Self {
        Self {
            transport: default_transport(),
            base_url: default_base_url(),
            chat_path: default_chat_path(),
            reset_path: default_reset_path(),
            timeout_seconds: None,
        }
    }
}

#[derive(Deserialize)]
struct RawLogging {
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default)]
    file: Option<String>,
}

impl Default for RawLogging {
    fn default() -> Self {
        Self { log_level: default_log_level(), file: None }
    }
}

#[derive(Deserialize)]
struct RawClassifier {
    #[serde(default = "default_next_triggers")]
    next_triggers: Vec<String>,
    #[serde(default = "default_quiz_markers")]
    quiz_markers: Vec<String>,
    /// Concatenated labels, e.g. `"ABCD"`.
    #[serde(default = "default_option_labels")]
    option_labels: String,
}

impl Default for RawClassifier {
    fn default() -> Self {
        Self {
            next_triggers: default_next_triggers(),
            quiz_markers: default_quiz_markers(),
            option_labels: default_option_labels(),
        }
    }
}

fn default_transport() -> String { "http".to_string() }
fn default_base_url() -> String { "http://localhost:5000".to_string() }
fn default_chat_path() -> String { "/api/chat".to_string() }
fn default_reset_path() -> String { "/api/reset".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_next_triggers() -> Vec<String> { DEFAULT_NEXT_TRIGGERS.iter().map(|s| s.to_string()).collect() }
fn default_quiz_markers() -> Vec<String> { DEFAULT_QUIZ_MARKERS.iter().map(|s| s.to_string()).collect() }
fn default_option_labels() -> String { DEFAULT_OPTION_LABELS.iter().collect() }

/// Load config from `config_path`, or `config/default.toml`, then apply env-var overrides.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let base_url_override = env::var("TUTOR_BRIDGE_BASE_URL").ok();
    let log_level_override = env::var("TUTOR_BRIDGE_LOG_LEVEL").ok();

    let path = match config_path {
        Some(p) => PathBuf::from(p),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_PATH);
            if !default.exists() {
                return resolve(RawConfig::default(), base_url_override.as_deref(), log_level_override.as_deref());
            }
            default
        }
    };

    load_from(&path, base_url_override.as_deref(), log_level_override.as_deref())
}

/// Internal loader. Accepts an explicit path and optional overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(
    path: &Path,
    base_url_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    resolve(parsed, base_url_override, log_level_override)
}

fn resolve(
    parsed: RawConfig,
    base_url_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<Config, AppError> {
    let b = parsed.bridge;
    let base_url = base_url_override.unwrap_or(&b.base_url).to_string();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(AppError::Config(format!("base_url must be an http(s) URL, got '{base_url}'")));
    }

    let option_labels: Vec<char> = parsed.classifier.option_labels.chars().collect();
    if option_labels.is_empty() {
        return Err(AppError::Config("classifier.option_labels must not be empty".into()));
    }

    let log_level = logger::parse_level(log_level_override.unwrap_or(&parsed.logging.log_level))
        .map_err(|e| AppError::Config(format!("logging.log_level: {e}")))?;

    Ok(Config {
        transport: TransportConfig {
            kind: b.transport,
            base_url,
            chat_path: b.chat_path,
            reset_path: b.reset_path,
            timeout_seconds: b.timeout_seconds,
        },
        classifier: ClassifierConfig {
            next_triggers: parsed.classifier.next_triggers,
            quiz_markers: parsed.classifier.quiz_markers,
            option_labels,
        },
        log_level,
        log_file: parsed.logging.file.as_deref().map(expand_home),
    })
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
