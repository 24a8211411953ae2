//! Tutor bridge: console entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Resolve effective log level (CLI `-v` flags > env > config)
//!   4. Init logger once
//!   5. Build transport + classifier, construct the bridge
//!   6. Spawn Ctrl-C → shutdown signal watcher
//!   7. Run the console until shutdown

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing::level_filters::LevelFilter;

use tutor_bridge::classifier::ReplyClassifier;
use tutor_bridge::transport::ChatTransport;
use tutor_bridge::{config, console, error, logger, ChatBridge};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), error::AppError> {
    // Load .env if present; ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let mut config = config::load(args.config_path.as_deref())?;
    if args.dummy {
        config.transport.kind = "dummy".to_string();
    }

    let effective_log_level = args.log_level.unwrap_or(config.log_level);
    let force_cli_level = args.log_level.is_some();

    logger::init(effective_log_level, force_cli_level, config.log_file.as_deref())?;

    info!(
        transport = %config.transport.kind,
        base_url = %config.transport.base_url,
        configured_log_level = %config.log_level,
        effective_log_level = %effective_log_level,
        "config loaded"
    );

    let transport = ChatTransport::build(&config.transport)?;
    let classifier = ReplyClassifier::from_config(&config.classifier);
    let bridge = Arc::new(ChatBridge::new(transport, classifier));

    // Ctrl-C handler cancels the token so the console loop exits.
    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    console::run_console(bridge, shutdown).await
}

struct CliArgs {
    log_level: Option<LevelFilter>,
    config_path: Option<String>,
    dummy: bool,
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut config_path = None;
    let mut dummy = false;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: tutor-bridge [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -f, --config <PATH>        Path to configuration file (default: config/default.toml)");
                println!("      --dummy                Use the offline echo transport");
                println!("  -v, -vv, -vvv, -vvvv       Increase logging verbosity");
                std::process::exit(0);
            }
            "--dummy" => dummy = true,
            "-f" | "--config" => {
                if let Some(path) = iter.next() {
                    config_path = Some(path);
                } else {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            _ => {}
        }
    }

    // Each -v picks a tier outright:
    //   -v      → warn
    //   -vv     → info
    //   -vvv    → debug  (request flow, classification results)
    //   -vvvv+  → trace  (full response payloads)
    let log_level = match verbosity {
        0 => None,
        1 => Some(LevelFilter::WARN),
        2 => Some(LevelFilter::INFO),
        3 => Some(LevelFilter::DEBUG),
        _ => Some(LevelFilter::TRACE),
    };

    CliArgs { log_level, config_path, dummy }
}
