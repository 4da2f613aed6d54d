//! # AX.25 Relay
//!
//! Answers AX.25 connections carried in UDP datagrams with a command shell.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

use ax25_relay::config::{Config, LoggingConfig};
use ax25_relay::link::LinkDispatcher;
use ax25_relay::shell::CommandShell;
use ax25_relay::transport::UdpLink;

/// Configuration file used when no path is given
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Prefix of the daily rolling log files
const LOG_FILE_PREFIX: &str = "ax25-relay.log";

/// Set up console logging, plus a daily log file when a directory is configured
///
/// The returned guard flushes the file writer and must live until exit.
fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let level: tracing::Level = config
        .level
        .parse()
        .with_context(|| format!("invalid log level {:?}", config.level))?;
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (file_writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::io::stdout.and(file_writer))
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            Ok(None)
        }
    }
}

/// Main entry point
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration from the first argument or `config/default.toml`
///    - Set up logging
///    - Bind the UDP endpoint
///
/// 2. **Main Loop**
///    - Answer each datagram through the link dispatcher
///    - Handle Ctrl+C for graceful shutdown
///
/// 3. **Shutdown**
///    - Log dispatcher statistics
///
/// # Errors
///
/// Returns error if the configuration is invalid, the socket cannot be
/// bound, or a datagram cannot be sent
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    let _log_guard = init_logging(&config.logging)?;

    info!("ax25-relay v{} starting...", env!("CARGO_PKG_VERSION"));
    info!(
        "Station {}-{}, checksum policy {:?}",
        config.link.callsign, config.link.ssid, config.link.checksum
    );

    let mut socket = UdpLink::bind(config.link.socket_addr()?).await?;

    let host_call = format!("{}-{}", config.link.callsign.to_ascii_uppercase(), config.link.ssid);
    let mut dispatcher = LinkDispatcher::new(&config.link, CommandShell::new(host_call));

    info!("Press Ctrl+C to exit");

    let outcome = tokio::select! {
        result = dispatcher.run(&mut socket, config.link.recv_buffer_size) => result,

        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
            Ok(())
        }
    };

    let stats = dispatcher.stats();
    info!(
        "Datagrams received: {}, frames sent: {}, dropped: {}, FCS failures: {}",
        stats.datagrams_received, stats.frames_sent, stats.frames_dropped, stats.fcs_failures
    );
    info!("Open connections at exit: {}", dispatcher.connections().len());

    if let Err(e) = &outcome {
        warn!("Link stopped: {}", e);
    }
    outcome.context("link failure")
}
