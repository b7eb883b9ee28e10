//! Pi-Remote client — entry point.
//!
//! Connects to the host relay, authenticates with the shared token, and turns
//! console lines into remote-control frames.  Type `help` at the prompt for
//! the command list.
//!
//! # Usage
//!
//! ```text
//! remote-client [OPTIONS]
//!
//! Options:
//!   --config           <PATH>  Config file [default: <config dir>/client.toml]
//!   --endpoint         <URL>   Host relay URL, e.g. ws://raspberrypi.local:8765
//!   --token            <TOKEN> Shared secret sent as API_KEY
//!   --drag-throttle-ms <MS>    Minimum spacing between DRAG frames
//!   --log-level        <LEVEL> Filter used when RUST_LOG is unset
//! ```
//!
//! # Precedence
//!
//! Command-line flags beat environment variables, which beat the config file,
//! which beats the built-in defaults.
//!
//! | Variable             | Flag         |
//! |----------------------|--------------|
//! | `PI_REMOTE_CONFIG`   | `--config`   |
//! | `PI_REMOTE_ENDPOINT` | `--endpoint` |
//! | `PI_REMOTE_TOKEN`    | `--token`    |

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use remote_client::application::SessionEngine;
use remote_client::domain::ClientConfig;
use remote_client::infrastructure::console::{run_console, spawn_status_reporter, spawn_stdin_reader};
use remote_client::infrastructure::storage::{config_file_path, load_config_from, ConfigError};
use remote_client::infrastructure::transport::WsTransport;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Pi-Remote handheld client.
#[derive(Debug, Parser)]
#[command(
    name = "remote-client",
    about = "Console client for the Pi-Remote host relay",
    version
)]
struct Cli {
    /// Path of the TOML config file.
    #[arg(long, env = "PI_REMOTE_CONFIG")]
    config: Option<PathBuf>,

    /// WebSocket URL of the host relay.
    #[arg(long, env = "PI_REMOTE_ENDPOINT")]
    endpoint: Option<String>,

    /// Shared secret sent as `API_KEY` after every connect.
    #[arg(long, env = "PI_REMOTE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Minimum spacing between two DRAG frames, in milliseconds.
    #[arg(long)]
    drag_throttle_ms: Option<u64>,

    /// `tracing` filter used when `RUST_LOG` is not set.
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Loads the config file and applies the command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the merged
    /// configuration is not usable.
    fn into_client_config(self) -> anyhow::Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => load_config_from(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => match config_file_path() {
                Ok(path) => load_config_from(&path)
                    .with_context(|| format!("failed to load config from {}", path.display()))?,
                Err(ConfigError::NoPlatformConfigDir) => ClientConfig::default(),
                Err(e) => return Err(e.into()),
            },
        };

        if let Some(endpoint) = self.endpoint {
            config.endpoint = endpoint;
        }
        if let Some(token) = self.token {
            config.token = token;
        }
        if let Some(ms) = self.drag_throttle_ms {
            config.drag_throttle_ms = ms;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }

        config.validate().context("invalid client configuration")?;
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// 1. Parse the command line and merge it over the config file.
/// 2. Initialise `tracing`; `RUST_LOG` wins over the configured level.
/// 3. Start the session engine on its own task and a status reporter.
/// 4. Run the console until `quit`, end of input, or Ctrl+C, then wait for
///    the engine to close the session.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse().into_client_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!(endpoint = %config.endpoint, "Pi-Remote client starting");

    let (engine, handle) = SessionEngine::new(&config, Arc::new(WsTransport::new()));
    let engine_task = tokio::spawn(engine.run());
    let reporter = spawn_status_reporter(&handle);

    let lines = spawn_stdin_reader();
    tokio::select! {
        result = run_console(lines, &handle) => {
            if let Err(e) = result {
                warn!("console stopped: {e}");
            }
        }
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => info!("received Ctrl+C; closing the session"),
                Err(e) => warn!("failed to listen for Ctrl+C signal: {e}"),
            }
            // The engine may already be gone; either way we are done.
            let _ = handle.shutdown().await;
        }
    }

    engine_task.await.context("session engine task panicked")?;
    reporter.abort();

    info!("Pi-Remote client stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["remote-client", "--config", "/nonexistent/pi-remote/client.toml"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_cli_without_flags_leaves_overrides_unset() {
        let cli = Cli::parse_from(["remote-client"]);

        assert!(cli.drag_throttle_ms.is_none());
        assert!(cli.log_level.is_none());
    }

    #[test]
    fn test_flags_override_file_defaults() {
        // Arrange
        let cli = cli(&[
            "--endpoint",
            "ws://10.0.0.5:9000",
            "--token",
            "secret",
            "--drag-throttle-ms",
            "16",
            "--log-level",
            "debug",
        ]);

        // Act
        let config = cli.into_client_config().unwrap();

        // Assert
        assert_eq!(config.endpoint, "ws://10.0.0.5:9000");
        assert_eq!(config.token, "secret");
        assert_eq!(config.drag_throttle_ms, 16);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let result = cli(&["--endpoint", "ws://10.0.0.5:9000", "--token", ""]).into_client_config();

        assert!(result.is_err());
    }

    #[test]
    fn test_wss_endpoint_is_rejected() {
        let result = cli(&["--endpoint", "wss://pi.local", "--token", "t"]).into_client_config();

        assert!(result.is_err());
    }

    #[test]
    fn test_zero_throttle_is_rejected() {
        let result = cli(&["--token", "t", "--drag-throttle-ms", "0"]).into_client_config();

        assert!(result.is_err());
    }

    #[test]
    fn test_default_endpoint_is_used_when_not_overridden() {
        let config = cli(&["--token", "t"]).into_client_config().unwrap();

        assert_eq!(config.endpoint, "ws://127.0.0.1:8765");
        assert_eq!(config.drag_throttle_ms, 10);
    }
}
