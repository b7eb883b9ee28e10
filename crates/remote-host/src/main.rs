//! Pi-Remote host relay — entry point.
//!
//! Accepts handheld clients over plain WebSocket and injects their input.
//! Put a TLS terminator in front of it before exposing it beyond the LAN.
//!
//! # Usage
//!
//! ```text
//! remote-host [OPTIONS]
//!
//! Options:
//!   --config    <PATH>  Config file [default: <config dir>/host.toml]
//!   --bind      <ADDR>  Listen address [default: 0.0.0.0:8765]
//!   --token     <TOKEN> Shared secret expected in API_KEY
//!   --password  <PASS>  Password typed on the handheld to unlock input
//!   --log-level <LEVEL> Filter used when RUST_LOG is unset
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable             | Flag         |
//! |----------------------|--------------|
//! | `PI_REMOTE_CONFIG`   | `--config`   |
//! | `PI_REMOTE_BIND`     | `--bind`     |
//! | `PI_REMOTE_TOKEN`    | `--token`    |
//! | `PI_REMOTE_PASSWORD` | `--password` |
//!
//! CLI args take precedence over the environment, which takes precedence
//! over the config file.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use remote_host::domain::HostConfig;
use remote_host::infrastructure::input_emulation::LoggingEmulator;
use remote_host::infrastructure::run_server;
use remote_host::infrastructure::storage::{config_file_path, load_config_from, ConfigError};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Pi-Remote host relay.
#[derive(Debug, Parser)]
#[command(
    name = "remote-host",
    about = "WebSocket relay that turns Pi-Remote frames into host input",
    version
)]
struct Cli {
    /// Path of the TOML config file.
    #[arg(long, env = "PI_REMOTE_CONFIG")]
    config: Option<PathBuf>,

    /// Address the WebSocket server listens on.
    #[arg(long, env = "PI_REMOTE_BIND")]
    bind: Option<SocketAddr>,

    /// Shared secret every client must send as `API_KEY`.
    #[arg(long, env = "PI_REMOTE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Password that unlocks input injection for a connection.
    #[arg(long, env = "PI_REMOTE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// `tracing` filter used when `RUST_LOG` is not set.
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Loads the config file and applies the command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a secret
    /// is missing after merging.
    fn into_host_config(self) -> anyhow::Result<HostConfig> {
        let mut config = match &self.config {
            Some(path) => load_config_from(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => match config_file_path() {
                Ok(path) => load_config_from(&path)
                    .with_context(|| format!("failed to load config from {}", path.display()))?,
                Err(ConfigError::NoPlatformConfigDir) => HostConfig::default(),
                Err(e) => return Err(e.into()),
            },
        };

        if let Some(bind) = self.bind {
            config.bind_addr = bind;
        }
        if let Some(token) = self.token {
            config.token = token;
        }
        if let Some(password) = self.password {
            config.password = password;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }

        config.validate().context("invalid host configuration")?;
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// 1. Parse the command line and merge it over the config file.
/// 2. Initialise `tracing`; `RUST_LOG` wins over the configured level.
/// 3. Spawn a Ctrl+C handler that clears the shared `running` flag.
/// 4. Run the accept loop until the flag is cleared.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse().into_host_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!(bind = %config.bind_addr, "Pi-Remote host starting");

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C; initiating graceful shutdown");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    run_server(
        config,
        Arc::new(LoggingEmulator::new()),
        Default::default(),
        running,
    )
    .await?;

    info!("Pi-Remote host stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
