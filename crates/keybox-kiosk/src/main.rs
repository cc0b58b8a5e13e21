//! `keybox` binary: runs one kiosk against the configured server.
//!
//! Tags are entered on stdin as hex UIDs (`04ABCDEF` or `04:ab:cd:ef`), one
//! per line. Closing stdin stops the kiosk, as does Ctrl+C.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use keybox_hardware::mock::{MockLed, MockServo, MockTagReader, MockTagReaderHandle};
use keybox_kiosk::{ActuatorPanel, Kiosk, KioskConfig};
use keybox_network::{MockStatusClient, StatusClient};

/// Key-checkout kiosk controller
#[derive(Parser, Debug)]
#[command(name = "keybox")]
#[command(version)]
#[command(about = "Records key takes and returns from tag taps")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use a simulated in-process server instead of HTTP
    #[arg(long, default_value_t = false)]
    mock_server: bool,

    /// Log filter, e.g. "debug" or "keybox_engine=trace" (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let mut config = match &cli.config {
        Some(path) => KioskConfig::load(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => KioskConfig::default(),
    };
    config
        .apply_env_overrides()
        .context("Invalid environment override")?;
    config.validate().context("Invalid configuration")?;

    let (reader, handle) = MockTagReader::with_name(config.kiosk.reader_name.clone());
    tokio::spawn(feed_stdin(handle));

    if cli.mock_server {
        info!("Using simulated server");
        run(&config, reader, MockStatusClient::simulated(false)).await
    } else {
        let client = config
            .status_client()
            .context("Failed to build HTTP client")?;
        info!(url = %client.status_url(), device_id = %config.device.id, "Using HTTP server");
        run(&config, reader, client).await
    }
}

async fn run<C: StatusClient>(
    config: &KioskConfig,
    reader: MockTagReader,
    client: C,
) -> Result<()> {
    let engine = config.engine_builder().build(client);
    let panel = ActuatorPanel::new(MockLed::new(), MockServo::new(), config.servo_pulse());
    let mut kiosk = Kiosk::new(reader, engine, panel, config.poll_interval());

    kiosk.run(wait_for_shutdown()).await?;
    Ok(())
}

/// Forward hex UIDs typed on stdin to the tag reader.
async fn feed_stdin(handle: MockTagReaderHandle) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if let Err(e) = handle.present_hex(line).await {
                    if e.is_disconnected() {
                        break;
                    }
                    warn!(input = line, error = %e, "Ignoring input");
                }
            }
            Ok(None) => {
                info!("Stdin closed");
                break;
            }
            Err(e) => {
                error!(error = %e, "Failed to read stdin");
                break;
            }
        }
    }
}

/// Initialize tracing with `--log-level`, then `RUST_LOG`, then `info`.
fn init_tracing(level: Option<&str>) {
    let filter = level
        .map(EnvFilter::new)
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C.
async fn wait_for_shutdown() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(err) => {
            error!("Failed to listen for shutdown signal: {}", err);
            std::future::pending::<()>().await;
        }
    }
}
