//! voucher-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), overlays
//! `VOUCHER_*` environment variables, opens the SQLite ledger, and serves
//! the coupon API over HTTP.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use voucher_server::{ServerConfig, app, open_ledger};

#[derive(Parser)]
#[command(author, version, about = "Single-use coupon issuing and redemption server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let cfg = ServerConfig::load(&cli.config).context("failed to load configuration")?;

  let ledger = open_ledger(&cfg)
    .await
    .with_context(|| format!("failed to open ledger at {:?}", cfg.store_path))?;

  let address = cfg.address();
  tracing::info!(environment = %cfg.environment, "Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app(&cfg, ledger)).await.context("server error")?;

  Ok(())
}
