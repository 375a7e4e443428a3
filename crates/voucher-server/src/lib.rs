//! Server assembly for the voucher ledger: configuration, store opening and
//! the top-level router.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use axum::Router;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use voucher_api::{ApiConfig, ApiState, api_router};
use voucher_core::OsCodeSource;
use voucher_store_sqlite::{LedgerOptions, SqliteLedger};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `VOUCHER_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:            String,
  #[serde(default = "default_port")]
  pub port:            u16,
  #[serde(default = "default_store_path")]
  pub store_path:      PathBuf,
  /// Free-form label echoed by `GET /health`.
  #[serde(default = "default_environment")]
  pub environment:     String,
  #[serde(default = "default_busy_timeout_ms")]
  pub busy_timeout_ms: u64,
  #[serde(default = "default_issue_attempts")]
  pub issue_attempts:  u32,
}

fn default_host() -> String { "0.0.0.0".to_owned() }
fn default_port() -> u16 { 3000 }
fn default_store_path() -> PathBuf { PathBuf::from("coupons.db") }
fn default_environment() -> String { "development".to_owned() }
fn default_busy_timeout_ms() -> u64 { 5_000 }
fn default_issue_attempts() -> u32 { 3 }

impl ServerConfig {
  /// Layer an optional TOML file under `VOUCHER_*` environment variables.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("VOUCHER"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn ledger_options(&self) -> LedgerOptions {
    LedgerOptions { busy_timeout: Duration::from_millis(self.busy_timeout_ms) }
  }

  pub fn api_config(&self) -> ApiConfig {
    ApiConfig {
      environment:    self.environment.clone(),
      issue_attempts: self.issue_attempts,
    }
  }
}

// ─── Assembly ─────────────────────────────────────────────────────────────────

/// Open the configured SQLite ledger, expanding a leading `~`.
pub async fn open_ledger(cfg: &ServerConfig) -> voucher_store_sqlite::Result<SqliteLedger> {
  SqliteLedger::open_with(expand_tilde(&cfg.store_path), cfg.ledger_options()).await
}

/// Build the full HTTP application around an open ledger.
pub fn app(cfg: &ServerConfig, ledger: SqliteLedger) -> Router {
  api_router(ApiState {
    ledger: Arc::new(ledger),
    codes:  Arc::new(OsCodeSource),
    config: cfg.api_config(),
  })
  .layer(TraceLayer::new_for_http())
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
