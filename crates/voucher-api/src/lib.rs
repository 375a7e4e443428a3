//! JSON REST API for the voucher ledger.
//!
//! Exposes an axum [`Router`] backed by any [`voucher_core::CouponLedger`].
//! Static assets, TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", voucher_api::api_router(state))
//! ```

pub mod coupons;
pub mod error;
pub mod health;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use voucher_core::{CouponLedger, RandomCodeSource};

pub use error::ApiError;

/// Tunables for the API layer.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  /// Reported by `GET /health`.
  pub environment:    String,
  /// Codes drawn per `POST /coupons` before a collision is reported as 409.
  pub issue_attempts: u32,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self { environment: "development".to_owned(), issue_attempts: 3 }
  }
}

/// State shared by every handler.
pub struct ApiState<L> {
  pub ledger: Arc<L>,
  pub codes:  Arc<dyn RandomCodeSource>,
  pub config: ApiConfig,
}

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<L>(state: ApiState<L>) -> Router<()>
where
  L: CouponLedger + 'static,
{
  Router::new()
    .route("/coupons", post(coupons::create::<L>))
    .route("/coupons/redeem", post(coupons::redeem::<L>))
    .route("/coupons/{code}", get(coupons::get_one::<L>))
    .route("/health", get(health::handler::<L>))
    .with_state(Arc::new(state))
}
