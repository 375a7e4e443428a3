//! Handler for `GET /health`.

use std::sync::Arc;

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ApiState;

#[derive(Debug, Serialize)]
pub struct Health {
  pub status:      &'static str,
  pub environment: String,
  pub timestamp:   DateTime<Utc>,
}

/// `GET /health` — liveness only; does not touch the store.
pub async fn handler<L>(State(state): State<Arc<ApiState<L>>>) -> Json<Health> {
  Json(Health {
    status:      "ok",
    environment: state.config.environment.clone(),
    timestamp:   Utc::now(),
  })
}
