//! Handlers for `/coupons` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/coupons` | Body: [`CreateBody`]; returns 201 + [`CreatedCoupon`] |
//! | `POST` | `/coupons/redeem` | Body: [`RedeemBody`]; always 200 + [`RedeemResponse`] unless storage fails |
//! | `GET`  | `/coupons/{code}` | 404 if unknown |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use voucher_core::{Coupon, CouponCode, CouponLedger, Issuer, RedemptionResult};

use crate::{ApiState, error::ApiError};

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /coupons`.
///
/// Missing fields deserialise as empty and are rejected with 400.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  #[serde(default, alias = "employeeId")]
  pub employee_id:   String,
  #[serde(default, alias = "employeeName")]
  pub employee_name: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedCoupon {
  pub code:          CouponCode,
  pub employee_id:   String,
  pub employee_name: String,
  pub created_at:    DateTime<Utc>,
  /// Payload for a QR code; currently the bare code.
  pub qr_code_data:  String,
}

impl From<Coupon> for CreatedCoupon {
  fn from(c: Coupon) -> Self {
    CreatedCoupon {
      qr_code_data:  c.code.as_str().to_owned(),
      code:          c.code,
      employee_id:   c.employee_id,
      employee_name: c.employee_name,
      created_at:    c.created_at,
    }
  }
}

/// `POST /coupons` — body: `{"employee_id":"E1","employee_name":"Alice"}`
pub async fn create<L>(
  State(state): State<Arc<ApiState<L>>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  L: CouponLedger,
{
  let coupon = Issuer::new(&*state.ledger, &*state.codes)
    .issue_with_retry(&body.employee_id, &body.employee_name, state.config.issue_attempts)
    .await?;

  info!(code = %coupon.code, employee_id = %coupon.employee_id, "coupon issued");
  Ok((StatusCode::CREATED, Json(CreatedCoupon::from(coupon))))
}

// ─── Redeem ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RedeemBody {
  #[serde(default, alias = "couponId")]
  pub code: String,
}

#[derive(Debug, Serialize)]
pub struct RedeemResponse {
  /// `success`, `already_redeemed` or `not_found`.
  pub outcome:       &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub employee_name: Option<String>,
  pub message:       &'static str,
}

impl From<RedemptionResult> for RedeemResponse {
  fn from(r: RedemptionResult) -> Self {
    let outcome = r.outcome();
    let message = match r {
      RedemptionResult::Success { .. } => "coupon redeemed",
      RedemptionResult::AlreadyRedeemed => "coupon was already redeemed",
      RedemptionResult::NotFound => "no coupon with this code",
    };
    let employee_name = match r {
      RedemptionResult::Success { employee_name } => Some(employee_name),
      _ => None,
    };
    RedeemResponse { outcome, employee_name, message }
  }
}

/// `POST /coupons/redeem` — body: `{"code":"..."}`
///
/// Storage failures come back as 500 and are not retried here: the update may
/// have committed before the failure was observed.
pub async fn redeem<L>(
  State(state): State<Arc<ApiState<L>>>,
  Json(body): Json<RedeemBody>,
) -> Result<Json<RedeemResponse>, ApiError>
where
  L: CouponLedger,
{
  let code = CouponCode::parse(&body.code)?;

  let result = state
    .ledger
    .redeem(code.clone())
    .await
    .map_err(ApiError::store)?;

  match &result {
    RedemptionResult::Success { .. } => info!(%code, "coupon redeemed"),
    RedemptionResult::AlreadyRedeemed => warn!(%code, "repeat redemption attempt"),
    RedemptionResult::NotFound => warn!(%code, "redemption of unknown code"),
  }

  Ok(Json(RedeemResponse::from(result)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /coupons/{code}`
pub async fn get_one<L>(
  State(state): State<Arc<ApiState<L>>>,
  Path(code): Path<String>,
) -> Result<Json<Coupon>, ApiError>
where
  L: CouponLedger,
{
  let code = CouponCode::parse(&code)?;
  let coupon = state
    .ledger
    .get(code.clone())
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("coupon {code} not found")))?;
  Ok(Json(coupon))
}
