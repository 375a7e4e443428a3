//! Coupon — a single-use redemption record tied to one employee.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{code::CouponCode, error::ValidationError};

/// Validated input for a new coupon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCoupon {
  pub employee_id:   String,
  pub employee_name: String,
}

impl NewCoupon {
  /// Trim both fields and reject either one being empty.
  pub fn new(
    employee_id: impl AsRef<str>,
    employee_name: impl AsRef<str>,
  ) -> Result<Self, ValidationError> {
    let employee_id = employee_id.as_ref().trim();
    let employee_name = employee_name.as_ref().trim();

    if employee_id.is_empty() {
      return Err(ValidationError::EmptyField("employee_id"));
    }
    if employee_name.is_empty() {
      return Err(ValidationError::EmptyField("employee_name"));
    }

    Ok(Self {
      employee_id:   employee_id.to_owned(),
      employee_name: employee_name.to_owned(),
    })
  }
}

/// A persisted coupon as the ledger reports it.
///
/// Everything except `redeemed` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
  /// Store-assigned, monotonically increasing.
  pub id:            i64,
  pub code:          CouponCode,
  pub employee_id:   String,
  pub employee_name: String,
  pub created_at:    DateTime<Utc>,
  pub redeemed:      bool,
}

impl Coupon {
  pub fn state(&self) -> CouponState {
    if self.redeemed { CouponState::Redeemed } else { CouponState::Unredeemed }
  }
}

/// Lifecycle of a coupon. `Redeemed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponState {
  Unredeemed,
  Redeemed,
}

/// Outcome of a redemption attempt.
///
/// `AlreadyRedeemed` and `NotFound` are business outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedemptionResult {
  Success { employee_name: String },
  AlreadyRedeemed,
  NotFound,
}

impl RedemptionResult {
  /// Wire tag: `success`, `already_redeemed` or `not_found`.
  pub fn outcome(&self) -> &'static str {
    match self {
      RedemptionResult::Success { .. } => "success",
      RedemptionResult::AlreadyRedeemed => "already_redeemed",
      RedemptionResult::NotFound => "not_found",
    }
  }

  pub fn is_success(&self) -> bool { matches!(self, RedemptionResult::Success { .. }) }

  pub fn employee_name(&self) -> Option<&str> {
    match self {
      RedemptionResult::Success { employee_name } => Some(employee_name),
      _ => None,
    }
  }
}
