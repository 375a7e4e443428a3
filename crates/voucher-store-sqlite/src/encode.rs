//! Conversions between domain types and SQLite column values.
//!
//! Timestamps are stored as RFC 3339 strings; `redeemed` as 0/1.

use chrono::{DateTime, Utc};
use voucher_core::{Coupon, CouponCode};

use crate::{Error, Result};

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// Column list shared by every `SELECT` that feeds [`RawCoupon::from_row`].
pub const COUPON_COLUMNS: &str =
  "id, code, employee_id, employee_name, created_at, redeemed";

/// A `coupons` row as SQLite hands it back, before timestamp parsing.
pub struct RawCoupon {
  pub id:            i64,
  pub code:          String,
  pub employee_id:   String,
  pub employee_name: String,
  pub created_at:    String,
  pub redeemed:      bool,
}

impl RawCoupon {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      code:          row.get(1)?,
      employee_id:   row.get(2)?,
      employee_name: row.get(3)?,
      created_at:    row.get(4)?,
      redeemed:      row.get(5)?,
    })
  }

  pub fn into_coupon(self) -> Result<Coupon> {
    let code = CouponCode::parse(&self.code)
      .map_err(|e| Error::CorruptRow(format!("coupon {}: {e}", self.id)))?;
    Ok(Coupon {
      id:            self.id,
      code,
      employee_id:   self.employee_id,
      employee_name: self.employee_name,
      created_at:    decode_dt(&self.created_at)?,
      redeemed:      self.redeemed,
    })
  }
}
