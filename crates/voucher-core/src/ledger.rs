//! The `CouponLedger` trait: the authoritative store of coupon records.
//!
//! The ledger is the only component allowed to flip a coupon's `redeemed`
//! flag, and it must do so with a single atomic conditional update so that
//! concurrent redemptions of one code yield exactly one success, even across
//! processes sharing the same store.

use std::future::Future;

use crate::{
  code::CouponCode,
  coupon::{Coupon, NewCoupon, RedemptionResult},
};

/// Result of a raw insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
  Inserted(Coupon),
  /// The store's uniqueness constraint on `code` rejected the row.
  Conflict,
}

/// Abstraction over a coupon store backend.
///
/// All methods return `Send` futures so the trait can be used from axum
/// handlers on a multi-threaded runtime.
pub trait CouponLedger: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Append a new unredeemed coupon under `code`.
  ///
  /// A duplicate code is reported as [`InsertOutcome::Conflict`]; the existing
  /// row is left untouched.
  fn insert(
    &self,
    coupon: NewCoupon,
    code: CouponCode,
  ) -> impl Future<Output = Result<InsertOutcome, Self::Error>> + Send + '_;

  /// Transition `code` from unredeemed to redeemed, at most once.
  ///
  /// Errors are storage failures only. Callers must not retry automatically:
  /// an ambiguous failure may hide a success that already committed.
  fn redeem(
    &self,
    code: CouponCode,
  ) -> impl Future<Output = Result<RedemptionResult, Self::Error>> + Send + '_;

  /// Look up a coupon without touching it.
  fn get(
    &self,
    code: CouponCode,
  ) -> impl Future<Output = Result<Option<Coupon>, Self::Error>> + Send + '_;

  /// All coupons issued to one employee, oldest first.
  fn list_by_employee(
    &self,
    employee_id: String,
  ) -> impl Future<Output = Result<Vec<Coupon>, Self::Error>> + Send + '_;
}
