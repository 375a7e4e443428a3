//! Error types for `voucher-core`.

use thiserror::Error;

use crate::code::CouponCode;

/// Caller input that can never succeed as given. Not retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("{0} must not be empty")]
  EmptyField(&'static str),
}

/// Failure of [`Issuer::issue`](crate::issuer::Issuer::issue).
///
/// `E` is the ledger backend's error type.
#[derive(Debug, Error)]
pub enum IssueError<E: std::error::Error + Send + Sync + 'static> {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  /// The drawn code already belongs to another coupon. Draw again.
  #[error("code {0} collides with an existing coupon")]
  Conflict(CouponCode),

  #[error("storage error: {0}")]
  Storage(#[source] E),
}

impl<E: std::error::Error + Send + Sync + 'static> IssueError<E> {
  pub fn is_conflict(&self) -> bool { matches!(self, IssueError::Conflict(_)) }
}
