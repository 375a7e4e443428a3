//! Issuing new coupons.

use tracing::warn;

use crate::{
  code::RandomCodeSource,
  coupon::{Coupon, NewCoupon},
  error::IssueError,
  ledger::{CouponLedger, InsertOutcome},
};

/// Draws a code and appends an unredeemed coupon to the ledger.
///
/// Borrowing both collaborators keeps construction free, so handlers build
/// one per request.
#[derive(Debug)]
pub struct Issuer<'a, L, R: ?Sized> {
  ledger: &'a L,
  codes:  &'a R,
}

impl<'a, L, R> Issuer<'a, L, R>
where
  L: CouponLedger,
  R: RandomCodeSource + ?Sized,
{
  pub fn new(ledger: &'a L, codes: &'a R) -> Self { Self { ledger, codes } }

  /// Single attempt: validate, draw one code, insert one row.
  ///
  /// A collision surfaces as [`IssueError::Conflict`] and nothing is written.
  pub async fn issue(
    &self,
    employee_id: &str,
    employee_name: &str,
  ) -> Result<Coupon, IssueError<L::Error>> {
    let new = NewCoupon::new(employee_id, employee_name)?;
    let code = self.codes.next_code();

    match self
      .ledger
      .insert(new, code.clone())
      .await
      .map_err(IssueError::Storage)?
    {
      InsertOutcome::Inserted(coupon) => Ok(coupon),
      InsertOutcome::Conflict => Err(IssueError::Conflict(code)),
    }
  }

  /// Repeat [`issue`](Self::issue) while it reports a collision, up to
  /// `max_attempts` times (at least once).
  pub async fn issue_with_retry(
    &self,
    employee_id: &str,
    employee_name: &str,
    max_attempts: u32,
  ) -> Result<Coupon, IssueError<L::Error>> {
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
      match self.issue(employee_id, employee_name).await {
        Err(IssueError::Conflict(code)) if attempt < max_attempts => {
          warn!(%code, attempt, "coupon code collision, drawing again");
          attempt += 1;
        }
        other => return other,
      }
    }
  }
}
