//! [`SqliteLedger`] — the SQLite implementation of [`CouponLedger`].

use std::{path::Path, time::Duration};

use chrono::Utc;
use rusqlite::{ErrorCode, OptionalExtension as _, TransactionBehavior};
use tracing::debug;
use voucher_core::{
  Coupon, CouponCode, CouponLedger, InsertOutcome, NewCoupon, RedemptionResult,
};

use crate::{
  Result,
  encode::{COUPON_COLUMNS, RawCoupon, encode_dt},
  schema::SCHEMA,
};

// ─── Options ─────────────────────────────────────────────────────────────────

/// Connection settings applied when a ledger is opened.
#[derive(Debug, Clone)]
pub struct LedgerOptions {
  /// How long a statement waits on a lock held by another connection before
  /// failing with `SQLITE_BUSY`.
  pub busy_timeout: Duration,
}

impl Default for LedgerOptions {
  fn default() -> Self { Self { busy_timeout: Duration::from_secs(5) } }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A coupon ledger backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Separate
/// `open` calls on the same path get separate connections and still agree on
/// every redemption.
#[derive(Clone)]
pub struct SqliteLedger {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteLedger {
  /// Open (or create) a ledger at `path` with default options.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::open_with(path, LedgerOptions::default()).await
  }

  pub async fn open_with(path: impl AsRef<Path>, options: LedgerOptions) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let ledger = Self { conn };
    ledger.init(options).await?;
    Ok(ledger)
  }

  /// Open an in-memory ledger — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let ledger = Self { conn };
    ledger.init(LedgerOptions::default()).await?;
    Ok(ledger)
  }

  async fn init(&self, options: LedgerOptions) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.busy_timeout(options.busy_timeout)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── CouponLedger impl ───────────────────────────────────────────────────────

impl CouponLedger for SqliteLedger {
  type Error = crate::Error;

  async fn insert(&self, coupon: NewCoupon, code: CouponCode) -> Result<InsertOutcome> {
    let created_at = Utc::now();
    let code_str   = code.as_str().to_owned();
    let at_str     = encode_dt(created_at);
    let emp_id     = coupon.employee_id.clone();
    let emp_name   = coupon.employee_name.clone();

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let inserted = conn.query_row(
          "INSERT INTO coupons (code, employee_id, employee_name, created_at)
           VALUES (?1, ?2, ?3, ?4)
           RETURNING id",
          rusqlite::params![code_str, emp_id, emp_name, at_str],
          |row| row.get(0),
        );
        match inserted {
          Ok(id) => Ok(Some(id)),
          // Only `code` carries a UNIQUE constraint.
          Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == ErrorCode::ConstraintViolation
              && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
          {
            Ok(None)
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    let Some(id) = id else {
      debug!(%code, "insert rejected by unique constraint");
      return Ok(InsertOutcome::Conflict);
    };

    Ok(InsertOutcome::Inserted(Coupon {
      id,
      code,
      employee_id: coupon.employee_id,
      employee_name: coupon.employee_name,
      created_at,
      redeemed: false,
    }))
  }

  async fn redeem(&self, code: CouponCode) -> Result<RedemptionResult> {
    let code_str = code.into_inner();

    let outcome = self
      .conn
      .call(move |conn| {
        // IMMEDIATE takes the write lock up front, waiting out other
        // connections through the busy handler.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let name: Option<String> = tx
          .query_row(
            "UPDATE coupons SET redeemed = 1
             WHERE code = ?1 AND redeemed = 0
             RETURNING employee_name",
            rusqlite::params![code_str],
            |row| row.get(0),
          )
          .optional()?;

        let outcome = match name {
          Some(employee_name) => RedemptionResult::Success { employee_name },
          None => {
            // Rows are never deleted and never un-redeemed, so existence
            // alone tells the two zero-row cases apart.
            let exists = tx
              .query_row(
                "SELECT 1 FROM coupons WHERE code = ?1",
                rusqlite::params![code_str],
                |_| Ok(()),
              )
              .optional()?
              .is_some();
            if exists {
              RedemptionResult::AlreadyRedeemed
            } else {
              RedemptionResult::NotFound
            }
          }
        };

        tx.commit()?;
        Ok(outcome)
      })
      .await?;

    Ok(outcome)
  }

  async fn get(&self, code: CouponCode) -> Result<Option<Coupon>> {
    let code_str = code.into_inner();

    let raw: Option<RawCoupon> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE code = ?1"),
            rusqlite::params![code_str],
            RawCoupon::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawCoupon::into_coupon).transpose()
  }

  async fn list_by_employee(&self, employee_id: String) -> Result<Vec<Coupon>> {
    let raws: Vec<RawCoupon> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COUPON_COLUMNS} FROM coupons WHERE employee_id = ?1 ORDER BY id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![employee_id], RawCoupon::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCoupon::into_coupon).collect()
  }
}
