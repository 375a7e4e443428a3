//! Error type for `voucher-store-sqlite`.

use thiserror::Error;

/// A storage failure. Business outcomes (conflicts, already-redeemed,
/// unknown codes) are never reported through this type.
#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("corrupt row: {0}")]
  CorruptRow(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
