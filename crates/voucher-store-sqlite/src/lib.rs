//! SQLite backend for the voucher ledger.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Redemption is a single conditional
//! `UPDATE`, so any number of handles or processes may share one file.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{LedgerOptions, SqliteLedger};

#[cfg(test)]
mod tests;
