//! Core types and trait definitions for the voucher ledger.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`ledger::CouponLedger`]; the API layer drives
//! it through [`issuer::Issuer`] and [`ledger::CouponLedger::redeem`].

pub mod code;
pub mod coupon;
pub mod error;
pub mod issuer;
pub mod ledger;

pub use code::{CouponCode, OsCodeSource, RandomCodeSource, ScriptedCodeSource};
pub use coupon::{Coupon, CouponState, NewCoupon, RedemptionResult};
pub use error::{IssueError, ValidationError};
pub use issuer::Issuer;
pub use ledger::{CouponLedger, InsertOutcome};
