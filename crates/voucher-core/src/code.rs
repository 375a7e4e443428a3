//! Redemption codes and the sources they are drawn from.

use std::{
  collections::VecDeque,
  fmt,
  sync::{Mutex, PoisonError},
};

use rand_core::{OsRng, RngCore as _};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Random bytes per code. Hex-encoded, this gives [`CODE_LEN`] characters.
pub const CODE_BYTES: usize = 6;

/// Length of a freshly generated code.
pub const CODE_LEN: usize = CODE_BYTES * 2;

/// The opaque string a customer presents at redemption time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CouponCode(String);

impl CouponCode {
  /// Hex-encode raw random bytes into a code.
  pub fn from_bytes(bytes: [u8; CODE_BYTES]) -> Self { Self(hex::encode(bytes)) }

  /// Accept a code supplied by a caller.
  ///
  /// Only emptiness is rejected. A well-formed but unknown code must reach the
  /// ledger and come back as `NotFound`.
  pub fn parse(raw: &str) -> Result<Self, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
      return Err(ValidationError::EmptyField("code"));
    }
    Ok(Self(trimmed.to_owned()))
  }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn into_inner(self) -> String { self.0 }
}

impl fmt::Display for CouponCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

// ─── Sources ──────────────────────────────────────────────────────────────────

/// Capability that produces candidate codes for new coupons.
///
/// Uniqueness is not this trait's job: the ledger rejects duplicates and the
/// issuer reports them as conflicts.
pub trait RandomCodeSource: Send + Sync {
  fn next_code(&self) -> CouponCode;
}

/// Draws [`CODE_BYTES`] bytes from the operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsCodeSource;

impl RandomCodeSource for OsCodeSource {
  fn next_code(&self) -> CouponCode {
    let mut bytes = [0u8; CODE_BYTES];
    OsRng.fill_bytes(&mut bytes);
    CouponCode::from_bytes(bytes)
  }
}

/// Replays a fixed sequence of codes, then falls back to [`OsCodeSource`].
///
/// Used to force collisions deterministically.
#[derive(Debug, Default)]
pub struct ScriptedCodeSource {
  script: Mutex<VecDeque<CouponCode>>,
}

impl ScriptedCodeSource {
  pub fn new(codes: impl IntoIterator<Item = CouponCode>) -> Self {
    Self { script: Mutex::new(codes.into_iter().collect()) }
  }

  /// Convenience for tests: each string becomes a code verbatim.
  pub fn from_strs<'a>(codes: impl IntoIterator<Item = &'a str>) -> Self {
    Self::new(codes.into_iter().map(|c| CouponCode(c.to_owned())))
  }

  /// Number of scripted codes not yet handed out.
  pub fn remaining(&self) -> usize {
    self.script.lock().unwrap_or_else(PoisonError::into_inner).len()
  }
}

impl RandomCodeSource for ScriptedCodeSource {
  fn next_code(&self) -> CouponCode {
    let next = self
      .script
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .pop_front();
    next.unwrap_or_else(|| OsCodeSource.next_code())
  }
}
