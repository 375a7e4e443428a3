//! SQL schema for the voucher SQLite store.
//!
//! Executed once per connection. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS coupons (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    code          TEXT    NOT NULL UNIQUE,
    employee_id   TEXT    NOT NULL,
    employee_name TEXT    NOT NULL,
    created_at    TEXT    NOT NULL,   -- RFC 3339 UTC; server-assigned
    redeemed      INTEGER NOT NULL DEFAULT 0 CHECK (redeemed IN (0, 1))
);

CREATE INDEX IF NOT EXISTS coupons_employee_idx ON coupons(employee_id);

-- The only permitted mutation is redeemed 0 -> 1.
CREATE TRIGGER IF NOT EXISTS coupons_update_guard
BEFORE UPDATE ON coupons
WHEN NEW.id            IS NOT OLD.id
  OR NEW.code          IS NOT OLD.code
  OR NEW.employee_id   IS NOT OLD.employee_id
  OR NEW.employee_name IS NOT OLD.employee_name
  OR NEW.created_at    IS NOT OLD.created_at
  OR (OLD.redeemed = 1 AND NEW.redeemed = 0)
BEGIN
  SELECT RAISE(ABORT, 'coupon rows only allow redeemed 0 -> 1');
END;

CREATE TRIGGER IF NOT EXISTS coupons_delete_guard
BEFORE DELETE ON coupons
BEGIN
  SELECT RAISE(ABORT, 'coupon rows are never deleted');
END;

PRAGMA user_version = 1;
";
