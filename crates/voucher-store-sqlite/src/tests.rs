//! Integration tests for `SqliteLedger` against in-memory and on-disk
//! databases.

use std::collections::HashSet;

use tokio::task::JoinSet;
use voucher_core::{
  CouponCode, CouponLedger, InsertOutcome, IssueError, Issuer, NewCoupon, OsCodeSource,
  RedemptionResult, ScriptedCodeSource,
};

use crate::SqliteLedger;

async fn ledger() -> SqliteLedger {
  SqliteLedger::open_in_memory()
    .await
    .expect("in-memory ledger")
}

fn code(s: &str) -> CouponCode { CouponCode::parse(s).unwrap() }

fn alice() -> NewCoupon { NewCoupon::new("E1", "Alice").unwrap() }

// ─── Insert ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get() {
  let l = ledger().await;

  let InsertOutcome::Inserted(coupon) = l.insert(alice(), code("0123456789ab")).await.unwrap()
  else {
    panic!("expected insert");
  };
  assert!(!coupon.redeemed);
  assert_eq!(coupon.code.as_str(), "0123456789ab");

  let fetched = l.get(code("0123456789ab")).await.unwrap().unwrap();
  assert_eq!(fetched, coupon);
}

#[tokio::test]
async fn ids_increase_monotonically() {
  let l = ledger().await;
  let issuer = Issuer::new(&l, &OsCodeSource);

  let a = issuer.issue("E1", "Alice").await.unwrap();
  let b = issuer.issue("E1", "Alice").await.unwrap();
  let c = issuer.issue("E2", "Bob").await.unwrap();
  assert!(a.id < b.id && b.id < c.id);
}

#[tokio::test]
async fn duplicate_code_is_conflict_and_keeps_original() {
  let l = ledger().await;
  l.insert(alice(), code("aaaaaaaaaaaa")).await.unwrap();

  let second = l
    .insert(NewCoupon::new("E2", "Bob").unwrap(), code("aaaaaaaaaaaa"))
    .await
    .unwrap();
  assert_eq!(second, InsertOutcome::Conflict);

  let kept = l.get(code("aaaaaaaaaaaa")).await.unwrap().unwrap();
  assert_eq!(kept.employee_id, "E1");
  assert_eq!(kept.employee_name, "Alice");
}

#[tokio::test]
async fn issuer_reports_conflict_from_store_constraint() {
  let l = ledger().await;
  let codes = ScriptedCodeSource::from_strs(["bbbbbbbbbbbb", "bbbbbbbbbbbb", "cccccccccccc"]);
  let issuer = Issuer::new(&l, &codes);

  issuer.issue("E1", "Alice").await.unwrap();
  let err = issuer.issue("E2", "Bob").await.unwrap_err();
  assert!(matches!(err, IssueError::Conflict(ref c) if c.as_str() == "bbbbbbbbbbbb"));

  let retried = issuer.issue_with_retry("E2", "Bob", 2).await.unwrap();
  assert_eq!(retried.code.as_str(), "cccccccccccc");
  assert_eq!(l.list_by_employee("E2".into()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn ten_thousand_issued_codes_are_distinct() {
  let l = ledger().await;
  let issuer = Issuer::new(&l, &OsCodeSource);

  let mut codes = HashSet::new();
  for i in 0..10_000 {
    let coupon = issuer.issue(&format!("E{i}"), "Someone").await.unwrap();
    codes.insert(coupon.code);
  }
  assert_eq!(codes.len(), 10_000);
}

#[tokio::test]
async fn list_by_employee_is_oldest_first() {
  let l = ledger().await;
  let issuer = Issuer::new(&l, &OsCodeSource);

  let first = issuer.issue("E1", "Alice").await.unwrap();
  issuer.issue("E2", "Bob").await.unwrap();
  let second = issuer.issue("E1", "Alice").await.unwrap();

  let listed = l.list_by_employee("E1".into()).await.unwrap();
  let ids: Vec<_> = listed.iter().map(|c| c.id).collect();
  assert_eq!(ids, vec![first.id, second.id]);
}

// ─── Redeem ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn issue_redeem_redeem_again() {
  let l = ledger().await;
  let c1 = Issuer::new(&l, &OsCodeSource).issue("E1", "Alice").await.unwrap();

  let first = l.redeem(c1.code.clone()).await.unwrap();
  assert_eq!(first, RedemptionResult::Success { employee_name: "Alice".into() });

  let again = l.redeem(c1.code.clone()).await.unwrap();
  assert_eq!(again, RedemptionResult::AlreadyRedeemed);
}

#[tokio::test]
async fn unknown_code_on_empty_store_is_not_found() {
  let l = ledger().await;
  assert_eq!(l.redeem(code("ffffffffffff")).await.unwrap(), RedemptionResult::NotFound);
  assert_eq!(l.redeem(code("does-not-exist")).await.unwrap(), RedemptionResult::NotFound);
}

#[tokio::test]
async fn unknown_code_does_not_touch_other_rows() {
  let l = ledger().await;
  let c1 = Issuer::new(&l, &OsCodeSource).issue("E1", "Alice").await.unwrap();

  assert_eq!(l.redeem(code("does-not-exist")).await.unwrap(), RedemptionResult::NotFound);
  assert_eq!(l.get(code("does-not-exist")).await.unwrap(), None);
  assert!(!l.get(c1.code).await.unwrap().unwrap().redeemed);
}

#[tokio::test]
async fn redeem_flips_only_the_flag() {
  let l = ledger().await;
  let issued = Issuer::new(&l, &OsCodeSource).issue("E1", "Alice").await.unwrap();

  l.redeem(issued.code.clone()).await.unwrap();
  let after = l.get(issued.code.clone()).await.unwrap().unwrap();

  assert!(after.redeemed);
  assert_eq!(after.id, issued.id);
  assert_eq!(after.employee_id, issued.employee_id);
  assert_eq!(after.employee_name, issued.employee_name);
  assert_eq!(after.created_at, issued.created_at);
}

#[tokio::test]
async fn redeemed_never_comes_back() {
  let l = ledger().await;
  let c1 = Issuer::new(&l, &OsCodeSource).issue("E1", "Alice").await.unwrap();
  l.redeem(c1.code.clone()).await.unwrap();

  for _ in 0..5 {
    assert_eq!(l.redeem(c1.code.clone()).await.unwrap(), RedemptionResult::AlreadyRedeemed);
  }
}

#[tokio::test]
async fn store_rejects_unredeeming_and_deleting() {
  let l = ledger().await;
  let c1 = Issuer::new(&l, &OsCodeSource).issue("E1", "Alice").await.unwrap();
  l.redeem(c1.code.clone()).await.unwrap();

  let code_str = c1.code.as_str().to_owned();
  let reset = l
    .conn
    .call(move |conn| {
      conn.execute("UPDATE coupons SET redeemed = 0 WHERE code = ?1", [&code_str])?;
      Ok(())
    })
    .await;
  assert!(reset.is_err());

  let code_str = c1.code.as_str().to_owned();
  let renamed = l
    .conn
    .call(move |conn| {
      conn.execute("UPDATE coupons SET employee_name = 'Mallory' WHERE code = ?1", [&code_str])?;
      Ok(())
    })
    .await;
  assert!(renamed.is_err());

  let deleted = l
    .conn
    .call(|conn| {
      conn.execute("DELETE FROM coupons", [])?;
      Ok(())
    })
    .await;
  assert!(deleted.is_err());

  let still = l.get(c1.code).await.unwrap().unwrap();
  assert!(still.redeemed);
  assert_eq!(still.employee_name, "Alice");
}

// ─── Concurrency ─────────────────────────────────────────────────────────────

fn tally(results: &[RedemptionResult]) -> (usize, usize, usize) {
  let success = results.iter().filter(|r| r.is_success()).count();
  let already = results
    .iter()
    .filter(|r| **r == RedemptionResult::AlreadyRedeemed)
    .count();
  let missing = results
    .iter()
    .filter(|r| **r == RedemptionResult::NotFound)
    .count();
  (success, already, missing)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_redeems_on_one_handle_succeed_once() {
  let l = ledger().await;
  let c1 = Issuer::new(&l, &OsCodeSource).issue("E1", "Alice").await.unwrap();

  let mut set = JoinSet::new();
  for _ in 0..32 {
    let l = l.clone();
    let code = c1.code.clone();
    set.spawn(async move { l.redeem(code).await.unwrap() });
  }
  let results = set.join_all().await;

  assert_eq!(tally(&results), (1, 31, 0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn two_simultaneous_redeems_never_both_succeed() {
  let l = ledger().await;
  let c1 = Issuer::new(&l, &OsCodeSource).issue("E1", "Alice").await.unwrap();

  let (a, b) = tokio::join!(l.redeem(c1.code.clone()), l.redeem(c1.code.clone()));
  let mut results = vec![a.unwrap(), b.unwrap()];
  results.sort_by_key(|r| r.outcome());

  assert_eq!(results, vec![
    RedemptionResult::AlreadyRedeemed,
    RedemptionResult::Success { employee_name: "Alice".into() },
  ]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn separate_connections_on_one_file_succeed_once() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("coupons.db");

  let mut handles = Vec::new();
  for _ in 0..8 {
    handles.push(SqliteLedger::open(&path).await.unwrap());
  }

  let mut codes = Vec::new();
  for i in 0..10 {
    let coupon = Issuer::new(&handles[i % handles.len()], &OsCodeSource)
      .issue(&format!("E{i}"), "Someone")
      .await
      .unwrap();
    codes.push(coupon.code);
  }

  let mut set = JoinSet::new();
  for code in &codes {
    for handle in &handles {
      let handle = handle.clone();
      let code = code.clone();
      set.spawn(async move { (code.clone(), handle.redeem(code).await.unwrap()) });
    }
  }
  let results = set.join_all().await;

  for code in &codes {
    let per_code: Vec<_> = results
      .iter()
      .filter(|(c, _)| c == code)
      .map(|(_, r)| r.clone())
      .collect();
    assert_eq!(tally(&per_code), (1, handles.len() - 1, 0), "code {code}");
  }
}

#[tokio::test]
async fn reopening_a_file_keeps_redemptions() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("coupons.db");

  let issued = {
    let l = SqliteLedger::open(&path).await.unwrap();
    let c = Issuer::new(&l, &OsCodeSource).issue("E1", "Alice").await.unwrap();
    l.redeem(c.code.clone()).await.unwrap();
    c
  };

  let l = SqliteLedger::open(&path).await.unwrap();
  assert_eq!(l.redeem(issued.code).await.unwrap(), RedemptionResult::AlreadyRedeemed);
}
