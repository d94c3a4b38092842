#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use super::worker::{coalesce, fetch_record, LoadOutcome, Request};
use super::*;
use crate::models::{ExpenseDraft, Month, MonthlyBudgetRecord};
use crate::store::{KeyValueStore, MemoryStore};

fn month(s: &str) -> Month {
    s.parse().unwrap()
}

fn as_dyn(store: &Arc<MemoryStore>) -> Arc<dyn KeyValueStore> {
    Arc::clone(store) as Arc<dyn KeyValueStore>
}

async fn ready_tracker(store: &Arc<MemoryStore>, m: &str) -> BudgetTracker {
    let mut tracker = BudgetTracker::new(as_dyn(store), month(m)).unwrap();
    tracker.wait_ready().await.unwrap();
    tracker
}

async fn stored(store: &Arc<MemoryStore>, m: &str) -> Option<MonthlyBudgetRecord> {
    fetch_record(store.as_ref(), month(m)).await
}

async fn seed(store: &Arc<MemoryStore>, m: &str, record: &MonthlyBudgetRecord) {
    store
        .set(&month(m).storage_key(), &record.to_payload().unwrap(), true)
        .await
        .unwrap();
}

fn fill_draft(tracker: &mut BudgetTracker, name: &str, amount: &str) {
    let draft = tracker.draft_mut();
    draft.name = name.into();
    draft.amount = amount.into();
}

// ── Loading ───────────────────────────────────────────────────

#[tokio::test]
async fn test_new_tracker_starts_loading() {
    let store = Arc::new(MemoryStore::new());
    let mut tracker = BudgetTracker::new(as_dyn(&store), month("2026-01")).unwrap();
    assert!(tracker.is_loading());
    tracker.wait_ready().await.unwrap();
    assert_eq!(tracker.state(), LoadState::Ready);
}

#[tokio::test]
async fn test_missing_month_loads_defaults() {
    let store = Arc::new(MemoryStore::new());
    let tracker = ready_tracker(&store, "2026-01").await;
    assert_eq!(tracker.record(), &MonthlyBudgetRecord::default());
    assert_eq!(tracker.summary().total_budget, 350000);
}

#[tokio::test]
async fn test_loads_existing_record() {
    let store = Arc::new(MemoryStore::new());
    let mut record = MonthlyBudgetRecord::default();
    record.set_team_size("3");
    seed(&store, "2026-01", &record).await;

    let tracker = ready_tracker(&store, "2026-01").await;
    assert_eq!(tracker.record().team_size, 3);
}

#[tokio::test]
async fn test_malformed_payload_loads_defaults() {
    let store = Arc::new(MemoryStore::new());
    store
        .set("budget-2026-01", "{not json", true)
        .await
        .unwrap();
    let tracker = ready_tracker(&store, "2026-01").await;
    assert_eq!(tracker.record(), &MonthlyBudgetRecord::default());
}

#[tokio::test]
async fn test_read_failure_loads_defaults() {
    let store = Arc::new(MemoryStore::new());
    let mut record = MonthlyBudgetRecord::default();
    record.set_team_size("2");
    seed(&store, "2026-01", &record).await;
    store.fail_reads(true);

    let tracker = ready_tracker(&store, "2026-01").await;
    assert_eq!(tracker.record(), &MonthlyBudgetRecord::default());
    assert!(!tracker.is_loading());
}

#[tokio::test]
async fn test_private_scope_is_not_read() {
    let store = Arc::new(MemoryStore::new());
    let mut record = MonthlyBudgetRecord::default();
    record.set_team_size("2");
    store
        .set("budget-2026-01", &record.to_payload().unwrap(), false)
        .await
        .unwrap();

    let tracker = ready_tracker(&store, "2026-01").await;
    assert_eq!(tracker.record().team_size, 7);
}

// ── Month switching ───────────────────────────────────────────

#[tokio::test]
async fn test_rapid_month_switch_keeps_latest() {
    let store = Arc::new(MemoryStore::new());
    let mut jan = MonthlyBudgetRecord::default();
    jan.set_team_size("2");
    let mut feb = MonthlyBudgetRecord::default();
    feb.set_team_size("9");
    seed(&store, "2026-01", &jan).await;
    seed(&store, "2026-02", &feb).await;

    let mut tracker = BudgetTracker::new(as_dyn(&store), month("2026-01")).unwrap();
    tracker.set_month(month("2026-02")).unwrap();
    tracker.wait_ready().await.unwrap();

    assert_eq!(tracker.month(), month("2026-02"));
    assert_eq!(tracker.record().team_size, 9);

    // The January result, if it was still queued, must not win.
    tracker.flush().await.unwrap();
    tracker.poll_loads();
    assert_eq!(tracker.record().team_size, 9);
}

#[tokio::test]
async fn test_stale_outcome_is_ignored() {
    let store = Arc::new(MemoryStore::new());
    let mut tracker = ready_tracker(&store, "2026-02").await;
    tracker.set_team_size("4").unwrap();

    let mut stale = MonthlyBudgetRecord::default();
    stale.set_team_size("40");
    let applied = tracker.apply_load(LoadOutcome {
        seq: 0,
        month: month("2026-01"),
        record: Some(stale),
    });

    assert!(!applied);
    assert_eq!(tracker.month(), month("2026-02"));
    assert_eq!(tracker.record().team_size, 4);
}

#[tokio::test]
async fn test_switch_discards_previous_record() {
    let store = Arc::new(MemoryStore::new());
    let mut tracker = ready_tracker(&store, "2026-01").await;
    fill_draft(&mut tracker, "Kim", "1000");
    tracker.add_expense().unwrap();

    tracker.next_month().unwrap();
    assert!(tracker.record().expenses.is_empty());
    tracker.wait_ready().await.unwrap();
    assert_eq!(tracker.month(), month("2026-02"));
    assert!(tracker.record().expenses.is_empty());
}

#[tokio::test]
async fn test_switch_back_sees_unflushed_save() {
    let store = Arc::new(MemoryStore::new());
    let mut tracker = ready_tracker(&store, "2026-01").await;
    fill_draft(&mut tracker, "Kim", "42000");
    tracker.add_expense().unwrap();

    tracker.next_month().unwrap();
    tracker.prev_month().unwrap();
    tracker.wait_ready().await.unwrap();

    assert_eq!(tracker.month(), month("2026-01"));
    assert_eq!(tracker.record().expenses.len(), 1);
    assert_eq!(tracker.record().expenses[0].amount, 42000);
}

// ── Mutations ─────────────────────────────────────────────────

#[tokio::test]
async fn test_mutations_rejected_while_loading() {
    let store = Arc::new(MemoryStore::new());
    let mut tracker = BudgetTracker::new(as_dyn(&store), month("2026-01")).unwrap();
    fill_draft(&mut tracker, "Kim", "1000");

    assert_eq!(tracker.add_expense(), Err(TrackerError::NotReady));
    assert_eq!(tracker.delete_expense(1), Err(TrackerError::NotReady));
    assert_eq!(tracker.set_team_size("3"), Err(TrackerError::NotReady));
    assert_eq!(tracker.draft().name, "Kim");
}

#[tokio::test]
async fn test_add_expense_persists_and_clears_draft() {
    let store = Arc::new(MemoryStore::new());
    let mut tracker = ready_tracker(&store, "2026-01").await;
    fill_draft(&mut tracker, "Kim", "42000");
    tracker.draft_mut().description = "team lunch".into();

    let expense = tracker.add_expense().unwrap().unwrap();
    assert_eq!(expense.name, "Kim");
    assert_eq!(expense.description, "team lunch");
    assert!(tracker.draft().is_empty());

    tracker.flush().await.unwrap();
    assert_eq!(stored(&store, "2026-01").await.as_ref(), Some(tracker.record()));
}

#[tokio::test]
async fn test_invalid_draft_is_ignored() {
    let store = Arc::new(MemoryStore::new());
    let mut tracker = ready_tracker(&store, "2026-01").await;

    fill_draft(&mut tracker, "", "1000");
    assert_eq!(tracker.add_expense().unwrap(), None);
    fill_draft(&mut tracker, "Kim", "lots");
    assert_eq!(tracker.add_expense().unwrap(), None);

    assert_eq!(tracker.draft().amount, "lots");
    assert!(tracker.record().expenses.is_empty());
    tracker.flush().await.unwrap();
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn test_add_expense_from_keeps_form_draft() {
    let store = Arc::new(MemoryStore::new());
    let mut tracker = ready_tracker(&store, "2026-01").await;
    fill_draft(&mut tracker, "Lee", "500");

    let added = tracker
        .add_expense_from(&ExpenseDraft::new("Kim", "1000", ""))
        .unwrap();
    assert!(added.is_some());
    assert_eq!(tracker.draft().name, "Lee");
}

#[tokio::test]
async fn test_delete_expense_twice() {
    let store = Arc::new(MemoryStore::new());
    let mut tracker = ready_tracker(&store, "2026-01").await;
    fill_draft(&mut tracker, "Kim", "1000");
    let id = tracker.add_expense().unwrap().unwrap().id;

    assert!(tracker.delete_expense(id).unwrap());
    let once = tracker.record().clone();
    assert!(!tracker.delete_expense(id).unwrap());
    assert_eq!(tracker.record(), &once);

    tracker.flush().await.unwrap();
    assert_eq!(stored(&store, "2026-01").await, Some(once));
}

#[tokio::test]
async fn test_team_size_coercion_persists() {
    let store = Arc::new(MemoryStore::new());
    let mut tracker = ready_tracker(&store, "2026-01").await;

    assert_eq!(tracker.set_team_size("-5").unwrap(), 1);
    assert_eq!(tracker.set_team_size("abc").unwrap(), 1);
    assert_eq!(tracker.set_team_size("5").unwrap(), 5);
    assert_eq!(tracker.adjust_team_size(2).unwrap(), 7);
    assert_eq!(tracker.adjust_team_size(-20).unwrap(), 1);

    tracker.flush().await.unwrap();
    assert_eq!(stored(&store, "2026-01").await.unwrap().team_size, 1);
}

#[tokio::test]
async fn test_save_failure_keeps_memory_state() {
    let store = Arc::new(MemoryStore::new());
    let mut tracker = ready_tracker(&store, "2026-01").await;
    store.fail_writes(true);

    fill_draft(&mut tracker, "Kim", "1000");
    tracker.add_expense().unwrap();
    tracker.flush().await.unwrap();

    assert_eq!(tracker.record().expenses.len(), 1);
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn test_scenario_add_delete_totals() {
    let store = Arc::new(MemoryStore::new());
    let mut tracker = ready_tracker(&store, "2026-01").await;
    let initial = tracker.summary();

    fill_draft(&mut tracker, "Kim", "42000");
    let id = tracker.add_expense().unwrap().unwrap().id;
    let summary = tracker.summary();
    assert_eq!(summary.total_spent, 42000);
    assert_eq!(summary.remaining, 308000);
    assert!((summary.usage_percent - 12.0).abs() < 1e-9);

    tracker.delete_expense(id).unwrap();
    assert_eq!(tracker.summary(), initial);
}

#[tokio::test]
async fn test_scenario_over_budget() {
    let store = Arc::new(MemoryStore::new());
    let mut tracker = ready_tracker(&store, "2026-01").await;
    tracker.set_team_size("1").unwrap();
    fill_draft(&mut tracker, "Kim", "60000");
    tracker.add_expense().unwrap();

    let summary = tracker.summary();
    assert_eq!(summary.remaining, -10000);
    assert!(summary.is_over_budget());
}

#[tokio::test]
async fn test_save_then_load_roundtrip() {
    let store = Arc::new(MemoryStore::new());
    let mut tracker = ready_tracker(&store, "2026-03").await;
    tracker.set_team_size("4").unwrap();
    for (name, amount) in [("Kim", "100"), ("Lee", "250"), ("Park", "0")] {
        fill_draft(&mut tracker, name, amount);
        tracker.add_expense().unwrap();
    }
    tracker.flush().await.unwrap();
    let expected = tracker.record().clone();

    let reopened = ready_tracker(&store, "2026-03").await;
    assert_eq!(reopened.record(), &expected);
}

// ── Write coalescing ──────────────────────────────────────────

fn save(m: &str, payload: &str) -> Request {
    Request::Save {
        month: month(m),
        payload: payload.into(),
    }
}

fn payloads(batch: &[Request]) -> Vec<String> {
    batch
        .iter()
        .map(|r| match r {
            Request::Save { month, payload } => format!("{month}:{payload}"),
            Request::Load { month, .. } => format!("load {month}"),
            Request::Flush(_) => "flush".into(),
        })
        .collect()
}

#[test]
fn test_coalesce_keeps_last_save_per_month() {
    let batch = vec![
        save("2026-01", "a"),
        save("2026-02", "x"),
        save("2026-01", "b"),
        save("2026-01", "c"),
    ];
    assert_eq!(payloads(&coalesce(batch)), ["2026-02:x", "2026-01:c"]);
}

#[test]
fn test_coalesce_respects_intervening_load() {
    let batch = vec![
        save("2026-01", "a"),
        Request::Load {
            seq: 1,
            month: month("2026-01"),
        },
        save("2026-01", "b"),
    ];
    assert_eq!(
        payloads(&coalesce(batch)),
        ["2026-01:a", "load 2026-01", "2026-01:b"]
    );
}

#[test]
fn test_coalesce_respects_flush() {
    let (tx, _rx) = tokio::sync::oneshot::channel();
    let batch = vec![save("2026-01", "a"), Request::Flush(tx), save("2026-01", "b")];
    assert_eq!(payloads(&coalesce(batch)), ["2026-01:a", "flush", "2026-01:b"]);
}
