//! Month-scoped budget state: the selected month, its record, the entry draft,
//! and the load/save traffic that keeps the record in step with the store.

mod worker;

use chrono::{DateTime, Local};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::models::{BudgetSummary, Expense, ExpenseDraft, Month, MonthlyBudgetRecord};
use crate::store::KeyValueStore;
use worker::{LoadOutcome, StorageWorker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoadState {
    Loading,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub(crate) enum TrackerError {
    #[error("still loading the selected month")]
    NotReady,
    #[error("storage worker has stopped")]
    WorkerStopped,
}

pub(crate) type Result<T> = std::result::Result<T, TrackerError>;

pub(crate) struct BudgetTracker {
    month: Month,
    record: MonthlyBudgetRecord,
    state: LoadState,
    draft: ExpenseDraft,
    /// Sequence number of the most recent load; older results are ignored.
    load_seq: u64,
    worker: StorageWorker,
    loaded: mpsc::UnboundedReceiver<LoadOutcome>,
}

impl BudgetTracker {
    /// Create a tracker and start loading `month`. Must be called inside a
    /// tokio runtime.
    pub(crate) fn new(store: Arc<dyn KeyValueStore>, month: Month) -> Result<Self> {
        let (worker, loaded) = StorageWorker::spawn(store);
        let mut tracker = Self {
            month,
            record: MonthlyBudgetRecord::default(),
            state: LoadState::Loading,
            draft: ExpenseDraft::default(),
            load_seq: 0,
            worker,
            loaded,
        };
        tracker.set_month(month)?;
        Ok(tracker)
    }

    pub(crate) fn month(&self) -> Month {
        self.month
    }

    pub(crate) fn record(&self) -> &MonthlyBudgetRecord {
        &self.record
    }

    pub(crate) fn summary(&self) -> BudgetSummary {
        self.record.summary()
    }

    pub(crate) fn state(&self) -> LoadState {
        self.state
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.state() == LoadState::Loading
    }

    pub(crate) fn draft(&self) -> &ExpenseDraft {
        &self.draft
    }

    pub(crate) fn draft_mut(&mut self) -> &mut ExpenseDraft {
        &mut self.draft
    }

    // ── Month switching ──────────────────────────────────────

    /// Drop the in-memory record and start loading `month`.
    pub(crate) fn set_month(&mut self, month: Month) -> Result<()> {
        self.load_seq += 1;
        self.month = month;
        self.record = MonthlyBudgetRecord::default();
        self.state = LoadState::Loading;
        info!(%month, seq = self.load_seq, "loading month");
        if self.worker.load(self.load_seq, month) {
            Ok(())
        } else {
            Err(TrackerError::WorkerStopped)
        }
    }

    pub(crate) fn next_month(&mut self) -> Result<()> {
        self.set_month(self.month.next())
    }

    pub(crate) fn prev_month(&mut self) -> Result<()> {
        self.set_month(self.month.prev())
    }

    /// Apply a finished load if it is still the latest one requested.
    pub(crate) fn apply_load(&mut self, outcome: LoadOutcome) -> bool {
        if outcome.seq != self.load_seq {
            debug!(
                month = %outcome.month,
                seq = outcome.seq,
                latest = self.load_seq,
                "ignoring stale load"
            );
            return false;
        }
        let found = outcome.record.is_some();
        self.record = outcome.record.unwrap_or_default();
        self.state = LoadState::Ready;
        info!(month = %outcome.month, found, expenses = self.record.expenses.len(), "month ready");
        true
    }

    /// Apply every load that has already finished, without waiting.
    /// Returns whether the visible record changed.
    pub(crate) fn poll_loads(&mut self) -> bool {
        let mut changed = false;
        while let Ok(outcome) = self.loaded.try_recv() {
            changed |= self.apply_load(outcome);
        }
        changed
    }

    /// Wait until the latest requested month has loaded.
    pub(crate) async fn wait_ready(&mut self) -> Result<()> {
        while self.state == LoadState::Loading {
            let outcome = self.loaded.recv().await.ok_or(TrackerError::WorkerStopped)?;
            self.apply_load(outcome);
        }
        Ok(())
    }

    // ── Mutations ────────────────────────────────────────────

    /// Add the current draft as an expense and clear the draft. An invalid
    /// draft is left as-is and nothing is saved.
    pub(crate) fn add_expense(&mut self) -> Result<Option<Expense>> {
        self.add_expense_at(Local::now())
    }

    pub(crate) fn add_expense_at(&mut self, now: DateTime<Local>) -> Result<Option<Expense>> {
        self.ensure_ready()?;
        let Some(expense) = self.record.add_expense(&self.draft, now).cloned() else {
            return Ok(None);
        };
        self.draft.clear();
        info!(month = %self.month, id = expense.id, amount = expense.amount, "expense added");
        self.persist();
        Ok(Some(expense))
    }

    /// Add an expense from a draft that did not come from the entry form.
    pub(crate) fn add_expense_from(&mut self, draft: &ExpenseDraft) -> Result<Option<Expense>> {
        self.ensure_ready()?;
        let Some(expense) = self.record.add_expense(draft, Local::now()).cloned() else {
            return Ok(None);
        };
        info!(month = %self.month, id = expense.id, amount = expense.amount, "expense added");
        self.persist();
        Ok(Some(expense))
    }

    /// Remove the expense with `id`. The record is saved either way.
    pub(crate) fn delete_expense(&mut self, id: i64) -> Result<bool> {
        self.ensure_ready()?;
        let removed = self.record.remove_expense(id);
        info!(month = %self.month, id, removed, "expense deleted");
        self.persist();
        Ok(removed)
    }

    pub(crate) fn set_team_size(&mut self, raw: &str) -> Result<u32> {
        self.ensure_ready()?;
        let size = self.record.set_team_size(raw);
        info!(month = %self.month, size, "team size set");
        self.persist();
        Ok(size)
    }

    pub(crate) fn adjust_team_size(&mut self, delta: i64) -> Result<u32> {
        let target = i64::from(self.record.team_size).saturating_add(delta);
        self.set_team_size(&target.to_string())
    }

    /// Wait until every queued save has reached the store.
    pub(crate) async fn flush(&self) -> Result<()> {
        if self.worker.flush().await {
            Ok(())
        } else {
            Err(TrackerError::WorkerStopped)
        }
    }

    fn ensure_ready(&self) -> Result<()> {
        match self.state {
            LoadState::Ready => Ok(()),
            LoadState::Loading => Err(TrackerError::NotReady),
        }
    }

    fn persist(&self) {
        if !self.worker.save(self.month, &self.record) {
            tracing::error!(month = %self.month, "storage worker unavailable, change not saved");
        }
    }
}

#[cfg(test)]
mod tests;
