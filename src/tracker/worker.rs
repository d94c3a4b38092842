use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

use crate::models::{Month, MonthlyBudgetRecord};
use crate::store::KeyValueStore;

/// Records are always read and written in the shared scope.
const SHARED: bool = true;

#[derive(Debug)]
pub(crate) enum Request {
    Load { seq: u64, month: Month },
    Save { month: Month, payload: String },
    Flush(oneshot::Sender<()>),
}

/// Result of a finished load, tagged with the sequence number it was issued under.
#[derive(Debug)]
pub(crate) struct LoadOutcome {
    pub(crate) seq: u64,
    pub(crate) month: Month,
    pub(crate) record: Option<MonthlyBudgetRecord>,
}

/// Handle to the background task that owns all store I/O for one tracker.
/// Requests are served strictly in the order they were sent.
pub(crate) struct StorageWorker {
    requests: mpsc::UnboundedSender<Request>,
}

impl StorageWorker {
    /// Spawn the worker on the current tokio runtime.
    pub(crate) fn spawn(
        store: Arc<dyn KeyValueStore>,
    ) -> (Self, mpsc::UnboundedReceiver<LoadOutcome>) {
        let (req_tx, req_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        tokio::spawn(run(store, req_rx, out_tx));
        (Self { requests: req_tx }, out_rx)
    }

    pub(crate) fn load(&self, seq: u64, month: Month) -> bool {
        self.requests.send(Request::Load { seq, month }).is_ok()
    }

    /// Queue a write of `record`. Fire-and-forget: failures are only logged.
    pub(crate) fn save(&self, month: Month, record: &MonthlyBudgetRecord) -> bool {
        let payload = match record.to_payload() {
            Ok(p) => p,
            Err(e) => {
                error!(%month, error = %e, "failed to serialize budget record");
                return false;
            }
        };
        self.requests.send(Request::Save { month, payload }).is_ok()
    }

    /// Wait until every request sent before this call has been handled.
    pub(crate) async fn flush(&self) -> bool {
        let (done_tx, done_rx) = oneshot::channel();
        if self.requests.send(Request::Flush(done_tx)).is_err() {
            return false;
        }
        done_rx.await.is_ok()
    }
}

async fn run(
    store: Arc<dyn KeyValueStore>,
    mut requests: mpsc::UnboundedReceiver<Request>,
    loaded: mpsc::UnboundedSender<LoadOutcome>,
) {
    while let Some(first) = requests.recv().await {
        let mut batch = vec![first];
        while let Ok(next) = requests.try_recv() {
            batch.push(next);
        }

        for request in coalesce(batch) {
            match request {
                Request::Load { seq, month } => {
                    let record = fetch_record(store.as_ref(), month).await;
                    if loaded.send(LoadOutcome { seq, month, record }).is_err() {
                        debug!("tracker dropped, stopping storage worker");
                        return;
                    }
                }
                Request::Save { month, payload } => {
                    if let Err(e) = store.set(&month.storage_key(), &payload, SHARED).await {
                        error!(%month, error = %e, "failed to save budget record");
                    } else {
                        debug!(%month, bytes = payload.len(), "saved budget record");
                    }
                }
                Request::Flush(done) => {
                    let _ = done.send(());
                }
            }
        }
    }
}

/// Drop saves that a later save to the same month supersedes before anything
/// could have observed them. A load or flush of that month keeps earlier saves.
pub(crate) fn coalesce(batch: Vec<Request>) -> Vec<Request> {
    let mut keep = vec![true; batch.len()];
    for (i, request) in batch.iter().enumerate() {
        let Request::Save { month, .. } = request else {
            continue;
        };
        for later in &batch[i + 1..] {
            match later {
                Request::Save { month: m, .. } if m == month => {
                    keep[i] = false;
                    break;
                }
                Request::Load { month: m, .. } if m == month => break,
                Request::Flush(_) => break,
                _ => {}
            }
        }
    }
    batch
        .into_iter()
        .zip(keep)
        .filter_map(|(request, keep)| keep.then_some(request))
        .collect()
}

/// Read and decode a month's record. `None` covers a missing entry, a store
/// failure and an unreadable payload alike; the latter two are logged.
pub(crate) async fn fetch_record(
    store: &dyn KeyValueStore,
    month: Month,
) -> Option<MonthlyBudgetRecord> {
    match store.get(&month.storage_key(), SHARED).await {
        Ok(Some(payload)) => match MonthlyBudgetRecord::from_payload(&payload) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(%month, error = %e, "discarding unreadable budget record");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!(%month, error = %e, "failed to load budget record");
            None
        }
    }
}
