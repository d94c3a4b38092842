mod config;
mod export;
mod logging;
mod models;
mod run;
mod store;
mod tracker;
mod ui;

use anyhow::{Context, Result};
use std::sync::Arc;

use config::{Config, StoreKind};
use store::{KeyValueStore, MemoryStore, SqliteStore};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config, rest) = Config::from_args(&args)?;
    logging::init(&config.log_path);

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let _guard = rt.enter();

    let store = open_store(&config.store)?;
    let mut tracker = tracker::BudgetTracker::new(store, config.start_month)?;

    if rest.is_empty() {
        run::as_tui(tracker, &rt)
    } else {
        let result = run::as_cli(&rest, &mut tracker, &rt);
        if let Err(e) = rt.block_on(tracker.flush()) {
            tracing::error!(error = %e, "pending saves were not flushed");
        }
        result
    }
}

fn open_store(kind: &StoreKind) -> Result<Arc<dyn KeyValueStore>> {
    let store: Arc<dyn KeyValueStore> = match kind {
        StoreKind::Sqlite(path) => {
            tracing::info!(path = %path.display(), "opening sqlite store");
            Arc::new(SqliteStore::open(path)?)
        }
        StoreKind::Memory => {
            tracing::info!("using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };
    Ok(store)
}
