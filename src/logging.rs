use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Mutex, Once};

use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Send tracing output to `path`. Stdout belongs to the terminal UI, so
/// nothing is ever logged there; if the file cannot be opened logs are dropped.
pub(crate) fn init(path: &Path) {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("teambudget=info"));

        let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
            return;
        };

        let _ = fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init();
        tracing::info!(version = env!("CARGO_PKG_VERSION"), "teambudget starting");
    });
}
