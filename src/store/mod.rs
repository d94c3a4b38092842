mod memory;
mod schema;
mod sqlite;

use async_trait::async_trait;

pub(crate) use memory::MemoryStore;
pub(crate) use sqlite::SqliteStore;

#[derive(Debug, thiserror::Error)]
pub(crate) enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("store lock poisoned")]
    Poisoned,
    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub(crate) type Result<T> = std::result::Result<T, StoreError>;

/// Async string key-value store. Every entry is scoped by `shared`; the same
/// key in the shared and private scopes names two different entries.
#[async_trait]
pub(crate) trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str, shared: bool) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str, shared: bool) -> Result<()>;
}
