use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::{KeyValueStore, Result, StoreError};

/// Process-local store. Nothing survives a restart.
#[derive(Default)]
pub(crate) struct MemoryStore {
    entries: Mutex<HashMap<(String, bool), String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `get` fail until switched back off.
    #[cfg(test)]
    pub(crate) fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `set` fail until switched back off.
    #[cfg(test)]
    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str, shared: bool) -> Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("read of {key} refused")));
        }
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(&(key.to_string(), shared)).cloned())
    }

    async fn set(&self, key: &str, value: &str, shared: bool) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("write of {key} refused")));
        }
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert((key.to_string(), shared), value.to_string());
        Ok(())
    }
}
