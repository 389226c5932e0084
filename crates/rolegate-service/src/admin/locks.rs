//! Per-key async locks for administration writes.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Serializes writers that target the same key.
///
/// Persistence is written before memory, so two writers on one key must
/// not interleave or the stored and in-memory values could diverge.
/// Writers on different keys proceed independently.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl KeyedLocks {
    /// Creates an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for and returns the lock guarding `key`.
    ///
    /// The key's entry is dropped from the table once the last holder or
    /// waiter releases it.
    pub async fn lock(&self, key: String) -> KeyedGuard<'_> {
        let mutex = self.locks.entry(key.clone()).or_default().clone();
        let guard = mutex.lock_owned().await;
        KeyedGuard {
            locks: self,
            key,
            guard: Some(guard),
        }
    }

    /// Number of keys currently held or awaited.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no key is held or awaited.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Holds one key's lock; releases it and prunes the table on drop.
#[derive(Debug)]
pub struct KeyedGuard<'a> {
    locks: &'a KeyedLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyedGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        // The table holds one reference; any other is a pending waiter.
        self.locks
            .locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
