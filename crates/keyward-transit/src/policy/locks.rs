//! Per-key exclusion for read-modify-write sequences.
//!
//! Every configuration update holds its key's guard from load to persist,
//! so two updaters in the same process never interleave on one key.
//! Cross-process writers are caught by the optimistic write in the store.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;
use tokio::sync::OwnedMutexGuard;

use crate::constants::MAX_TRACKED_KEY_LOCKS;

/// Guard held for the duration of one key's update.
pub type KeyGuard = OwnedMutexGuard<()>;

/// Registry of per-key async mutexes.
#[derive(Default)]
pub struct KeyLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl KeyLocks {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `name`.
    pub async fn acquire(&self, name: &str) -> KeyGuard {
        let lock = {
            let mut locks = self.locks.lock();
            if locks.len() >= MAX_TRACKED_KEY_LOCKS {
                // Only the registry references an idle lock.
                locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            Arc::clone(locks.entry(name.to_string()).or_default())
        };
        lock.lock_owned().await
    }
}
