//! Storage backend trait for key policy records.
//!
//! The transit engine only needs atomic single-record reads and writes. The
//! versioned variants (`get_with_version` / `put_cas`) let the updater detect
//! a record that changed between its load and its persist.

use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;

/// Storage backend for key policy records.
#[async_trait]
pub trait PolicyBackend: Send + Sync {
    /// Store a value at the given path, unconditionally.
    async fn put(&self, path: &str, value: &[u8]) -> Result<()>;

    /// Get a value at the given path.
    ///
    /// Returns `None` if the path doesn't exist.
    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>>;

    /// Get a value with its storage version stamp.
    ///
    /// Returns `None` if the path doesn't exist.
    async fn get_with_version(&self, path: &str) -> Result<Option<(Vec<u8>, u64)>>;

    /// Write a value only if the stored version still matches.
    ///
    /// `expected_version: None` means the path must not exist yet.
    /// Returns `false` when the check failed and nothing was written.
    async fn put_cas(&self, path: &str, value: &[u8], expected_version: Option<u64>) -> Result<bool>;
}

/// In-memory policy backend.
///
/// Thread-safe and deterministic; used by tests and single-process embeddings.
#[derive(Default)]
pub struct InMemoryPolicyBackend {
    data: RwLock<HashMap<String, (Vec<u8>, u64)>>,
    version_counter: AtomicU64,
}

impl InMemoryPolicyBackend {
    /// Create a new, empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    fn next_version(&self) -> u64 {
        self.version_counter.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl PolicyBackend for InMemoryPolicyBackend {
    async fn put(&self, path: &str, value: &[u8]) -> Result<()> {
        let version = self.next_version();
        let mut data = self.data.write().await;
        data.insert(path.to_string(), (value.to_vec(), version));
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let data = self.data.read().await;
        Ok(data.get(path).map(|(v, _)| v.clone()))
    }

    async fn get_with_version(&self, path: &str) -> Result<Option<(Vec<u8>, u64)>> {
        let data = self.data.read().await;
        Ok(data.get(path).cloned())
    }

    async fn put_cas(&self, path: &str, value: &[u8], expected_version: Option<u64>) -> Result<bool> {
        let mut data = self.data.write().await;

        let matches = match (data.get(path), expected_version) {
            (None, None) => true,
            (Some((_, current)), Some(expected)) => *current == expected,
            _ => false,
        };
        if !matches {
            return Ok(false);
        }

        let version = self.next_version();
        data.insert(path.to_string(), (value.to_vec(), version));
        Ok(true)
    }
}
