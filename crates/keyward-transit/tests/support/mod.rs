//! Shared helpers for transit integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use keyward_transit::DefaultKeyPolicyStore;
use keyward_transit::InMemoryPolicyBackend;
use keyward_transit::KeyPolicy;
use keyward_transit::PolicyBackend;
use keyward_transit::Result;
use keyward_transit::TransitError;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Backend wrapper that counts writes and can be told to fail or stall them.
#[derive(Default)]
pub struct RecordingBackend {
    inner: InMemoryPolicyBackend,
    writes: AtomicU32,
    cas_misses: AtomicU32,
    load_delay_ms: AtomicU64,
    fail_writes: AtomicBool,
    /// Number of upcoming `put_cas` calls that should lose to a foreign writer.
    steal_next_cas: AtomicU32,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Successful writes observed so far.
    pub fn writes(&self) -> u32 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Versioned writes rejected because the stamp had moved.
    pub fn cas_misses(&self) -> u32 {
        self.cas_misses.load(Ordering::SeqCst)
    }

    /// Hold every versioned load for `delay` after reading, so a second
    /// updater can load the same stamp before the first one writes.
    pub fn stall_loads(&self, delay: Duration) {
        self.load_delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make the next `count` versioned writes see a concurrent modification.
    pub fn steal_next_cas(&self, count: u32) {
        self.steal_next_cas.store(count, Ordering::SeqCst);
    }
}

#[async_trait]
impl PolicyBackend for RecordingBackend {
    async fn put(&self, path: &str, value: &[u8]) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(TransitError::Storage {
                reason: "injected write failure".into(),
            });
        }
        self.inner.put(path, value).await?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>> {
        self.inner.get(path).await
    }

    async fn get_with_version(&self, path: &str) -> Result<Option<(Vec<u8>, u64)>> {
        let loaded = self.inner.get_with_version(path).await?;
        let delay_ms = self.load_delay_ms.load(Ordering::SeqCst);
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
        Ok(loaded)
    }

    async fn put_cas(&self, path: &str, value: &[u8], expected_version: Option<u64>) -> Result<bool> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(TransitError::Storage {
                reason: "injected write failure".into(),
            });
        }
        let steal = self
            .steal_next_cas
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if steal {
            // Rewrite the current bytes so the version stamp moves on.
            if let Some(current) = self.inner.get(path).await? {
                self.inner.put(path, &current).await?;
            }
        }
        let written = self.inner.put_cas(path, value, expected_version).await?;
        if written {
            self.writes.fetch_add(1, Ordering::SeqCst);
        } else {
            self.cas_misses.fetch_add(1, Ordering::SeqCst);
        }
        Ok(written)
    }
}

/// Store over a recording backend, seeded with `policy`.
///
/// The seeding write is not counted.
pub async fn seeded_store(policy: KeyPolicy) -> (DefaultKeyPolicyStore, Arc<RecordingBackend>) {
    init_tracing();
    let backend = Arc::new(RecordingBackend::new());
    let store = DefaultKeyPolicyStore::new(backend.clone());
    store.create_policy(&policy).await.expect("seed policy");
    backend.writes.store(0, Ordering::SeqCst);
    (store, backend)
}

/// Policy with `latest_version` 5, the common fixture.
pub fn policy(min_decryption_version: u32, deletion_allowed: bool) -> KeyPolicy {
    KeyPolicy::new("payments", 1_700_000_000_000)
        .with_latest_version(5)
        .with_min_decryption_version(min_decryption_version)
        .with_deletion_allowed(deletion_allowed)
}
