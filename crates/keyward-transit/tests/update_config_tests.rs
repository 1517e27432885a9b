//! Integration tests for transit key configuration updates.
//!
//! Fixture records use `latest_version = 5` unless noted.

mod support;

use std::sync::Arc;
use std::time::Duration;

use keyward_transit::DefaultKeyPolicyStore;
use keyward_transit::ErrorKind;
use keyward_transit::KeyPolicy;
use keyward_transit::KeyPolicyStore;
use keyward_transit::TransitError;
use keyward_transit::UpdateKeyConfigRequest;
use keyward_transit::constants::MIN_DECRYPTION_VERSION_ZERO_WARNING;
use support::policy;
use support::seeded_store;

#[tokio::test]
async fn test_version_above_latest_fails_and_leaves_record() {
    let (store, backend) = seeded_store(policy(3, false)).await;

    let err = store
        .update_key_config(UpdateKeyConfigRequest::new("payments").with_min_decryption_version(6))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(err.to_string(), "cannot set min decryption version of 6, latest key version is 5");
    assert_eq!(backend.writes(), 0);
    assert_eq!(store.read_key_config("payments").await.unwrap().unwrap(), policy(3, false));
}

#[tokio::test]
async fn test_zero_normalizes_to_one_with_warning() {
    let (store, backend) = seeded_store(policy(3, false)).await;

    let resp = store
        .update_key_config(UpdateKeyConfigRequest::new("payments").with_min_decryption_version(0))
        .await
        .unwrap()
        .expect("record changed");

    assert_eq!(resp.warnings, vec![MIN_DECRYPTION_VERSION_ZERO_WARNING.to_string()]);
    assert_eq!(resp.policy.min_decryption_version, 1);
    assert_eq!(backend.writes(), 1);

    let stored = store.read_key_config("payments").await.unwrap().unwrap();
    assert_eq!(stored.min_decryption_version, 1);
}

#[tokio::test]
async fn test_deletion_flag_only() {
    let (store, backend) = seeded_store(policy(3, false)).await;

    let resp = store
        .update_key_config(UpdateKeyConfigRequest::new("payments").with_deletion_allowed(true))
        .await
        .unwrap()
        .expect("record changed");

    assert!(resp.warnings.is_empty());
    assert!(resp.policy.deletion_allowed);
    assert_eq!(resp.policy.min_decryption_version, 3);
    assert_eq!(backend.writes(), 1);
}

#[tokio::test]
async fn test_legacy_record_upgraded_on_empty_request() {
    let legacy = KeyPolicy::new("old-key", 1).with_latest_version(2).with_min_decryption_version(0);
    let (store, backend) = seeded_store(legacy).await;

    let resp = store
        .update_key_config(UpdateKeyConfigRequest::new("old-key"))
        .await
        .unwrap()
        .expect("legacy upgrade persists");

    assert!(resp.warnings.is_empty());
    assert_eq!(resp.policy.min_decryption_version, 1);
    assert!(!resp.policy.deletion_allowed);
    assert_eq!(backend.writes(), 1);

    let stored = store.read_key_config("old-key").await.unwrap().unwrap();
    assert_eq!(stored.min_decryption_version, 1);
}

#[tokio::test]
async fn test_negative_version_rejects_whole_request() {
    let (store, backend) = seeded_store(policy(3, false)).await;

    let err = store
        .update_key_config(
            UpdateKeyConfigRequest::new("payments").with_min_decryption_version(-1).with_deletion_allowed(true),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, TransitError::NegativeMinDecryptionVersion { requested: -1 }));
    assert_eq!(err.to_string(), "min decryption version cannot be negative");
    assert_eq!(backend.writes(), 0);

    let stored = store.read_key_config("payments").await.unwrap().unwrap();
    assert!(!stored.deletion_allowed);
}

#[tokio::test]
async fn test_empty_request_is_noop() {
    let (store, backend) = seeded_store(policy(3, false)).await;

    let res = store.update_key_config(UpdateKeyConfigRequest::new("payments")).await.unwrap();

    assert!(res.is_none());
    assert_eq!(backend.writes(), 0);
}

#[tokio::test]
async fn test_unchanged_values_are_noop() {
    let (store, backend) = seeded_store(policy(3, true)).await;

    let res = store
        .update_key_config(
            UpdateKeyConfigRequest::new("payments").with_min_decryption_version(3).with_deletion_allowed(true),
        )
        .await
        .unwrap();

    assert!(res.is_none());
    assert_eq!(backend.writes(), 0);
}

#[tokio::test]
async fn test_missing_key_is_invalid_request() {
    let (store, backend) = seeded_store(policy(3, false)).await;

    let err = store
        .update_key_config(UpdateKeyConfigRequest::new("unknown").with_deletion_allowed(true))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.is_invalid_request());
    assert_eq!(err.to_string(), "no existing key named unknown could be found");
    assert_eq!(backend.writes(), 0);
}

#[tokio::test]
async fn test_set_to_latest_is_allowed() {
    let (store, _backend) = seeded_store(policy(3, false)).await;

    let resp = store
        .update_key_config(UpdateKeyConfigRequest::new("payments").with_min_decryption_version(5))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(resp.policy.min_decryption_version, 5);
    assert!(resp.policy.can_decrypt_version(5));
    assert!(!resp.policy.can_decrypt_version(4));
}

#[tokio::test]
async fn test_persistence_failure_is_internal() {
    let (store, backend) = seeded_store(policy(3, false)).await;
    backend.fail_writes(true);

    let err = store
        .update_key_config(UpdateKeyConfigRequest::new("payments").with_deletion_allowed(true))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(!err.is_invalid_request());

    backend.fail_writes(false);
    assert!(!store.read_key_config("payments").await.unwrap().unwrap().deletion_allowed);
}

#[tokio::test]
async fn test_validation_failure_never_touches_failing_storage() {
    let (store, backend) = seeded_store(policy(3, false)).await;
    backend.fail_writes(true);

    let err = store
        .update_key_config(UpdateKeyConfigRequest::new("payments").with_min_decryption_version(9))
        .await
        .unwrap_err();

    assert!(matches!(err, TransitError::MinDecryptionVersionTooHigh { requested: 9, latest: 5 }));
}

#[tokio::test]
async fn test_same_update_twice_is_idempotent() {
    let (store, backend) = seeded_store(policy(3, false)).await;
    let request = UpdateKeyConfigRequest::new("payments").with_min_decryption_version(4).with_deletion_allowed(true);

    let first = store.update_key_config(request.clone()).await.unwrap().unwrap();
    let second = store.update_key_config(request).await.unwrap();

    assert!(second.is_none());
    assert_eq!(backend.writes(), 1);
    assert_eq!(store.read_key_config("payments").await.unwrap().unwrap(), first.policy);
}

#[tokio::test]
async fn test_retries_after_concurrent_modification() {
    let (store, backend) = seeded_store(policy(3, false)).await;
    backend.steal_next_cas(2);

    let resp = store
        .update_key_config(UpdateKeyConfigRequest::new("payments").with_min_decryption_version(4))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(resp.policy.min_decryption_version, 4);
    assert_eq!(backend.writes(), 1);
}

#[tokio::test]
async fn test_gives_up_after_max_cas_retries() {
    let (store, backend) = seeded_store(policy(3, false)).await;
    backend.steal_next_cas(u32::MAX);

    let err = store
        .update_key_config(UpdateKeyConfigRequest::new("payments").with_deletion_allowed(true))
        .await
        .unwrap_err();

    match err {
        TransitError::CasRetriesExhausted { name, attempts } => {
            assert_eq!(name, "payments");
            assert_eq!(attempts, store.config().max_cas_retries);
        }
        other => panic!("expected CasRetriesExhausted, got {other:?}"),
    }
    assert_eq!(backend.writes(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_updates_do_not_lose_changes() {
    let (store, backend) = seeded_store(policy(3, false)).await;
    backend.stall_loads(Duration::from_millis(50));
    let store = Arc::new(store);

    let versions = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            store
                .update_key_config(UpdateKeyConfigRequest::new("payments").with_min_decryption_version(4))
                .await
        })
    };
    let deletion = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            store.update_key_config(UpdateKeyConfigRequest::new("payments").with_deletion_allowed(true)).await
        })
    };

    versions.await.unwrap().unwrap().unwrap();
    deletion.await.unwrap().unwrap().unwrap();

    let stored = store.read_key_config("payments").await.unwrap().unwrap();
    assert_eq!(stored.min_decryption_version, 4);
    assert!(stored.deletion_allowed);
    // The key lock kept the second load behind the first write.
    assert_eq!(backend.cas_misses(), 0);
    assert_eq!(backend.writes(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_updates_from_separate_stores_do_not_lose_changes() {
    let (first, backend) = seeded_store(policy(3, false)).await;
    backend.stall_loads(Duration::from_millis(50));
    // A second store shares the backend but not the key locks.
    let second = DefaultKeyPolicyStore::new(backend.clone());

    let versions = tokio::spawn(async move {
        first
            .update_key_config(UpdateKeyConfigRequest::new("payments").with_min_decryption_version(4))
            .await
    });
    let deletion = tokio::spawn(async move {
        second.update_key_config(UpdateKeyConfigRequest::new("payments").with_deletion_allowed(true)).await
    });

    versions.await.unwrap().unwrap().unwrap();
    deletion.await.unwrap().unwrap().unwrap();

    backend.stall_loads(Duration::ZERO);
    let reader = DefaultKeyPolicyStore::new(backend.clone());
    let stored = reader.read_key_config("payments").await.unwrap().unwrap();
    assert_eq!(stored.min_decryption_version, 4);
    assert!(stored.deletion_allowed);
    // Both loaded the same stamp, so one versioned write had to retry.
    assert!(backend.cas_misses() >= 1);
    assert_eq!(backend.writes(), 2);
}
