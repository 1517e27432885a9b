//! Key policy store implementation.
//!
//! Loads key policy records, applies configuration updates planned by
//! [`crate::verified::key_config`], and persists the result with a single
//! versioned write.

use std::sync::Arc;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::backend::PolicyBackend;
use crate::config::TransitConfig;
use crate::constants::CAS_RETRY_INITIAL_BACKOFF_MS;
use crate::constants::CAS_RETRY_MAX_BACKOFF_MS;
use crate::constants::KEY_POLICY_PATH_SEGMENT;
use crate::error::Result;
use crate::error::TransitError;
use crate::policy::locks::KeyLocks;
use crate::policy::types::KeyPolicy;
use crate::policy::types::UpdateKeyConfigRequest;
use crate::policy::types::UpdateKeyConfigResponse;
use crate::verified::key_config::KeyConfigRejection;
use crate::verified::key_config::plan_key_config_update;
use crate::verified::key_name::check_key_name;

/// Transit key policy store.
///
/// Provides:
/// - Key configuration updates (minimum decryption version, deletion flag)
/// - Policy reads
#[async_trait]
pub trait KeyPolicyStore: Send + Sync {
    /// Update key configuration.
    ///
    /// Returns `Ok(None)` when nothing changed and nothing was written.
    async fn update_key_config(&self, request: UpdateKeyConfigRequest) -> Result<Option<UpdateKeyConfigResponse>>;

    /// Read a key's policy.
    async fn read_key_config(&self, name: &str) -> Result<Option<KeyPolicy>>;
}

/// Default key policy store using a [`PolicyBackend`].
pub struct DefaultKeyPolicyStore {
    /// Storage backend.
    backend: Arc<dyn PolicyBackend>,
    /// Engine configuration.
    config: TransitConfig,
    /// Serializes updates to the same key within this process.
    locks: KeyLocks,
}

impl DefaultKeyPolicyStore {
    /// Create a new store with the default configuration.
    pub fn new(backend: Arc<dyn PolicyBackend>) -> Self {
        Self {
            backend,
            config: TransitConfig::default(),
            locks: KeyLocks::new(),
        }
    }

    /// Create a new store with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `config` fails [`TransitConfig::validate`].
    pub fn with_config(backend: Arc<dyn PolicyBackend>, config: TransitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            backend,
            config,
            locks: KeyLocks::new(),
        })
    }

    /// The store's configuration.
    pub fn config(&self) -> &TransitConfig {
        &self.config
    }

    /// Get current timestamp in milliseconds.
    fn now_unix_ms() -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
    }

    /// Validate a key name.
    fn validate_key_name(&self, name: &str) -> Result<()> {
        check_key_name(name, self.config.max_key_name_length).map_err(|rejection| TransitError::InvalidKeyName {
            name: name.to_string(),
            reason: rejection.reason(),
        })
    }

    /// Get storage path for a key.
    pub fn key_path(&self, name: &str) -> String {
        format!("{}/{}/{}", self.config.mount, KEY_POLICY_PATH_SEGMENT, name)
    }

    fn decode(path: &str, bytes: &[u8]) -> Result<KeyPolicy> {
        postcard::from_bytes(bytes).map_err(|e| TransitError::CorruptedRecord {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    fn encode(policy: &KeyPolicy) -> Result<Vec<u8>> {
        postcard::to_allocvec(policy).map_err(|e| TransitError::Serialization { reason: e.to_string() })
    }

    /// Load a policy together with its storage version stamp.
    async fn load_versioned(&self, path: &str) -> Result<Option<(KeyPolicy, u64)>> {
        match self.backend.get_with_version(path).await? {
            Some((bytes, version)) => Ok(Some((Self::decode(path, &bytes)?, version))),
            None => Ok(None),
        }
    }

    /// Store a new policy record.
    ///
    /// Create-only: an existing record is never overwritten. Later changes
    /// go through [`KeyPolicyStore::update_key_config`].
    ///
    /// # Errors
    ///
    /// Returns `KeyAlreadyExists` if a record is already stored for the name.
    pub async fn create_policy(&self, policy: &KeyPolicy) -> Result<()> {
        self.validate_key_name(&policy.name)?;
        let path = self.key_path(&policy.name);
        let bytes = Self::encode(policy)?;
        if !self.backend.put_cas(&path, &bytes, None).await? {
            return Err(TransitError::KeyAlreadyExists {
                name: policy.name.clone(),
            });
        }

        debug!(mount = %self.config.mount, name = %policy.name, latest_version = policy.latest_version, "Created key policy");

        Ok(())
    }

    fn rejection_error(rejection: KeyConfigRejection) -> TransitError {
        match rejection {
            KeyConfigRejection::NegativeMinDecryptionVersion { requested } => {
                TransitError::NegativeMinDecryptionVersion { requested }
            }
            KeyConfigRejection::MinDecryptionVersionTooHigh { requested, latest } => {
                TransitError::MinDecryptionVersionTooHigh { requested, latest }
            }
        }
    }
}

#[async_trait]
impl KeyPolicyStore for DefaultKeyPolicyStore {
    async fn update_key_config(&self, request: UpdateKeyConfigRequest) -> Result<Option<UpdateKeyConfigResponse>> {
        self.validate_key_name(&request.name)?;

        let _guard = self.locks.acquire(&request.name).await;
        let path = self.key_path(&request.name);

        let mut attempt = 0u32;
        let mut backoff_ms = CAS_RETRY_INITIAL_BACKOFF_MS;

        loop {
            let (current, stamp) = self.load_versioned(&path).await?.ok_or_else(|| TransitError::KeyNotFound {
                name: request.name.clone(),
            })?;

            let plan = plan_key_config_update(&current, request.min_decryption_version, request.deletion_allowed)
                .map_err(|rejection| {
                    let err = Self::rejection_error(rejection);
                    warn!(name = %request.name, error = %err, "Rejected key config update");
                    err
                })?;

            if !plan.is_dirty {
                debug!(name = %request.name, "Key config unchanged, skipping persist");
                return Ok(None);
            }

            let mut policy = plan.policy;
            policy.updated_time_unix_ms = Self::now_unix_ms();
            let bytes = Self::encode(&policy)?;

            if self.backend.put_cas(&path, &bytes, Some(stamp)).await? {
                if plan.is_legacy_upgrade {
                    info!(name = %policy.name, "Upgraded legacy min decryption version to 1");
                }
                debug!(
                    mount = %self.config.mount,
                    name = %policy.name,
                    min_decryption_version = policy.min_decryption_version,
                    deletion_allowed = policy.deletion_allowed,
                    "Updated transit key config"
                );
                return Ok(Some(UpdateKeyConfigResponse {
                    warnings: plan.warnings,
                    policy,
                }));
            }

            attempt += 1;
            warn!(name = %request.name, attempt, "Key policy changed during update, retrying");
            if attempt >= self.config.max_cas_retries {
                return Err(TransitError::CasRetriesExhausted {
                    name: request.name,
                    attempts: attempt,
                });
            }
            tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            backoff_ms = (backoff_ms * 2).min(CAS_RETRY_MAX_BACKOFF_MS);
        }
    }

    async fn read_key_config(&self, name: &str) -> Result<Option<KeyPolicy>> {
        self.validate_key_name(name)?;
        let path = self.key_path(name);
        Ok(self.load_versioned(&path).await?.map(|(policy, _)| policy))
    }
}
