//! Key policy record and configuration request/response types.

use serde::Deserialize;
use serde::Serialize;

use crate::constants::FIRST_KEY_VERSION;

/// Persisted policy for one transit key.
///
/// Created by key creation and advanced by rotation; the configuration
/// updater only adjusts `min_decryption_version` and `deletion_allowed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPolicy {
    /// Key name.
    pub name: String,
    /// Highest version produced by rotation.
    pub latest_version: u32,
    /// Smallest version still accepted for decryption.
    ///
    /// 0 marks a record written before version numbering existed.
    pub min_decryption_version: u32,
    /// Whether the key may be deleted.
    pub deletion_allowed: bool,
    /// Unix timestamp when the key was created.
    pub created_time_unix_ms: u64,
    /// Unix timestamp of the last persisted configuration change.
    pub updated_time_unix_ms: u64,
}

impl KeyPolicy {
    /// Create the policy of a freshly generated key (version 1).
    pub fn new(name: impl Into<String>, created_time_unix_ms: u64) -> Self {
        Self {
            name: name.into(),
            latest_version: FIRST_KEY_VERSION,
            min_decryption_version: FIRST_KEY_VERSION,
            deletion_allowed: false,
            created_time_unix_ms,
            updated_time_unix_ms: created_time_unix_ms,
        }
    }

    /// Set the latest version.
    pub fn with_latest_version(mut self, latest_version: u32) -> Self {
        self.latest_version = latest_version;
        self
    }

    /// Set the minimum decryption version (0 builds a legacy record).
    pub fn with_min_decryption_version(mut self, version: u32) -> Self {
        self.min_decryption_version = version;
        self
    }

    /// Set whether deletion is allowed.
    pub fn with_deletion_allowed(mut self, allowed: bool) -> Self {
        self.deletion_allowed = allowed;
        self
    }

    /// Whether this record still carries the pre-versioning sentinel.
    pub fn is_legacy(&self) -> bool {
        self.min_decryption_version == 0
    }

    /// Check if a version is inside the decryption window.
    pub fn can_decrypt_version(&self, version: u32) -> bool {
        version >= self.min_decryption_version.max(FIRST_KEY_VERSION) && version <= self.latest_version
    }
}

/// Request to update key configuration.
///
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateKeyConfigRequest {
    /// Key name.
    pub name: String,
    /// Requested minimum decryption version (any sign; validated by the updater).
    pub min_decryption_version: Option<i64>,
    /// Requested deletion flag.
    pub deletion_allowed: Option<bool>,
}

impl UpdateKeyConfigRequest {
    /// Create a request that changes nothing.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set minimum decryption version.
    pub fn with_min_decryption_version(mut self, version: i64) -> Self {
        self.min_decryption_version = Some(version);
        self
    }

    /// Set deletion allowed.
    pub fn with_deletion_allowed(mut self, allowed: bool) -> Self {
        self.deletion_allowed = Some(allowed);
        self
    }
}

/// Response from a configuration update that persisted a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateKeyConfigResponse {
    /// Human-readable warnings for the caller.
    pub warnings: Vec<String>,
    /// The policy as persisted.
    pub policy: KeyPolicy,
}
