//! Configuration for the transit key policy engine.
//!
//! Supports configuration via TOML with validation.

use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_TRANSIT_MOUNT;
use crate::constants::MAX_CAS_RETRIES;
use crate::constants::MAX_CAS_RETRIES_LIMIT;
use crate::constants::MAX_KEY_NAME_LENGTH;
use crate::constants::MAX_MOUNT_NAME_LENGTH;
use crate::error::InvalidConfigSnafu;
use crate::error::Result;

/// Transit engine configuration.
///
/// # Example TOML
///
/// ```toml
/// mount = "transit"
/// max_cas_retries = 5
/// max_key_name_length = 128
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitConfig {
    /// Mount point; prefixes every storage path of this engine.
    #[serde(default = "default_mount")]
    pub mount: String,

    /// Optimistic write attempts before an update gives up.
    #[serde(default = "default_max_cas_retries")]
    pub max_cas_retries: u32,

    /// Longest accepted key name in bytes.
    #[serde(default = "default_max_key_name_length")]
    pub max_key_name_length: usize,
}

fn default_mount() -> String {
    DEFAULT_TRANSIT_MOUNT.into()
}

fn default_max_cas_retries() -> u32 {
    MAX_CAS_RETRIES
}

fn default_max_key_name_length() -> usize {
    MAX_KEY_NAME_LENGTH
}

impl Default for TransitConfig {
    fn default() -> Self {
        Self {
            mount: default_mount(),
            max_cas_retries: default_max_cas_retries(),
            max_key_name_length: default_max_key_name_length(),
        }
    }
}

impl TransitConfig {
    /// Create a config for the given mount with default limits.
    pub fn with_mount(mount: impl Into<String>) -> Self {
        Self {
            mount: mount.into(),
            ..Default::default()
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: TransitConfig = toml::from_str(contents).map_err(|e| {
            InvalidConfigSnafu {
                reason: e.to_string(),
            }
            .build()
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.mount.is_empty() || self.mount.len() > MAX_MOUNT_NAME_LENGTH {
            return InvalidConfigSnafu {
                reason: format!("mount must be 1..={MAX_MOUNT_NAME_LENGTH} bytes, got {}", self.mount.len()),
            }
            .fail();
        }
        if self.mount.contains('/') {
            return InvalidConfigSnafu {
                reason: format!("mount '{}' must not contain '/'", self.mount),
            }
            .fail();
        }
        if self.max_cas_retries == 0 || self.max_cas_retries > MAX_CAS_RETRIES_LIMIT {
            return InvalidConfigSnafu {
                reason: format!(
                    "max_cas_retries must be 1..={MAX_CAS_RETRIES_LIMIT}, got {}",
                    self.max_cas_retries
                ),
            }
            .fail();
        }
        if self.max_key_name_length == 0 || self.max_key_name_length > MAX_KEY_NAME_LENGTH {
            return InvalidConfigSnafu {
                reason: format!(
                    "max_key_name_length must be 1..={MAX_KEY_NAME_LENGTH}, got {}",
                    self.max_key_name_length
                ),
            }
            .fail();
        }
        Ok(())
    }
}
