//! Wire types for transit key configuration requests.

use keyward_transit::KeyPolicy;
use serde::Deserialize;
use serde::Serialize;

/// A transit request addressed by operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitRequest {
    /// Update a key's configuration.
    TransitUpdateKeyConfig {
        /// Key name.
        name: String,
        /// New minimum decryption version.
        min_decryption_version: Option<i64>,
        /// New deletion flag.
        deletion_allowed: Option<bool>,
    },
    /// Read a key's configuration.
    TransitReadKeyConfig {
        /// Key name.
        name: String,
    },
}

impl TransitRequest {
    /// Operation name this request dispatches to.
    pub fn operation(&self) -> &'static str {
        match self {
            TransitRequest::TransitUpdateKeyConfig { .. } => "TransitUpdateKeyConfig",
            TransitRequest::TransitReadKeyConfig { .. } => "TransitReadKeyConfig",
        }
    }
}

/// Response to a transit request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitResponse {
    /// The request succeeded without changing anything.
    NoContent,
    /// Result of a key configuration read or update.
    KeyConfigResult(KeyConfigResultResponse),
}

/// Client view of a key policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyConfigView {
    /// Key name.
    pub name: String,
    /// Latest rotated version.
    pub latest_version: u32,
    /// Minimum version accepted for decryption.
    pub min_decryption_version: u32,
    /// Whether the key may be deleted.
    pub deletion_allowed: bool,
}

impl From<&KeyPolicy> for KeyConfigView {
    fn from(policy: &KeyPolicy) -> Self {
        Self {
            name: policy.name.clone(),
            latest_version: policy.latest_version,
            min_decryption_version: policy.min_decryption_version,
            deletion_allowed: policy.deletion_allowed,
        }
    }
}

/// Outcome of a key configuration operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyConfigResultResponse {
    /// Whether the operation succeeded.
    pub is_success: bool,
    /// Warnings for the caller.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// The key configuration after the operation.
    pub config: Option<KeyConfigView>,
    /// Client-facing error message.
    pub error: Option<String>,
    /// Whether the error was a bad request rather than a server fault.
    #[serde(default)]
    pub is_invalid_request: bool,
}

impl KeyConfigResultResponse {
    /// Successful result.
    pub fn success(config: KeyConfigView, warnings: Vec<String>) -> Self {
        Self {
            is_success: true,
            warnings,
            config: Some(config),
            error: None,
            is_invalid_request: false,
        }
    }

    /// Failed result.
    pub fn failure(error: String, is_invalid_request: bool) -> Self {
        Self {
            is_success: false,
            warnings: Vec::new(),
            config: None,
            error: Some(error),
            is_invalid_request,
        }
    }
}
