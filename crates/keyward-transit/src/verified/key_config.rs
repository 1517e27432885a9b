//! Pure planning of key configuration updates.
//!
//! Given the stored policy and the requested changes, compute the policy
//! that should be persisted (if any) without touching storage.

use crate::constants::FIRST_KEY_VERSION;
use crate::constants::MIN_DECRYPTION_VERSION_ZERO_WARNING;
use crate::policy::KeyPolicy;

/// Outcome of planning an update that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyConfigPlan {
    /// The policy with all requested changes applied.
    pub policy: KeyPolicy,
    /// Warnings for the caller.
    pub warnings: Vec<String>,
    /// Whether any field changed and the record must be persisted.
    pub is_dirty: bool,
    /// Whether the legacy sentinel was upgraded without being asked for.
    pub is_legacy_upgrade: bool,
}

/// Why a requested update was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyConfigRejection {
    /// The requested minimum decryption version was below zero.
    NegativeMinDecryptionVersion {
        /// The rejected value.
        requested: i64,
    },
    /// The requested minimum decryption version is past the latest version.
    MinDecryptionVersionTooHigh {
        /// The rejected value (after normalization).
        requested: i64,
        /// The key's latest version.
        latest: u32,
    },
}

/// Normalize a requested minimum decryption version.
///
/// Returns the effective value and whether a zero was forced up to the
/// first key version.
///
/// # Example
///
/// ```ignore
/// assert_eq!(normalize_min_decryption_version(0), Ok((1, true)));
/// assert_eq!(normalize_min_decryption_version(4), Ok((4, false)));
/// ```
#[inline]
pub fn normalize_min_decryption_version(requested: i64) -> Result<(i64, bool), KeyConfigRejection> {
    if requested < 0 {
        return Err(KeyConfigRejection::NegativeMinDecryptionVersion { requested });
    }
    if requested == 0 {
        return Ok((i64::from(FIRST_KEY_VERSION), true));
    }
    Ok((requested, false))
}

/// Plan a configuration update against the current policy.
///
/// Rules, applied in order:
///
/// 1. A negative version rejects the whole request, including any
///    deletion flag supplied alongside it.
/// 2. A zero version becomes 1 and adds one warning.
/// 3. A version that differs from the stored one must not exceed
///    `latest_version`.
/// 4. The deletion flag is applied when it differs.
/// 5. A stored legacy sentinel (0) is always upgraded to 1.
///
/// The plan is dirty iff at least one stored field changes.
pub fn plan_key_config_update(
    current: &KeyPolicy,
    min_decryption_version: Option<i64>,
    deletion_allowed: Option<bool>,
) -> Result<KeyConfigPlan, KeyConfigRejection> {
    let mut policy = current.clone();
    let mut warnings = Vec::new();
    let mut is_dirty = false;

    if let Some(requested) = min_decryption_version {
        let (version, was_zero) = normalize_min_decryption_version(requested)?;
        if was_zero {
            warnings.push(MIN_DECRYPTION_VERSION_ZERO_WARNING.to_string());
        }

        if version != i64::from(policy.min_decryption_version) {
            let latest = policy.latest_version;
            // Anything above u32::MAX is also above latest, so the conversion
            // only fails for values that are rejected anyway.
            let version = match u32::try_from(version) {
                Ok(v) if v <= latest => v,
                _ => {
                    return Err(KeyConfigRejection::MinDecryptionVersionTooHigh {
                        requested: version,
                        latest,
                    });
                }
            };
            policy.min_decryption_version = version;
            is_dirty = true;
        }
    }

    if let Some(allowed) = deletion_allowed
        && allowed != policy.deletion_allowed
    {
        policy.deletion_allowed = allowed;
        is_dirty = true;
    }

    let is_legacy_upgrade = policy.is_legacy();
    if is_legacy_upgrade {
        policy.min_decryption_version = FIRST_KEY_VERSION;
        is_dirty = true;
    }

    Ok(KeyConfigPlan {
        policy,
        warnings,
        is_dirty,
        is_legacy_upgrade,
    })
}
