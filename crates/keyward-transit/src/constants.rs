//! Constants for the transit key policy engine.
//!
//! Tiger Style: every bound is fixed at compile time and checked by the
//! assertions at the bottom of this file.

/// Default mount point for the transit engine.
pub const DEFAULT_TRANSIT_MOUNT: &str = "transit";

/// Maximum length of a mount name in bytes.
pub const MAX_MOUNT_NAME_LENGTH: usize = 64;

/// Maximum length of a transit key name in bytes.
pub const MAX_KEY_NAME_LENGTH: usize = 128;

/// Storage path segment under which key policy records live.
pub const KEY_POLICY_PATH_SEGMENT: &str = "keys";

/// Lowest normalized minimum decryption version.
///
/// Stored records carrying 0 predate version numbering and are upgraded to
/// this value the next time they are configured.
pub const FIRST_KEY_VERSION: u32 = 1;

/// Warning returned when a caller asks for a minimum decryption version of 0.
pub const MIN_DECRYPTION_VERSION_ZERO_WARNING: &str =
    "key version numbering starts at 1; forcing minimum decryption version to 1";

// ============================================================================
// CAS retries
// ============================================================================

/// Default number of optimistic write attempts before giving up.
pub const MAX_CAS_RETRIES: u32 = 5;

/// Upper bound accepted for `TransitConfig::max_cas_retries`.
pub const MAX_CAS_RETRIES_LIMIT: u32 = 100;

/// Initial backoff after a CAS conflict.
pub const CAS_RETRY_INITIAL_BACKOFF_MS: u64 = 5;

/// Maximum backoff between CAS attempts.
pub const CAS_RETRY_MAX_BACKOFF_MS: u64 = 200;

// ============================================================================
// Key locks
// ============================================================================

/// Number of tracked per-key locks above which idle entries are pruned.
pub const MAX_TRACKED_KEY_LOCKS: usize = 1024;

// ============================================================================
// Compile-time assertions
// ============================================================================

const _: () = assert!(MAX_KEY_NAME_LENGTH > 0);
const _: () = assert!(MAX_MOUNT_NAME_LENGTH > 0);
const _: () = assert!(FIRST_KEY_VERSION == 1);

const _: () = assert!(MAX_CAS_RETRIES > 0);
const _: () = assert!(MAX_CAS_RETRIES <= MAX_CAS_RETRIES_LIMIT);
const _: () = assert!(CAS_RETRY_INITIAL_BACKOFF_MS > 0);
const _: () = assert!(CAS_RETRY_INITIAL_BACKOFF_MS <= CAS_RETRY_MAX_BACKOFF_MS);

const _: () = assert!(MAX_TRACKED_KEY_LOCKS > 0);
