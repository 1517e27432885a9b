//! Error types for the transit key policy engine.
//!
//! Uses snafu for structured errors. Every variant maps onto one of three
//! client-facing kinds (see [`ErrorKind`]): validation failures are reported
//! as invalid requests and never reach storage, while storage failures are
//! opaque internal errors.

use snafu::Snafu;

/// Result type for transit operations.
pub type Result<T, E = TransitError> = std::result::Result<T, E>;

/// Errors from transit key policy operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum TransitError {
    /// No policy record exists for the key.
    #[snafu(display("no existing key named {name} could be found"))]
    KeyNotFound {
        /// Requested key name.
        name: String,
    },

    /// A policy record already exists for the key.
    #[snafu(display("key {name} already exists"))]
    KeyAlreadyExists {
        /// Requested key name.
        name: String,
    },

    /// Key name failed validation.
    #[snafu(display("invalid key name '{name}': {reason}"))]
    InvalidKeyName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Requested minimum decryption version was negative.
    #[snafu(display("min decryption version cannot be negative"))]
    NegativeMinDecryptionVersion {
        /// The rejected value.
        requested: i64,
    },

    /// Requested minimum decryption version is past the rotation frontier.
    #[snafu(display("cannot set min decryption version of {requested}, latest key version is {latest}"))]
    MinDecryptionVersionTooHigh {
        /// The rejected value.
        requested: i64,
        /// The key's latest version.
        latest: u32,
    },

    /// A request field had the wrong type or shape.
    #[snafu(display("invalid field '{field}': {reason}"))]
    InvalidField {
        /// Field name.
        field: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The storage backend failed.
    #[snafu(display("storage error: {reason}"))]
    Storage {
        /// Backend error message.
        reason: String,
    },

    /// A record could not be encoded.
    #[snafu(display("serialization error: {reason}"))]
    Serialization {
        /// Encoder error message.
        reason: String,
    },

    /// A stored record could not be decoded.
    #[snafu(display("corrupted record at '{path}': {reason}"))]
    CorruptedRecord {
        /// Storage path of the record.
        path: String,
        /// Decoder error message.
        reason: String,
    },

    /// Concurrent writers kept winning the optimistic write.
    #[snafu(display("gave up updating key {name} after {attempts} conflicting writes"))]
    CasRetriesExhausted {
        /// Key name.
        name: String,
        /// Number of attempts made.
        attempts: u32,
    },

    /// Engine configuration is invalid.
    #[snafu(display("invalid transit config: {reason}"))]
    InvalidConfig {
        /// What was wrong.
        reason: String,
    },
}

/// Client-facing classification of a [`TransitError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The referenced key has no policy record.
    NotFound,
    /// The request carried an unacceptable value.
    InvalidArgument,
    /// Storage or encoding failed; the caller may retry the whole request.
    Internal,
}

impl TransitError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransitError::KeyNotFound { .. } => ErrorKind::NotFound,
            TransitError::KeyAlreadyExists { .. }
            | TransitError::InvalidKeyName { .. }
            | TransitError::NegativeMinDecryptionVersion { .. }
            | TransitError::MinDecryptionVersionTooHigh { .. }
            | TransitError::InvalidField { .. } => ErrorKind::InvalidArgument,
            TransitError::Storage { .. }
            | TransitError::Serialization { .. }
            | TransitError::CorruptedRecord { .. }
            | TransitError::CasRetriesExhausted { .. }
            | TransitError::InvalidConfig { .. } => ErrorKind::Internal,
        }
    }

    /// Whether this error should be reported to the client as an invalid request.
    pub fn is_invalid_request(&self) -> bool {
        matches!(self.kind(), ErrorKind::NotFound | ErrorKind::InvalidArgument)
    }
}
