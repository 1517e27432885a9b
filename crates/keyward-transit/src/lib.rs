//! Transit key policy engine for Keyward.
//!
//! Each transit key carries a policy record: its latest rotated version, the
//! smallest version still accepted for decryption, and whether it may be
//! deleted. This crate implements the configuration updater for that record.
//!
//! - [`policy`]: record types and the [`KeyPolicyStore`] updater
//! - [`verified`]: pure validation and planning of updates
//! - [`backend`]: storage collaborator trait and an in-memory backend
//! - [`config`]: TOML-loadable engine configuration
//!
//! Updates to one key are serialized in-process and written with a
//! versioned compare-and-swap, so concurrent administrators never silently
//! overwrite each other.

pub mod backend;
pub mod config;
pub mod constants;
pub mod error;
pub mod policy;
pub mod verified;

pub use backend::InMemoryPolicyBackend;
pub use backend::PolicyBackend;
pub use config::TransitConfig;
pub use error::ErrorKind;
pub use error::Result;
pub use error::TransitError;
pub use policy::DefaultKeyPolicyStore;
pub use policy::KeyPolicy;
pub use policy::KeyPolicyStore;
pub use policy::UpdateKeyConfigRequest;
pub use policy::UpdateKeyConfigResponse;
