//! Transit key policies.
//!
//! A key policy records the versioning state of one transit key. This module
//! owns configuration updates of that record:
//! - Narrowing or widening the decryption window (`min_decryption_version`)
//! - Toggling whether the key may be deleted
//! - Upgrading records written before version numbering existed
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use keyward_transit::policy::{DefaultKeyPolicyStore, KeyPolicyStore, UpdateKeyConfigRequest};
//! use keyward_transit::backend::InMemoryPolicyBackend;
//! use std::sync::Arc;
//!
//! let store = DefaultKeyPolicyStore::new(Arc::new(InMemoryPolicyBackend::new()));
//!
//! let request = UpdateKeyConfigRequest::new("payments").with_min_decryption_version(3);
//! match store.update_key_config(request).await? {
//!     Some(resp) => println!("updated, warnings: {:?}", resp.warnings),
//!     None => println!("nothing to change"),
//! }
//! ```

pub mod locks;
mod store;
mod types;

pub use locks::KeyLocks;
pub use store::DefaultKeyPolicyStore;
pub use store::KeyPolicyStore;
pub use types::KeyPolicy;
pub use types::UpdateKeyConfigRequest;
pub use types::UpdateKeyConfigResponse;
