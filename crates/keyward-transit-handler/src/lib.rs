//! Transit key configuration request handling for Keyward.
//!
//! Sits between the wire and [`keyward_transit`]:
//! - [`fields`]: converts loosely-typed request bodies into typed fields
//! - [`router`]: explicit routing table built at startup
//! - [`handler`]: executes requests and sanitizes errors for clients
//!
//! ```rust,ignore
//! use keyward_transit::{DefaultKeyPolicyStore, InMemoryPolicyBackend};
//! use keyward_transit_handler::{Method, TransitExecutor};
//!
//! let store = Arc::new(DefaultKeyPolicyStore::new(Arc::new(InMemoryPolicyBackend::new())));
//! let executor = TransitExecutor::new(store);
//! let response = executor
//!     .execute_path(Method::Update, "keys/payments/config", &json!({"min_decryption_version": 2}))
//!     .await?;
//! ```

pub mod fields;
pub mod handler;
pub mod router;
pub mod types;

pub use handler::TransitExecutor;
pub use handler::sanitize_transit_error;
pub use router::Method;
pub use router::Route;
pub use router::RouteTable;
pub use types::KeyConfigResultResponse;
pub use types::KeyConfigView;
pub use types::TransitRequest;
pub use types::TransitResponse;
