//! Pure functions for key policy configuration.
//!
//! Functional core of the transit engine: everything here is deterministic,
//! performs no I/O, and takes the current record as an explicit parameter.
//! The imperative shell in [`crate::policy::store`] loads the record, calls
//! into this module, and persists whatever plan comes back.
//!
//! - [`key_config`]: validation and normalization of configuration updates
//! - [`key_name`]: key name rules
//!
//! # Tiger Style
//!
//! - Checked conversions between signed request values and stored versions
//! - No panics on any input

pub mod key_config;
pub mod key_name;
