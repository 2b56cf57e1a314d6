//! Device gate core library
//!
//! Transport-agnostic decision logic for the device metadata gate:
//!
//! - [`HeaderSet`]: case-insensitive multi-valued header map for one call
//! - [`RULES`]: the fixed, ordered table of required headers
//! - [`MetadataValidator`]: evaluates every rule and aggregates [`Violation`]s
//!
//! Nothing here performs I/O; adapters for a concrete RPC stack live in the
//! `device-gate` crate.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod headers;
mod rule;
mod validator;
mod violation;

pub use headers::HeaderSet;
pub use rule::{RULES, RequiredHeader, Requirement, ValidationRule};
pub use validator::{MetadataValidator, SharedSecret};
pub use violation::{Violation, ViolationKind};

/// Errors raised while constructing gate primitives
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The shared access-token secret was empty
    #[error("access-token secret must not be empty")]
    EmptySecret,
}
