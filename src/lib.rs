//! Device Gate Library
//!
//! Request-admission gate for gRPC services: every call must carry the
//! client-identity and device-context metadata (`device-id`, `access-token`,
//! `platform`, `system-version`, `model`) before it reaches business logic.
//!
//! # Features
//!
//! - **Full aggregation**: every failing header is reported, not just the first
//! - **Rich errors**: one `UNAUTHENTICATED` status with a `google.rpc.ErrorInfo`
//!   detail per violation
//! - **Both call shapes**: [`gate::UnaryGate`], [`gate::StreamGate`], and a
//!   [`gate::MetadataInterceptor`] for generated tonic servers
//! - **Transparent accept path**: handler responses and errors pass through untouched

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod check;
pub mod cli;
pub mod config;
pub mod error;
pub mod gate;

pub use error::{Error, Result};
pub use gate_core::{HeaderSet, MetadataValidator, RULES, SharedSecret, Violation};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Setup tracing/logging
pub fn setup_tracing(level: &str, format: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    let initialized = match format {
        Some("json") => subscriber.with(fmt::layer().json()).try_init(),
        _ => subscriber.with(fmt::layer()).try_init(),
    };

    initialized.map_err(|e| Error::Internal(format!("tracing already initialized: {e}")))
}
