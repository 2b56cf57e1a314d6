//! tonic adapters for the metadata gate
//!
//! One [`MetadataValidator`] decision, exposed three ways:
//!
//! - [`UnaryGate`] wraps a single-request/single-response handler
//! - [`StreamGate`] wraps a streaming handler, validating once at stream open
//! - [`MetadataInterceptor`] plugs into generated `*Server::with_interceptor`
//!
//! All of them reject with the same aggregated [`RejectionError`] status and
//! otherwise leave the call untouched.

mod interceptor;
mod metadata;
mod rejection;
mod stream;
mod unary;

use std::fmt;

use gate_core::MetadataValidator;
use tonic::metadata::MetadataMap;
use tonic::{Extensions, GrpcMethod, Status};
use tracing::{debug, warn};

pub use interceptor::MetadataInterceptor;
pub use metadata::header_set;
pub use rejection::{
    ERROR_DOMAIN, ERROR_INFO_TYPE_URL, ErrorInfo, RejectionError, RpcStatus,
    UNAUTHENTICATED_MESSAGE,
};
pub use stream::{ForwardedStream, StreamGate};
pub use unary::UnaryGate;

/// Call shape, for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallShape {
    Unary,
    Stream,
    Intercepted,
}

impl fmt::Display for CallShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unary => f.write_str("unary"),
            Self::Stream => f.write_str("stream"),
            Self::Intercepted => f.write_str("intercepted"),
        }
    }
}

/// Run the shared admission decision for one call.
///
/// Returns the aggregated rejection status when any rule fails.
pub(crate) fn admit(
    validator: &MetadataValidator,
    metadata: &MetadataMap,
    extensions: &Extensions,
    shape: CallShape,
) -> Result<(), Status> {
    let headers = header_set(metadata);
    let path = method_path(extensions);

    match validator.validate(&headers) {
        Ok(()) => {
            debug!(path = %path, shape = %shape, "Metadata accepted");
            Ok(())
        }
        Err(violations) => {
            let rejection = RejectionError::new(violations);
            warn!(
                path = %path,
                shape = %shape,
                violations = rejection.violations().len(),
                reasons = ?rejection.reasons(),
                "Rejected call with invalid metadata"
            );
            Err(rejection.into_status())
        }
    }
}

/// `/service/method` of the call, or `unknown`.
///
/// tonic only inserts [`GrpcMethod`] from generated client code. A server
/// receiving calls over the wire sees it only if a layer in front of the
/// gate inserts it from the request URI; otherwise the path logs as
/// `unknown`.
fn method_path(extensions: &Extensions) -> String {
    extensions
        .get::<GrpcMethod<'static>>()
        .map_or_else(
            || "unknown".to_string(),
            |m| format!("/{}/{}", m.service(), m.method()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_path_from_grpc_method() {
        let mut extensions = Extensions::new();
        extensions.insert(GrpcMethod::new("device.v1.Registry", "Enroll"));
        assert_eq!(method_path(&extensions), "/device.v1.Registry/Enroll");
    }

    #[test]
    fn test_method_path_unknown_without_grpc_method() {
        assert_eq!(method_path(&Extensions::new()), "unknown");
    }

    #[test]
    fn test_call_shape_display() {
        assert_eq!(CallShape::Unary.to_string(), "unary");
        assert_eq!(CallShape::Stream.to_string(), "stream");
        assert_eq!(CallShape::Intercepted.to_string(), "intercepted");
    }
}
