//! Interceptor form of the gate

use std::sync::Arc;

use gate_core::MetadataValidator;
use tonic::service::Interceptor;
use tonic::{Request, Status};

use super::{CallShape, admit};

/// Applies the gate to every call of a generated tonic service:
///
/// ```ignore
/// Server::builder()
///     .add_service(DeviceServer::with_interceptor(service, MetadataInterceptor::new(validator)))
/// ```
///
/// Interceptors run once when a call opens, so unary and streaming methods
/// are both validated exactly once.
#[derive(Debug, Clone)]
pub struct MetadataInterceptor {
    validator: Arc<MetadataValidator>,
}

impl MetadataInterceptor {
    /// Create an interceptor sharing `validator`
    #[must_use]
    pub fn new(validator: Arc<MetadataValidator>) -> Self {
        Self { validator }
    }
}

impl Interceptor for MetadataInterceptor {
    fn call(&mut self, request: Request<()>) -> Result<Request<()>, Status> {
        admit(
            &self.validator,
            request.metadata(),
            request.extensions(),
            CallShape::Intercepted,
        )?;
        Ok(request)
    }
}
