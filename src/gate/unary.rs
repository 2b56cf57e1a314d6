//! Gate for single-request/single-response calls

use std::future::Future;
use std::sync::Arc;

use gate_core::MetadataValidator;
use tonic::{Request, Response, Status};

use super::{CallShape, admit};

/// Validates a unary call's metadata before handing it to the next handler.
///
/// ```ignore
/// async fn get_profile(
///     &self,
///     request: Request<GetProfileRequest>,
/// ) -> Result<Response<Profile>, Status> {
///     self.gate.call(request, |req| self.inner.get_profile(req)).await
/// }
/// ```
#[derive(Debug, Clone)]
pub struct UnaryGate {
    validator: Arc<MetadataValidator>,
}

impl UnaryGate {
    /// Create a gate sharing `validator`
    #[must_use]
    pub fn new(validator: Arc<MetadataValidator>) -> Self {
        Self { validator }
    }

    /// Validate `request`, then run `next` with it.
    ///
    /// On rejection `next` is never invoked and the aggregated
    /// `UNAUTHENTICATED` status is returned. Otherwise the handler's result
    /// is returned as-is.
    pub async fn call<Req, Resp, F, Fut>(
        &self,
        request: Request<Req>,
        next: F,
    ) -> Result<Response<Resp>, Status>
    where
        F: FnOnce(Request<Req>) -> Fut,
        Fut: Future<Output = Result<Response<Resp>, Status>>,
    {
        admit(
            &self.validator,
            request.metadata(),
            request.extensions(),
            CallShape::Unary,
        )?;
        next(request).await
    }
}
