//! Aggregated rejection status
//!
//! A rejected call gets one `UNAUTHENTICATED` status. Its binary details
//! carry a `google.rpc.Status` with one `google.rpc.ErrorInfo` per
//! violation, so clients using the standard rich-error model can list every
//! problem at once.

use std::collections::HashMap;

use bytes::Bytes;
use gate_core::Violation;
use prost::Message;
use prost_types::Any;
use tonic::{Code, Status};

/// Outer message of every rejection
pub const UNAUTHENTICATED_MESSAGE: &str = "caller is not authenticated";

/// `ErrorInfo.domain` set on every detail entry
pub const ERROR_DOMAIN: &str = "device-gate";

/// Type URL of packed `ErrorInfo` details
pub const ERROR_INFO_TYPE_URL: &str = "type.googleapis.com/google.rpc.ErrorInfo";

/// `google.rpc.ErrorInfo`
#[derive(Clone, PartialEq, Message)]
pub struct ErrorInfo {
    /// Violation reason, e.g. `"device-id metadata missing"`
    #[prost(string, tag = "1")]
    pub reason: String,
    /// Error domain
    #[prost(string, tag = "2")]
    pub domain: String,
    /// Extra context; carries the failing `header`
    #[prost(map = "string, string", tag = "3")]
    pub metadata: HashMap<String, String>,
}

/// `google.rpc.Status`
#[derive(Clone, PartialEq, Message)]
pub struct RpcStatus {
    /// `google.rpc.Code` value
    #[prost(int32, tag = "1")]
    pub code: i32,
    /// Developer-facing message
    #[prost(string, tag = "2")]
    pub message: String,
    /// Packed detail messages
    #[prost(message, repeated, tag = "3")]
    pub details: Vec<Any>,
}

/// Every violation found for one call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("caller is not authenticated: {} metadata violation(s)", .violations.len())]
pub struct RejectionError {
    violations: Vec<Violation>,
}

impl RejectionError {
    /// Wrap the violations found by the validator, in rule order
    #[must_use]
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Violations in rule order
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Reason strings in rule order
    #[must_use]
    pub fn reasons(&self) -> Vec<String> {
        self.violations.iter().map(Violation::reason).collect()
    }

    /// Encode as an `UNAUTHENTICATED` status with one `ErrorInfo` per violation
    #[must_use]
    pub fn into_status(self) -> Status {
        let details = self
            .violations
            .iter()
            .map(|violation| {
                let info = ErrorInfo {
                    reason: violation.reason(),
                    domain: ERROR_DOMAIN.to_string(),
                    metadata: HashMap::from([(
                        "header".to_string(),
                        violation.header.name().to_string(),
                    )]),
                };
                Any {
                    type_url: ERROR_INFO_TYPE_URL.to_string(),
                    value: info.encode_to_vec(),
                }
            })
            .collect();

        let rpc_status = RpcStatus {
            code: Code::Unauthenticated as i32,
            message: UNAUTHENTICATED_MESSAGE.to_string(),
            details,
        };

        Status::with_details(
            Code::Unauthenticated,
            UNAUTHENTICATED_MESSAGE,
            Bytes::from(rpc_status.encode_to_vec()),
        )
    }

    /// Decode the `ErrorInfo` details of a status produced by
    /// [`into_status`](Self::into_status).
    ///
    /// Returns `None` for statuses that are not gate rejections.
    #[must_use]
    pub fn details_from_status(status: &Status) -> Option<Vec<ErrorInfo>> {
        if status.code() != Code::Unauthenticated || status.details().is_empty() {
            return None;
        }

        let rpc_status = RpcStatus::decode(status.details()).ok()?;
        let mut details = Vec::with_capacity(rpc_status.details.len());
        for any in rpc_status
            .details
            .iter()
            .filter(|any| any.type_url == ERROR_INFO_TYPE_URL)
        {
            let info = ErrorInfo::decode(any.value.as_slice()).ok()?;
            if info.domain == ERROR_DOMAIN {
                details.push(info);
            }
        }

        (!details.is_empty()).then_some(details)
    }

    /// Reason strings carried by a rejection status, in rule order
    #[must_use]
    pub fn reasons_from_status(status: &Status) -> Option<Vec<String>> {
        Self::details_from_status(status)
            .map(|details| details.into_iter().map(|info| info.reason).collect())
    }
}

impl From<RejectionError> for Status {
    fn from(rejection: RejectionError) -> Self {
        rejection.into_status()
    }
}
