//! Mapping broker results onto HTTP status codes and JSON bodies.

use serde::Serialize;

use crate::correlation::CorrelationId;
use crate::error::BrokerError;
use crate::provider::ProviderResult;

/// JSON body returned for a failed request.
///
/// `message` is the error's `Display` output, which never carries
/// credential material. Policy reason and policy id are only present for
/// authorization denials.
///
/// # Examples
///
/// ```
/// use credential_broker::web::ErrorResponse;
/// use credential_broker::{AuthorizationError, BrokerError, CorrelationId};
///
/// let err = BrokerError::from(AuthorizationError::Denied {
///     reason: Some("not a member".into()),
///     policy_id: Some("tenant-isolation".into()),
/// });
/// let body = ErrorResponse::from_error(&err, &CorrelationId::new("corr-1"));
///
/// assert_eq!(body.status(), 401);
/// let json = serde_json::to_value(&body).unwrap();
/// assert_eq!(json["error"], "unauthorized");
/// assert_eq!(json["policy_id"], "tenant-isolation");
/// assert_eq!(json["correlation_id"], "corr-1");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    #[serde(skip)]
    status: u16,
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    policy_id: Option<String>,
    correlation_id: CorrelationId,
}

impl ErrorResponse {
    /// Builds the body for `error`.
    pub fn from_error(error: &BrokerError, correlation_id: &CorrelationId) -> Self {
        let (reason, policy_id) = match error {
            BrokerError::Authorization(e) => (
                e.reason().map(str::to_string),
                e.policy_id().map(str::to_string),
            ),
            _ => (None, None),
        };

        Self {
            status: error.http_status(),
            error: error.code(),
            message: error.to_string(),
            reason,
            policy_id,
            correlation_id: correlation_id.clone(),
        }
    }

    /// HTTP status for this body.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        self.error
    }
}

/// Body of an HTTP response, success or failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    /// The operation reached the provider.
    Result(ProviderResult),
    /// The broker stopped the request.
    Error(ErrorResponse),
}

/// Turns the outcome of `execute_operation` into `(status, body)`.
///
/// A provider result keeps its own status, including non-2xx provider
/// answers.
pub fn respond(
    result: Result<ProviderResult, BrokerError>,
    correlation_id: &CorrelationId,
) -> (u16, ResponseBody) {
    match result {
        Ok(result) => (result.status, ResponseBody::Result(result)),
        Err(error) => {
            let body = ErrorResponse::from_error(&error, correlation_id);
            (body.status(), ResponseBody::Error(body))
        }
    }
}
