//! Extraction boundary traits.

use crate::config::BrokerConfig;
use crate::error::RequestError;
use crate::request::OperationRequest;

use super::TaintedInputs;

/// Collects every untrusted input of a request as [`Tainted`](crate::Tainted).
///
/// Implementations must not sanitize or interpret anything; that happens in
/// [`ExtractOperationRequest`].
pub trait ExtractTaintedInputs {
    /// Returns the request's headers and body, all tainted.
    fn extract_tainted_inputs(&self) -> TaintedInputs;
}

/// Turns a framework request into a validated [`OperationRequest`].
///
/// This trait does NOT authorize anything. It checks shape only: identifiers
/// are well-formed, the operation type is supported, and the payload decodes.
///
/// # Examples
///
/// ```
/// use credential_broker::web::{
///     ExtractOperationRequest, ExtractTaintedInputs, RequestAdapter, TaintedInputs,
/// };
/// use credential_broker::BrokerConfig;
///
/// struct MyFrameworkRequest {
///     tenant: String,
///     user: String,
///     body: serde_json::Value,
/// }
///
/// impl ExtractTaintedInputs for MyFrameworkRequest {
///     fn extract_tainted_inputs(&self) -> TaintedInputs {
///         RequestAdapter::new()
///             .with_header("x-tenant-id", &self.tenant)
///             .with_header("x-user-id", &self.user)
///             .with_body(self.body.clone())
///             .extract_tainted_inputs()
///     }
/// }
///
/// let req = MyFrameworkRequest {
///     tenant: "tenant-1".into(),
///     user: "user-1".into(),
///     body: serde_json::json!({
///         "provider": "supabase",
///         "operation": { "type": "query", "payload": { "table": "docs" } }
///     }),
/// };
/// let request = req.extract_request(&BrokerConfig::default()).unwrap();
/// assert_eq!(request.provider().as_str(), "supabase");
/// ```
pub trait ExtractOperationRequest: ExtractTaintedInputs {
    /// Sanitizes the tainted inputs into an [`OperationRequest`].
    ///
    /// # Errors
    ///
    /// - [`RequestError::InvalidField`] for missing or malformed headers and
    ///   body fields
    /// - [`RequestError::UnsupportedOperation`] for unknown operation types
    /// - [`RequestError::InvalidPayload`] for payloads that do not decode
    fn extract_request(&self, config: &BrokerConfig) -> Result<OperationRequest, RequestError> {
        self.extract_tainted_inputs().into_request(config)
    }
}

impl<T: ExtractTaintedInputs> ExtractOperationRequest for T {}
