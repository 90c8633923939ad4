//! Request adapter for mapping HTTP requests to broker requests.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::config::BrokerConfig;
use crate::correlation::{CorrelationId, CORRELATION_HEADER};
use crate::error::RequestError;
use crate::operation::Operation;
use crate::request::OperationRequest;
use crate::sanitizer::{IdentifierSanitizer, Sanitizer, StringSanitizer};
use crate::Tainted;

use super::{ExtractTaintedInputs, TENANT_HEADER, USER_HEADER};

/// Framework-neutral view of one HTTP request.
///
/// Holds owned headers and the JSON body. Header names are matched
/// case-insensitively. Framework integrations typically build one with
/// `From<TheirRequest>`.
///
/// Expected body:
///
/// ```json
/// {
///   "provider": "supabase",
///   "operation": { "type": "create_table", "payload": { "name": "docs" } },
///   "token_ref": "optional"
/// }
/// ```
///
/// # Examples
///
/// ```
/// use credential_broker::web::{ExtractOperationRequest, RequestAdapter};
/// use credential_broker::BrokerConfig;
/// use serde_json::json;
///
/// let adapter = RequestAdapter::new()
///     .with_header("X-Tenant-Id", "tenant-1")
///     .with_header("X-User-Id", "user-1")
///     .with_header("X-Correlation-Id", "corr-42")
///     .with_body(json!({
///         "provider": "supabase",
///         "operation": { "type": "create_table", "payload": { "name": "docs" } }
///     }));
///
/// let request = adapter.extract_request(&BrokerConfig::default()).unwrap();
/// assert_eq!(request.tenant_id().as_str(), "tenant-1");
/// assert_eq!(request.correlation_id().as_str(), "corr-42");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestAdapter {
    headers: HashMap<String, String>,
    body: Value,
}

impl RequestAdapter {
    /// Empty adapter: no headers, `null` body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an adapter from header pairs and a body.
    pub fn from_parts<I, K, V>(headers: I, body: Value) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        headers
            .into_iter()
            .fold(Self::new(), |adapter, (k, v)| adapter.with_header(k, v))
            .with_body(body)
    }

    /// Adds a header, replacing any previous value for the same name.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.add_header(name, value);
        self
    }

    /// Adds a header in place.
    pub fn add_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Sets the JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// Raw header value, if present.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

impl ExtractTaintedInputs for RequestAdapter {
    fn extract_tainted_inputs(&self) -> TaintedInputs {
        TaintedInputs {
            headers: self
                .headers
                .iter()
                .map(|(k, v)| (k.clone(), Tainted::new(v.clone())))
                .collect(),
            body: Tainted::new(self.body.clone()),
        }
    }
}

/// Untrusted headers and body of one request.
///
/// Read-only; the only way to use the values is
/// [`extract_request`](super::ExtractOperationRequest::extract_request).
#[derive(Debug, Clone)]
pub struct TaintedInputs {
    headers: HashMap<String, Tainted<String>>,
    body: Tainted<Value>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct WireBody {
    provider: String,
    operation: WireOperation,
    #[serde(default)]
    token_ref: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct WireOperation {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Option<Value>,
}

fn identifier(
    sanitizer: &IdentifierSanitizer,
    field: &'static str,
    value: Option<Tainted<String>>,
) -> Result<String, RequestError> {
    let value = value.ok_or_else(|| RequestError::InvalidField {
        field,
        message: "is required".to_string(),
    })?;
    sanitizer
        .sanitize(value)
        .map(|v| v.into_inner())
        .map_err(|e| RequestError::InvalidField {
            field,
            message: e.to_string(),
        })
}

impl TaintedInputs {
    /// Names of the headers present, lower-cased and sorted.
    pub fn header_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.headers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Sanitizes everything into an [`OperationRequest`].
    pub(crate) fn into_request(
        mut self,
        config: &BrokerConfig,
    ) -> Result<OperationRequest, RequestError> {
        let ids = IdentifierSanitizer::new(config.max_identifier_len);

        let tenant_id = identifier(&ids, TENANT_HEADER, self.headers.remove(TENANT_HEADER))?;
        let user_id = identifier(&ids, USER_HEADER, self.headers.remove(USER_HEADER))?;

        // A blank header counts as absent.
        let correlation = self
            .headers
            .remove(CORRELATION_HEADER)
            .map(Tainted::into_inner)
            .filter(|raw| !raw.trim().is_empty())
            .map(Tainted::new);
        let correlation_id = match correlation {
            Some(raw) => StringSanitizer::new(config.max_identifier_len)
                .sanitize(raw)
                .map(|v| CorrelationId::new(v.into_inner()))
                .map_err(|e| RequestError::InvalidField {
                    field: CORRELATION_HEADER,
                    message: e.to_string(),
                })?,
            None if config.generate_correlation_ids => CorrelationId::generate(),
            None => {
                return Err(RequestError::InvalidField {
                    field: CORRELATION_HEADER,
                    message: "is required".to_string(),
                })
            }
        };

        let body: WireBody =
            serde_json::from_value(self.body.into_inner()).map_err(|e| {
                RequestError::InvalidField {
                    field: "body",
                    message: e.to_string(),
                }
            })?;

        let provider = identifier(&ids, "provider", Some(Tainted::new(body.provider)))?;
        let token_ref = body
            .token_ref
            .map(|t| identifier(&ids, "token_ref", Some(Tainted::new(t))))
            .transpose()?;

        let payload = body
            .operation
            .payload
            .unwrap_or_else(|| Value::Object(Default::default()));
        let operation = Operation::from_parts(&body.operation.kind, payload)?;

        let builder = OperationRequest::builder(tenant_id, user_id, provider, operation)
            .with_correlation(correlation_id);
        Ok(match token_ref {
            Some(token_ref) => builder.token_ref(token_ref),
            None => builder,
        }
        .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::OperationKind;
    use crate::web::ExtractOperationRequest;
    use serde_json::json;

    fn body() -> Value {
        json!({
            "provider": "supabase",
            "operation": { "type": "create_table", "payload": { "name": "docs" } }
        })
    }

    fn adapter() -> RequestAdapter {
        RequestAdapter::new()
            .with_header(TENANT_HEADER, "tenant-1")
            .with_header(USER_HEADER, "user-1")
            .with_body(body())
    }

    fn extract(adapter: &RequestAdapter) -> Result<OperationRequest, RequestError> {
        adapter.extract_request(&BrokerConfig::default())
    }

    #[test]
    fn headers_are_case_insensitive() {
        let adapter = RequestAdapter::new().with_header("X-Tenant-ID", "t");
        assert_eq!(adapter.header("x-tenant-id"), Some("t"));
    }

    #[test]
    fn extracts_full_request() {
        let request = extract(&adapter().with_header(CORRELATION_HEADER, "corr-1")).unwrap();

        assert_eq!(request.tenant_id().as_str(), "tenant-1");
        assert_eq!(request.user_id().as_str(), "user-1");
        assert_eq!(request.provider().as_str(), "supabase");
        assert_eq!(request.operation().kind(), OperationKind::CreateTable);
        assert_eq!(request.correlation_id().as_str(), "corr-1");
    }

    #[test]
    fn identifiers_are_trimmed() {
        let request = extract(&adapter().with_header(TENANT_HEADER, "  tenant-1 ")).unwrap();
        assert_eq!(request.tenant_id().as_str(), "tenant-1");
    }

    #[test]
    fn missing_correlation_is_generated() {
        let request = extract(&adapter()).unwrap();
        assert!(!request.correlation_id().as_str().is_empty());
    }

    #[test]
    fn missing_correlation_rejected_when_generation_is_off() {
        let config = BrokerConfig {
            generate_correlation_ids: false,
            ..BrokerConfig::default()
        };
        let err = adapter().extract_request(&config).unwrap_err();
        assert!(matches!(err, RequestError::InvalidField { field: CORRELATION_HEADER, .. }));
    }

    #[test]
    fn blank_correlation_is_generated() {
        let request = extract(&adapter().with_header(CORRELATION_HEADER, "   ")).unwrap();
        let id = request.correlation_id().as_str();
        assert!(!id.trim().is_empty());
        assert_eq!(id, id.trim());
    }

    #[test]
    fn blank_correlation_rejected_when_generation_is_off() {
        let config = BrokerConfig {
            generate_correlation_ids: false,
            ..BrokerConfig::default()
        };
        let err = adapter()
            .with_header(CORRELATION_HEADER, "")
            .extract_request(&config)
            .unwrap_err();
        assert_eq!(
            err,
            RequestError::InvalidField {
                field: CORRELATION_HEADER,
                message: "is required".to_string(),
            }
        );
    }

    #[test]
    fn missing_tenant_header() {
        let adapter = RequestAdapter::new()
            .with_header(USER_HEADER, "user-1")
            .with_body(body());
        let err = extract(&adapter).unwrap_err();
        assert!(matches!(err, RequestError::InvalidField { field: TENANT_HEADER, .. }));
    }

    #[test]
    fn malformed_user_header() {
        let err = extract(&adapter().with_header(USER_HEADER, "user 1; drop")).unwrap_err();
        assert!(matches!(err, RequestError::InvalidField { field: USER_HEADER, .. }));
    }

    #[test]
    fn oversized_identifier() {
        let config = BrokerConfig {
            max_identifier_len: 4,
            ..BrokerConfig::default()
        };
        let err = adapter().extract_request(&config).unwrap_err();
        assert!(matches!(err, RequestError::InvalidField { field: TENANT_HEADER, .. }));
    }

    #[test]
    fn unknown_operation_type() {
        let adapter = adapter().with_body(json!({
            "provider": "supabase",
            "operation": { "type": "drop_database" }
        }));
        let err = extract(&adapter).unwrap_err();
        assert_eq!(err, RequestError::UnsupportedOperation("drop_database".to_string()));
    }

    #[test]
    fn body_without_provider() {
        let adapter = adapter().with_body(json!({ "operation": { "type": "query" } }));
        let err = extract(&adapter).unwrap_err();
        assert!(matches!(err, RequestError::InvalidField { field: "body", .. }));
    }

    #[test]
    fn token_ref_is_carried() {
        let adapter = adapter().with_body(json!({
            "provider": "supabase",
            "operation": { "type": "query", "payload": { "table": "docs" } },
            "token_ref": "tok-1"
        }));
        let request = extract(&adapter).unwrap();
        assert_eq!(request.token_ref().map(|t| t.as_str()), Some("tok-1"));
    }

    #[test]
    fn tainted_inputs_list_header_names() {
        let inputs = adapter().extract_tainted_inputs();
        assert_eq!(inputs.header_names(), vec![TENANT_HEADER, USER_HEADER]);
    }
}
