use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Header carrying the caller-supplied correlation id.
pub const CORRELATION_HEADER: &str = "x-correlation-id";

/// Opaque identifier threading one logical request through every component.
///
/// A correlation id is either supplied by the caller or generated exactly once
/// when the [`OperationRequest`](crate::OperationRequest) is built. It is then
/// copied onto the grant, the audit event and the provider result, and is
/// never regenerated mid-pipeline.
///
/// # Examples
///
/// ```
/// use credential_broker::CorrelationId;
///
/// let supplied = CorrelationId::from_header(Some("corr-123"));
/// assert_eq!(supplied.as_str(), "corr-123");
///
/// let generated = CorrelationId::from_header(None);
/// assert!(!generated.as_str().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Wraps a caller-supplied correlation id as-is.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generates a fresh random correlation id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Uses the header value when present and non-blank, generating otherwise.
    pub fn from_header(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Self::new(v),
            _ => Self::generate(),
        }
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_value_is_kept() {
        let id = CorrelationId::from_header(Some("corr-123"));
        assert_eq!(id.as_str(), "corr-123");
    }

    #[test]
    fn header_value_is_trimmed() {
        let id = CorrelationId::from_header(Some("  corr-9 "));
        assert_eq!(id.as_str(), "corr-9");
    }

    #[test]
    fn blank_header_generates() {
        let id = CorrelationId::from_header(Some("   "));
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(CorrelationId::generate(), CorrelationId::generate());
    }

    #[test]
    fn serializes_transparently() {
        let id = CorrelationId::new("corr-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"corr-1\"");
    }
}
