//! Audit port that writes events through `tracing`.
//!
//! Events go to the `broker_audit` target so a subscriber can route them to
//! a dedicated sink.

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::{AuditEvent, AuditPort, AuditValue};
use crate::error::AuditError;
use crate::redact::SecretRedactor;

/// Tracing target for audit events.
pub const AUDIT_TARGET: &str = "broker_audit";

/// [`AuditPort`] that emits each event as a structured `info` record.
///
/// With redaction enabled (the default), free-text metadata is passed
/// through [`SecretRedactor`] first.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use credential_broker::{AuditRecorder, TracingAuditSink};
///
/// let recorder = AuditRecorder::new(Arc::new(TracingAuditSink::new()));
/// ```
#[derive(Debug, Clone)]
pub struct TracingAuditSink {
    redactor: Option<SecretRedactor>,
}

impl TracingAuditSink {
    /// Sink with metadata redaction on.
    pub fn new() -> Self {
        Self {
            redactor: Some(SecretRedactor::new()),
        }
    }

    /// Sink that emits metadata as-is.
    pub fn without_redaction() -> Self {
        Self { redactor: None }
    }

    /// Sink with redaction on or off.
    pub fn with_redaction(enabled: bool) -> Self {
        if enabled {
            Self::new()
        } else {
            Self::without_redaction()
        }
    }

    /// Renders metadata as a JSON object string, redacting text values.
    fn render_metadata(&self, metadata: &BTreeMap<String, AuditValue>) -> String {
        let rendered: BTreeMap<&str, AuditValue> = metadata
            .iter()
            .map(|(key, value)| {
                let value = match (value, &self.redactor) {
                    (AuditValue::Text(text), Some(redactor)) => {
                        AuditValue::Text(redactor.redact(text).into_owned())
                    }
                    _ => value.clone(),
                };
                (key.as_str(), value)
            })
            .collect();

        serde_json::to_string(&rendered).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for TracingAuditSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditPort for TracingAuditSink {
    async fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        let metadata = self.render_metadata(event.metadata());

        tracing::info!(
            target: AUDIT_TARGET,
            correlation_id = %event.correlation_id(),
            tenant_id = %event.tenant_id(),
            user_id = %event.user_id(),
            action = event.action(),
            operation_type = %event.operation_type(),
            outcome = %event.outcome(),
            occurred_at = %event.occurred_at().to_rfc3339(),
            metadata = %metadata,
            "audit event"
        );

        Ok(())
    }
}
