use std::sync::Arc;

use async_trait::async_trait;

use super::AuditEvent;
use crate::capability::AuditReceipt;
use crate::error::AuditError;

/// Audit persistence port.
///
/// `record` must not return until the event has been handed off; the broker
/// does not run the operation until it does.
#[async_trait]
pub trait AuditPort: Send + Sync {
    /// Persists one event.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError`] if the event could not be accepted.
    async fn record(&self, event: &AuditEvent) -> Result<(), AuditError>;
}

/// Hands intent events to the audit port and issues receipts.
#[derive(Clone)]
pub struct AuditRecorder {
    port: Arc<dyn AuditPort>,
}

impl AuditRecorder {
    /// Creates a recorder writing to `port`.
    pub fn new(port: Arc<dyn AuditPort>) -> Self {
        Self { port }
    }

    /// Records `event` and returns the receipt that unlocks execution.
    ///
    /// # Errors
    ///
    /// Propagates the port's [`AuditError`]. No receipt is issued then.
    pub async fn record(&self, event: AuditEvent) -> Result<AuditReceipt, AuditError> {
        if let Err(e) = self.port.record(&event).await {
            tracing::error!(
                correlation_id = %event.correlation_id(),
                detail = e.detail(),
                "audit port rejected intent event"
            );
            return Err(e);
        }

        Ok(AuditReceipt::new(event.correlation_id().clone()))
    }
}

impl std::fmt::Debug for AuditRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditRecorder").finish_non_exhaustive()
    }
}
