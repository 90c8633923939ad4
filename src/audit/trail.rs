//! In-memory audit trail.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{AuditEvent, AuditPort};
use crate::error::AuditError;

/// [`AuditPort`] that keeps events in memory, in the order recorded.
///
/// Intended for tests and demos. Shareable across tasks.
#[derive(Debug, Default)]
pub struct AuditTrail {
    events: Mutex<Vec<AuditEvent>>,
}

impl AuditTrail {
    /// Creates an empty trail.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<AuditEvent>> {
        // a panic while holding the lock cannot leave the Vec half-written
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of all recorded events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.lock().clone()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Clears all recorded events.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

#[async_trait]
impl AuditPort for AuditTrail {
    async fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        self.lock().push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::intent_event;

    #[test]
    fn audit_trail_starts_empty() {
        let trail = AuditTrail::new();
        assert!(trail.is_empty());
        assert_eq!(trail.len(), 0);
    }

    #[tokio::test]
    async fn audit_trail_records_in_order() {
        let trail = AuditTrail::new();

        trail.record(&intent_event("corr-1")).await.unwrap();
        trail.record(&intent_event("corr-2")).await.unwrap();

        let events = trail.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].correlation_id().as_str(), "corr-1");
        assert_eq!(events[1].correlation_id().as_str(), "corr-2");
    }

    #[tokio::test]
    async fn audit_trail_can_be_cleared() {
        let trail = AuditTrail::new();
        trail.record(&intent_event("corr-1")).await.unwrap();

        trail.clear();

        assert!(trail.is_empty());
    }
}
