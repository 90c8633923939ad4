//! Intent auditing.
//!
//! - [`AuditEvent`]: the secret-free record of one authorized operation
//! - [`AuditPort`]: where events are persisted
//! - [`AuditRecorder`]: hands events to the port and issues receipts
//! - [`AuditTrail`] and [`TracingAuditSink`]: bundled ports
//!
//! An event is recorded once per authorized request, after the credential is
//! resolved and before the provider runs. It is never updated afterwards.

mod event;
mod recorder;
mod trail;
mod tracing_sink;

pub use event::{AuditEvent, AuditOutcome, AuditValue, OPERATION_ACTION};
pub use recorder::{AuditPort, AuditRecorder};
pub use tracing_sink::{TracingAuditSink, AUDIT_TARGET};
pub use trail::AuditTrail;
