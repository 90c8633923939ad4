use crate::correlation::CorrelationId;
use crate::policy::{Action, PolicyDecision, Resource};
use crate::request::{TenantId, UserId};

/// Proof that the policy engine allowed one request.
///
/// A `Grant` is minted only by [`AuthorizationGate`](crate::AuthorizationGate)
/// after an allow decision, and it is the only way to ask the
/// [`CredentialBroker`](crate::CredentialBroker) for a credential. Holding one
/// is how the type system guarantees a credential is never resolved before
/// authorization.
///
/// It cannot be constructed outside this crate and is not `Clone`.
///
/// ```compile_fail
/// # use credential_broker::Grant;
/// let grant = Grant { _private: () }; // Error: fields are private
/// ```
#[derive(Debug)]
pub struct Grant {
    tenant_id: TenantId,
    user_id: UserId,
    resource: Resource,
    action: Action,
    decision: PolicyDecision,
    correlation_id: CorrelationId,
    _private: (),
}

impl Grant {
    /// Creates a grant. Only the gate calls this, after `decision.allow`.
    pub(crate) fn new(
        tenant_id: TenantId,
        user_id: UserId,
        resource: Resource,
        action: Action,
        decision: PolicyDecision,
        correlation_id: CorrelationId,
    ) -> Self {
        debug_assert!(decision.allow, "grant minted from a deny decision");
        Self {
            tenant_id,
            user_id,
            resource,
            action,
            decision,
            correlation_id,
            _private: (),
        }
    }

    /// Tenant the grant is scoped to.
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// User the grant was issued to.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Resource the grant covers.
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Action the grant covers.
    pub fn action(&self) -> &Action {
        &self.action
    }

    /// The allow decision behind the grant.
    pub fn decision(&self) -> &PolicyDecision {
        &self.decision
    }

    /// Correlation id of the authorized request.
    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }
}

/// Proof that an intent event was handed to the audit port.
///
/// Returned by [`AuditRecorder::record`](crate::AuditRecorder::record) and
/// required to move an operation into the audited state.
#[derive(Debug)]
pub struct AuditReceipt {
    correlation_id: CorrelationId,
    _private: (),
}

impl AuditReceipt {
    pub(crate) fn new(correlation_id: CorrelationId) -> Self {
        Self {
            correlation_id,
            _private: (),
        }
    }

    /// Correlation id of the audited request.
    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }
}
