//! Audit event schema.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::capability::Grant;
use crate::correlation::CorrelationId;
use crate::operation::OperationKind;
use crate::request::{OperationRequest, TenantId, UserId};

/// Action recorded for every broker operation.
pub const OPERATION_ACTION: &str = "operation";

/// What the event records about the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// The request was authorized and is about to run. Recorded before the
    /// provider is called, so it says nothing about the provider result.
    Authorized,
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditOutcome::Authorized => write!(f, "authorized"),
        }
    }
}

/// A metadata value.
///
/// Built only from plain strings, integers and booleans. There is
/// deliberately no conversion from [`Secret`](crate::Secret) or
/// [`CredentialHandle`](crate::CredentialHandle).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AuditValue {
    /// Free text.
    Text(String),
    /// Integer.
    Integer(i64),
    /// Boolean flag.
    Flag(bool),
}

impl From<&str> for AuditValue {
    fn from(value: &str) -> Self {
        AuditValue::Text(value.to_string())
    }
}

impl From<String> for AuditValue {
    fn from(value: String) -> Self {
        AuditValue::Text(value)
    }
}

impl From<i64> for AuditValue {
    fn from(value: i64) -> Self {
        AuditValue::Integer(value)
    }
}

impl From<bool> for AuditValue {
    fn from(value: bool) -> Self {
        AuditValue::Flag(value)
    }
}

impl fmt::Display for AuditValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditValue::Text(s) => f.write_str(s),
            AuditValue::Integer(n) => write!(f, "{n}"),
            AuditValue::Flag(b) => write!(f, "{b}"),
        }
    }
}

/// Intent record for one authorized operation.
///
/// # Safety Invariants
///
/// Every field is an identifier, an enum or an [`AuditValue`]. None of these
/// types can be built from credential material, so an `AuditEvent` cannot
/// hold a secret regardless of what the caller passes in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEvent {
    action: &'static str,
    tenant_id: TenantId,
    user_id: UserId,
    correlation_id: CorrelationId,
    operation_type: OperationKind,
    outcome: AuditOutcome,
    metadata: BTreeMap<String, AuditValue>,
    occurred_at: DateTime<Utc>,
}

impl AuditEvent {
    /// Builds the intent event for an authorized request.
    ///
    /// Metadata carries the provider, the authorized resource, the deciding
    /// policy and the table.
    pub(crate) fn intent(request: &OperationRequest, grant: &Grant) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert("provider".to_string(), request.provider().as_str().into());
        metadata.insert("resource".to_string(), grant.resource().as_str().into());
        metadata.insert("table".to_string(), request.operation().table().into());
        if let Some(policy_id) = &grant.decision().policy_id {
            metadata.insert("policy_id".to_string(), policy_id.as_str().into());
        }
        if let Some(token_ref) = request.token_ref() {
            metadata.insert("token_ref".to_string(), token_ref.as_str().into());
        }

        Self {
            action: OPERATION_ACTION,
            tenant_id: grant.tenant_id().clone(),
            user_id: grant.user_id().clone(),
            correlation_id: grant.correlation_id().clone(),
            operation_type: request.operation().kind(),
            outcome: AuditOutcome::Authorized,
            metadata,
            occurred_at: Utc::now(),
        }
    }

    /// Recorded action.
    pub fn action(&self) -> &str {
        self.action
    }

    /// Tenant the operation runs in.
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// Acting user.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Correlation id of the request.
    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    /// Kind of operation about to run.
    pub fn operation_type(&self) -> OperationKind {
        self.operation_type
    }

    /// Outcome at the time of recording.
    pub fn outcome(&self) -> AuditOutcome {
        self.outcome
    }

    /// Extra metadata, sorted by key.
    pub fn metadata(&self) -> &BTreeMap<String, AuditValue> {
        &self.metadata
    }

    /// When the event was built.
    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    /// Serializes the event as a JSON string.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; with the field types above this does not
    /// happen in practice.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} by {}@{} [{}]: {}",
            self.action,
            self.operation_type,
            self.user_id,
            self.tenant_id,
            self.correlation_id,
            self.outcome
        )
    }
}
