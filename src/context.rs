use crate::audit::AuditEvent;
use crate::capability::{AuditReceipt, Grant};
use crate::credential::CredentialHandle;
use crate::error::{AuditError, AuthorizationError};
use crate::policy::{Action, PolicyQuery, Resource};
use crate::request::OperationRequest;
use crate::state::{Audited, Authorized, Credentialed, Pending, Stage};

/// One operation request moving through the broker pipeline.
///
/// `OperationCtx<S>` is generic over its pipeline state. Each transition
/// consumes the context and requires the proof produced by the previous step:
///
/// ```text
/// OperationCtx<Pending> --grant--> <Authorized> --credential--> <Credentialed>
///     --receipt--> <Audited> --into_execution--> (request, credential)
/// ```
///
/// Grants, credential handles and receipts can only be minted inside this
/// crate, so a credential cannot be reached without an allow decision, and
/// execution cannot be reached without an audit receipt.
///
/// # Examples
///
/// ```
/// use credential_broker::{Operation, OperationCtx, OperationRequest};
/// use serde_json::json;
///
/// let op = Operation::from_parts("query", json!({ "table": "docs" })).unwrap();
/// let request = OperationRequest::builder("tenant-1", "user-1", "supabase", op)
///     .correlation_id("corr-1")
///     .build();
///
/// let ctx = OperationCtx::new(request);
/// let query = ctx.policy_query();
/// assert_eq!(query.resource.as_str(), "provider:supabase");
/// assert_eq!(query.action.as_str(), "query");
/// ```
#[derive(Debug)]
pub struct OperationCtx<S> {
    request: OperationRequest,
    state: S,
}

impl<S> OperationCtx<S> {
    /// The request being processed.
    pub fn request(&self) -> &OperationRequest {
        &self.request
    }
}

impl OperationCtx<Pending> {
    /// Starts a pipeline for `request`.
    pub fn new(request: OperationRequest) -> Self {
        Self {
            request,
            state: Pending::new(),
        }
    }

    /// Current stage.
    pub fn stage(&self) -> Stage {
        Stage::Pending
    }

    /// Builds the policy question for this request.
    ///
    /// The resource is `provider:<id>` and the action is the operation kind.
    pub fn policy_query(&self) -> PolicyQuery {
        PolicyQuery {
            tenant_id: self.request.tenant_id().clone(),
            user_id: self.request.user_id().clone(),
            resource: Resource::provider(self.request.provider()),
            action: Action::from(self.request.operation().kind()),
            correlation_id: self.request.correlation_id().clone(),
        }
    }

    /// Moves to the authorized state.
    ///
    /// # Errors
    ///
    /// [`AuthorizationError::GrantMismatch`] if the grant was issued for a
    /// different tenant, user, resource, action or correlation id.
    pub fn authorize(self, grant: Grant) -> Result<OperationCtx<Authorized>, AuthorizationError> {
        let expected = self.policy_query();
        let matches = grant.tenant_id() == &expected.tenant_id
            && grant.user_id() == &expected.user_id
            && grant.resource() == &expected.resource
            && grant.action() == &expected.action
            && grant.correlation_id() == &expected.correlation_id;

        if !matches {
            return Err(AuthorizationError::GrantMismatch);
        }

        Ok(OperationCtx {
            request: self.request,
            state: Authorized { grant },
        })
    }
}

impl OperationCtx<Authorized> {
    /// Current stage.
    pub fn stage(&self) -> Stage {
        Stage::Authorized
    }

    /// The grant that authorized this request.
    pub fn grant(&self) -> &Grant {
        &self.state.grant
    }

    /// Attaches the resolved credential.
    pub fn with_credential(self, credential: CredentialHandle) -> OperationCtx<Credentialed> {
        OperationCtx {
            request: self.request,
            state: Credentialed {
                grant: self.state.grant,
                credential,
            },
        }
    }
}

impl OperationCtx<Credentialed> {
    /// Current stage.
    pub fn stage(&self) -> Stage {
        Stage::Credentialed
    }

    /// Builds the intent event for this request.
    ///
    /// The event is built from the request and the grant only. The
    /// credential handle is not reachable from here.
    pub fn audit_event(&self) -> AuditEvent {
        AuditEvent::intent(&self.request, &self.state.grant)
    }

    /// Moves to the audited state.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError`] if the receipt belongs to another request.
    pub fn audited(self, receipt: AuditReceipt) -> Result<OperationCtx<Audited>, AuditError> {
        if receipt.correlation_id() != self.request.correlation_id() {
            return Err(AuditError::new("audit receipt issued for another request"));
        }

        Ok(OperationCtx {
            request: self.request,
            state: Audited {
                credential: self.state.credential,
                receipt,
            },
        })
    }
}

impl OperationCtx<Audited> {
    /// Current stage.
    pub fn stage(&self) -> Stage {
        Stage::Audited
    }

    /// The receipt for the recorded intent.
    pub fn receipt(&self) -> &AuditReceipt {
        &self.state.receipt
    }

    /// Releases the request and credential for execution.
    pub fn into_execution(self) -> (OperationRequest, CredentialHandle) {
        (self.request, self.state.credential)
    }
}
