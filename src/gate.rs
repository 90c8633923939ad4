use std::sync::Arc;

use crate::capability::Grant;
use crate::error::AuthorizationError;
use crate::policy::{PolicyPort, PolicyQuery};

/// The authorization gate.
///
/// `AuthorizationGate` is the only way to obtain a [`Grant`]. It asks the
/// policy port for a fresh verdict on every call and mints a grant only when
/// the user is a member of the claimed tenant and the decision allows the
/// action. Every other outcome, including the port failing, is a denial.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use credential_broker::{
///     Action, AuthorizationGate, CorrelationId, PolicyQuery, PolicyRule, Resource, StaticPolicy,
/// };
///
/// # tokio_test_block(async {
/// let policy = StaticPolicy::new()
///     .with_member("user-1", "tenant-1")
///     .with_rule(PolicyRule::allow_all("pol-1", "tenant-1"));
/// let gate = AuthorizationGate::new(Arc::new(policy));
///
/// let grant = gate
///     .decide(PolicyQuery {
///         tenant_id: "tenant-1".into(),
///         user_id: "user-1".into(),
///         resource: Resource::new("provider:supabase"),
///         action: Action::new("query"),
///         correlation_id: CorrelationId::new("corr-1"),
///     })
///     .await
///     .unwrap();
/// assert_eq!(grant.tenant_id().as_str(), "tenant-1");
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Clone)]
pub struct AuthorizationGate {
    policy: Arc<dyn PolicyPort>,
}

impl AuthorizationGate {
    /// Creates a gate backed by `policy`.
    pub fn new(policy: Arc<dyn PolicyPort>) -> Self {
        Self { policy }
    }

    /// Decides `query`, returning a grant on allow.
    ///
    /// Checks, in order:
    /// 1. tenant and user ids are present
    /// 2. the policy port answers
    /// 3. the user is known to the policy engine
    /// 4. the user's tenant equals the claimed tenant
    /// 5. the decision allows the action
    ///
    /// # Errors
    ///
    /// Returns the first failing check as an [`AuthorizationError`].
    pub async fn decide(&self, query: PolicyQuery) -> Result<Grant, AuthorizationError> {
        if query.tenant_id.is_blank() {
            return Err(AuthorizationError::MissingIdentity("tenant id"));
        }
        if query.user_id.is_blank() {
            return Err(AuthorizationError::MissingIdentity("user id"));
        }

        let verdict = self.policy.decide(&query).await.map_err(|e| {
            tracing::error!(error = %e, "policy port failed");
            AuthorizationError::PolicyUnavailable(e.to_string())
        })?;

        let Some(member_of) = verdict.membership else {
            tracing::warn!(user_id = %query.user_id, "unknown principal");
            return Err(AuthorizationError::UnknownPrincipal);
        };

        if member_of != query.tenant_id {
            tracing::warn!(
                claimed = %query.tenant_id,
                user_id = %query.user_id,
                "tenant mismatch"
            );
            return Err(AuthorizationError::TenantMismatch);
        }

        let decision = verdict.decision;
        if !decision.allow {
            tracing::warn!(
                resource = %query.resource,
                action = %query.action,
                policy_id = ?decision.policy_id,
                "denied by policy"
            );
            return Err(AuthorizationError::Denied {
                reason: decision.reason,
                policy_id: decision.policy_id,
            });
        }

        Ok(Grant::new(
            query.tenant_id,
            query.user_id,
            query.resource,
            query.action,
            decision,
            query.correlation_id,
        ))
    }
}

impl std::fmt::Debug for AuthorizationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationGate").finish_non_exhaustive()
    }
}
