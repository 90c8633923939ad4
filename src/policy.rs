//! Policy decision contract.
//!
//! The rule language lives behind [`PolicyPort`]; this module only defines
//! what is asked ([`PolicyQuery`]) and what comes back ([`PolicyVerdict`]).

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::correlation::CorrelationId;
use crate::operation::OperationKind;
use crate::request::{ProviderId, TenantId, UserId};

/// What an action is performed on, e.g. `provider:supabase`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resource(String);

impl Resource {
    /// Wraps a resource name.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The resource guarding every operation on a provider.
    pub fn provider(provider: &ProviderId) -> Self {
        Self(format!("provider:{}", provider))
    }

    /// Returns the resource as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What is being done, e.g. `create_table`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action(String);

impl Action {
    /// Wraps an action name.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the action as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<OperationKind> for Action {
    fn from(kind: OperationKind) -> Self {
        Self(kind.as_str().to_string())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The question put to the policy engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyQuery {
    /// Tenant the user claims to act in.
    pub tenant_id: TenantId,
    /// Acting user.
    pub user_id: UserId,
    /// Target resource.
    pub resource: Resource,
    /// Requested action.
    pub action: Action,
    /// Correlation id of the request being decided.
    pub correlation_id: CorrelationId,
}

/// Allow/deny verdict for one query.
///
/// Produced fresh for every request. Nothing in this crate caches decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecision {
    /// Whether the action is allowed.
    pub allow: bool,
    /// Human-readable reason, safe to return to the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Id of the policy that decided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,
}

impl PolicyDecision {
    /// An allow decision attributed to `policy_id`.
    pub fn allow(policy_id: impl Into<String>) -> Self {
        Self {
            allow: true,
            reason: None,
            policy_id: Some(policy_id.into()),
        }
    }

    /// A deny decision with a reason.
    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allow: false,
            reason: Some(reason.into()),
            policy_id: None,
        }
    }

    /// Attributes the decision to a policy.
    pub fn with_policy_id(mut self, policy_id: impl Into<String>) -> Self {
        self.policy_id = Some(policy_id.into());
        self
    }
}

/// A decision together with the tenant the engine associates with the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyVerdict {
    /// The allow/deny decision.
    pub decision: PolicyDecision,
    /// Tenant the user belongs to, or `None` if the user is unknown.
    pub membership: Option<TenantId>,
}

/// The policy port failed to answer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("policy engine error: {0}")]
pub struct PolicyError(pub String);

/// Policy-decision port.
///
/// Implementations evaluate the tenant's rules. They must be safe to share
/// across concurrent requests.
#[async_trait]
pub trait PolicyPort: Send + Sync {
    /// Decides a query and reports the user's tenant membership.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] if no decision could be produced. The gate
    /// treats this as a denial.
    async fn decide(&self, query: &PolicyQuery) -> Result<PolicyVerdict, PolicyError>;
}
