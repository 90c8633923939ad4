//! In-memory policy and secrets adapters for tests, demos and embedding.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::credential::{CredentialMaterial, SecretsPort, StoredCredential};
use crate::error::CredentialError;
use crate::policy::{
    Action, PolicyDecision, PolicyError, PolicyPort, PolicyQuery, PolicyVerdict, Resource,
};
use crate::request::{ProviderId, TenantId, TokenRef, UserId};

/// Reason given when no rule matches.
pub const NO_MATCHING_POLICY: &str = "no matching policy";

/// One allow rule of a [`StaticPolicy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRule {
    policy_id: String,
    tenant_id: TenantId,
    resource: Option<Resource>,
    actions: Option<Vec<Action>>,
}

impl PolicyRule {
    /// Allows every action on every resource in `tenant`.
    pub fn allow_all(policy_id: impl Into<String>, tenant: impl Into<TenantId>) -> Self {
        Self {
            policy_id: policy_id.into(),
            tenant_id: tenant.into(),
            resource: None,
            actions: None,
        }
    }

    /// Restricts the rule to one resource.
    pub fn on_resource(mut self, resource: Resource) -> Self {
        self.resource = Some(resource);
        self
    }

    /// Restricts the rule to the listed actions.
    pub fn for_actions<I, A>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Action>,
    {
        self.actions = Some(actions.into_iter().map(Into::into).collect());
        self
    }

    fn matches(&self, query: &PolicyQuery) -> bool {
        self.tenant_id == query.tenant_id
            && self.resource.as_ref().map_or(true, |r| r == &query.resource)
            && self
                .actions
                .as_ref()
                .map_or(true, |actions| actions.contains(&query.action))
    }
}

/// [`PolicyPort`] backed by fixed memberships and allow rules.
///
/// Rules are evaluated against the claimed tenant in insertion order; the
/// first match allows. No match denies with [`NO_MATCHING_POLICY`].
///
/// # Examples
///
/// ```
/// use credential_broker::{OperationKind, PolicyRule, Resource, StaticPolicy};
///
/// let policy = StaticPolicy::new()
///     .with_member("user-1", "tenant-1")
///     .with_rule(
///         PolicyRule::allow_all("pol-read", "tenant-1")
///             .on_resource(Resource::new("provider:supabase"))
///             .for_actions([OperationKind::Query]),
///     );
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticPolicy {
    memberships: HashMap<UserId, TenantId>,
    rules: Vec<PolicyRule>,
}

impl StaticPolicy {
    /// Policy with no members and no rules; denies everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `user` belongs to `tenant`.
    pub fn with_member(mut self, user: impl Into<UserId>, tenant: impl Into<TenantId>) -> Self {
        self.memberships.insert(user.into(), tenant.into());
        self
    }

    /// Appends an allow rule.
    pub fn with_rule(mut self, rule: PolicyRule) -> Self {
        self.rules.push(rule);
        self
    }
}

#[async_trait]
impl PolicyPort for StaticPolicy {
    async fn decide(&self, query: &PolicyQuery) -> Result<PolicyVerdict, PolicyError> {
        let decision = self
            .rules
            .iter()
            .find(|rule| rule.matches(query))
            .map(|rule| PolicyDecision::allow(rule.policy_id.clone()))
            .unwrap_or_else(|| PolicyDecision::deny(NO_MATCHING_POLICY));

        Ok(PolicyVerdict {
            decision,
            membership: self.memberships.get(&query.user_id).cloned(),
        })
    }
}

/// [`SecretsPort`] holding credentials in memory.
///
/// Credentials are stored per tenant and provider, and optionally under a
/// token reference. A token lookup returns whatever is stored under that
/// reference, including its owning tenant and provider, so the broker can
/// reject references that belong to someone else.
#[derive(Default)]
pub struct MemorySecrets {
    by_provider: HashMap<(TenantId, ProviderId), StoredCredential>,
    by_token: HashMap<TokenRef, StoredCredential>,
}

impl MemorySecrets {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the default credential for `tenant` and `provider`.
    pub fn with_credential(
        mut self,
        tenant: impl Into<TenantId>,
        provider: impl Into<ProviderId>,
        material: CredentialMaterial,
    ) -> Self {
        let tenant_id = tenant.into();
        let provider = provider.into();
        self.by_provider.insert(
            (tenant_id.clone(), provider.clone()),
            StoredCredential {
                tenant_id,
                provider,
                material,
                token_ref: None,
            },
        );
        self
    }

    /// Stores a credential under a token reference.
    pub fn with_token(mut self, token_ref: impl Into<TokenRef>, credential: StoredCredential) -> Self {
        self.by_token.insert(token_ref.into(), credential);
        self
    }
}

fn duplicate(stored: &StoredCredential) -> StoredCredential {
    let material = match &stored.material {
        CredentialMaterial::Endpoint { url, key } => {
            CredentialMaterial::endpoint(url.clone(), key.expose_secret().clone())
        }
        CredentialMaterial::Token { secret } => {
            CredentialMaterial::token(secret.expose_secret().clone())
        }
    };
    StoredCredential {
        tenant_id: stored.tenant_id.clone(),
        provider: stored.provider.clone(),
        material,
        token_ref: stored.token_ref.clone(),
    }
}

#[async_trait]
impl SecretsPort for MemorySecrets {
    async fn get_credential(
        &self,
        tenant: &TenantId,
        provider: &ProviderId,
        token_ref: Option<&TokenRef>,
    ) -> Result<StoredCredential, CredentialError> {
        let found = match token_ref {
            Some(token_ref) => self.by_token.get(token_ref),
            None => self.by_provider.get(&(tenant.clone(), provider.clone())),
        };

        found.map(duplicate).ok_or_else(|| CredentialError::Missing {
            provider: provider.clone(),
        })
    }
}

impl std::fmt::Debug for MemorySecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySecrets")
            .field("credentials", &self.by_provider.len())
            .field("tokens", &self.by_token.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlation::CorrelationId;
    use crate::operation::OperationKind;

    fn query(tenant: &str, user: &str, action: OperationKind) -> PolicyQuery {
        PolicyQuery {
            tenant_id: tenant.into(),
            user_id: user.into(),
            resource: Resource::new("provider:supabase"),
            action: action.into(),
            correlation_id: CorrelationId::new("corr-1"),
        }
    }

    fn policy() -> StaticPolicy {
        StaticPolicy::new()
            .with_member("user-1", "tenant-1")
            .with_rule(
                PolicyRule::allow_all("pol-read", "tenant-1")
                    .on_resource(Resource::new("provider:supabase"))
                    .for_actions([OperationKind::Query]),
            )
    }

    #[tokio::test]
    async fn matching_rule_allows() {
        let verdict = policy()
            .decide(&query("tenant-1", "user-1", OperationKind::Query))
            .await
            .unwrap();

        assert!(verdict.decision.allow);
        assert_eq!(verdict.decision.policy_id.as_deref(), Some("pol-read"));
        assert_eq!(verdict.membership, Some(TenantId::new("tenant-1")));
    }

    #[tokio::test]
    async fn unlisted_action_is_denied() {
        let verdict = policy()
            .decide(&query("tenant-1", "user-1", OperationKind::Delete))
            .await
            .unwrap();

        assert!(!verdict.decision.allow);
        assert_eq!(verdict.decision.reason.as_deref(), Some(NO_MATCHING_POLICY));
    }

    #[tokio::test]
    async fn unknown_user_has_no_membership() {
        let verdict = policy()
            .decide(&query("tenant-1", "ghost", OperationKind::Query))
            .await
            .unwrap();
        assert!(verdict.membership.is_none());
    }

    #[tokio::test]
    async fn lookup_by_tenant_and_provider() {
        let secrets = MemorySecrets::new().with_credential(
            "tenant-1",
            "supabase",
            CredentialMaterial::token("abc"),
        );

        let stored = secrets
            .get_credential(&TenantId::new("tenant-1"), &ProviderId::new("supabase"), None)
            .await
            .unwrap();
        assert_eq!(stored.tenant_id.as_str(), "tenant-1");

        let missing = secrets
            .get_credential(&TenantId::new("tenant-2"), &ProviderId::new("supabase"), None)
            .await
            .unwrap_err();
        assert!(missing.is_missing());
    }

    #[test]
    fn debug_does_not_list_secrets() {
        let secrets = MemorySecrets::new().with_credential(
            "tenant-1",
            "supabase",
            CredentialMaterial::token("very-secret"),
        );
        assert!(!format!("{:?}", secrets).contains("very-secret"));
    }
}
