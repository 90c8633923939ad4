use std::sync::Arc;

use crate::capability::Grant;
use crate::credential::{CredentialHandle, SecretsPort};
use crate::error::CredentialError;
use crate::request::{ProviderId, TokenRef};

/// Resolves provider credentials for authorized requests.
///
/// [`resolve`](Self::resolve) takes a [`Grant`], which only the
/// [`AuthorizationGate`](crate::AuthorizationGate) can mint, so no credential
/// is ever looked up for a request the policy has not allowed. The broker
/// does not keep credentials between calls.
#[derive(Clone)]
pub struct CredentialBroker {
    secrets: Arc<dyn SecretsPort>,
}

impl CredentialBroker {
    /// Creates a broker reading from `secrets`.
    pub fn new(secrets: Arc<dyn SecretsPort>) -> Self {
        Self { secrets }
    }

    /// Resolves the credential for `provider` in the grant's tenant.
    ///
    /// # Errors
    ///
    /// - [`CredentialError::Missing`] if nothing is stored or the stored
    ///   material is blank
    /// - [`CredentialError::TenantMismatch`] if the stored credential belongs
    ///   to another tenant
    /// - [`CredentialError::ProviderMismatch`] if it was issued for another
    ///   provider
    /// - [`CredentialError::StoreUnavailable`] if the store failed
    pub async fn resolve(
        &self,
        grant: &Grant,
        provider: &ProviderId,
        token_ref: Option<&TokenRef>,
    ) -> Result<CredentialHandle, CredentialError> {
        let tenant = grant.tenant_id();
        let stored = self
            .secrets
            .get_credential(tenant, provider, token_ref)
            .await?;

        if &stored.tenant_id != tenant {
            tracing::warn!(
                tenant_id = %tenant,
                provider = %provider,
                "stored credential belongs to another tenant"
            );
            return Err(CredentialError::TenantMismatch);
        }

        if &stored.provider != provider {
            return Err(CredentialError::ProviderMismatch {
                stored: stored.provider,
                requested: provider.clone(),
            });
        }

        if stored.material.is_blank() {
            return Err(CredentialError::Missing {
                provider: provider.clone(),
            });
        }

        tracing::debug!(provider = %provider, token_ref = ?token_ref, "credential resolved");
        Ok(CredentialHandle::issue(grant, stored))
    }
}

impl std::fmt::Debug for CredentialBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialBroker").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlation::CorrelationId;
    use crate::credential::{CredentialMaterial, StoredCredential};
    use crate::memory::MemorySecrets;
    use crate::policy::{Action, PolicyDecision, Resource};
    use crate::request::{TenantId, UserId};

    fn grant(tenant: &str) -> Grant {
        Grant::new(
            TenantId::new(tenant),
            UserId::new("user-1"),
            Resource::new("provider:supabase"),
            Action::new("query"),
            PolicyDecision::allow("pol-1"),
            CorrelationId::new("corr-1"),
        )
    }

    fn broker(secrets: MemorySecrets) -> CredentialBroker {
        CredentialBroker::new(Arc::new(secrets))
    }

    #[tokio::test]
    async fn resolves_tenant_credential() {
        let secrets = MemorySecrets::new().with_credential(
            "tenant-1",
            "supabase",
            CredentialMaterial::endpoint("https://example.supabase.co", "KEY"),
        );
        let handle = broker(secrets)
            .resolve(&grant("tenant-1"), &ProviderId::new("supabase"), None)
            .await
            .unwrap();

        assert_eq!(handle.tenant_id().as_str(), "tenant-1");
        assert_eq!(handle.provider().as_str(), "supabase");
    }

    #[tokio::test]
    async fn nothing_stored_is_missing() {
        let err = broker(MemorySecrets::new())
            .resolve(&grant("tenant-1"), &ProviderId::new("supabase"), None)
            .await
            .unwrap_err();
        assert!(err.is_missing());
    }

    #[tokio::test]
    async fn blank_material_is_missing() {
        let secrets = MemorySecrets::new().with_credential(
            "tenant-1",
            "supabase",
            CredentialMaterial::endpoint("https://example.supabase.co", ""),
        );
        let err = broker(secrets)
            .resolve(&grant("tenant-1"), &ProviderId::new("supabase"), None)
            .await
            .unwrap_err();
        assert!(err.is_missing());
    }

    #[tokio::test]
    async fn token_owned_by_other_tenant_is_invalid() {
        let secrets = MemorySecrets::new().with_token(
            "tok-9",
            StoredCredential {
                tenant_id: TenantId::new("tenant-9"),
                provider: ProviderId::new("supabase"),
                material: CredentialMaterial::token("secret"),
                token_ref: Some(TokenRef::new("tok-9")),
            },
        );
        let err = broker(secrets)
            .resolve(
                &grant("tenant-1"),
                &ProviderId::new("supabase"),
                Some(&TokenRef::new("tok-9")),
            )
            .await
            .unwrap_err();
        assert_eq!(err, CredentialError::TenantMismatch);
    }

    #[tokio::test]
    async fn token_for_other_provider_is_invalid() {
        let secrets = MemorySecrets::new().with_token(
            "tok-1",
            StoredCredential {
                tenant_id: TenantId::new("tenant-1"),
                provider: ProviderId::new("stripe"),
                material: CredentialMaterial::token("secret"),
                token_ref: Some(TokenRef::new("tok-1")),
            },
        );
        let err = broker(secrets)
            .resolve(
                &grant("tenant-1"),
                &ProviderId::new("supabase"),
                Some(&TokenRef::new("tok-1")),
            )
            .await
            .unwrap_err();
        assert!(err.is_invalid());
    }
}
