//! Credential material and the opaque handle that carries it to a provider.

use std::fmt;

use async_trait::async_trait;

use crate::capability::Grant;
use crate::correlation::CorrelationId;
use crate::error::CredentialError;
use crate::request::{ProviderId, TenantId, TokenRef};
use crate::secret::Secret;

const REDACTED: &str = "[REDACTED]";

/// Secret material for one provider.
///
/// Every secret field is a [`Secret`], so `Debug` never prints it.
#[derive(Debug)]
pub enum CredentialMaterial {
    /// A service endpoint plus its API key.
    Endpoint {
        /// Base URL of the provider project.
        url: String,
        /// API or service-role key.
        key: Secret<String>,
    },
    /// A bare bearer token or client secret.
    Token {
        /// The token.
        secret: Secret<String>,
    },
}

impl CredentialMaterial {
    /// Endpoint credential.
    pub fn endpoint(url: impl Into<String>, key: impl Into<String>) -> Self {
        CredentialMaterial::Endpoint {
            url: url.into(),
            key: Secret::new(key.into()),
        }
    }

    /// Token credential.
    pub fn token(secret: impl Into<String>) -> Self {
        CredentialMaterial::Token {
            secret: Secret::new(secret.into()),
        }
    }

    /// `true` if the material is configured but unusable.
    pub fn is_blank(&self) -> bool {
        match self {
            CredentialMaterial::Endpoint { url, key } => url.trim().is_empty() || key.is_blank(),
            CredentialMaterial::Token { secret } => secret.is_blank(),
        }
    }

    fn secret_text(&self) -> &str {
        match self {
            CredentialMaterial::Endpoint { key, .. } => key.expose_secret(),
            CredentialMaterial::Token { secret } => secret.expose_secret(),
        }
    }
}

/// A credential as the secrets store returns it.
///
/// `tenant_id` and `provider` record who the credential was issued to; the
/// broker compares them against the grant rather than trusting the lookup
/// key.
#[derive(Debug)]
pub struct StoredCredential {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Provider the credential is valid for.
    pub provider: ProviderId,
    /// Secret material.
    pub material: CredentialMaterial,
    /// Reference the credential is stored under, if any.
    pub token_ref: Option<TokenRef>,
}

/// Secrets store port.
#[async_trait]
pub trait SecretsPort: Send + Sync {
    /// Looks up the credential for `tenant` and `provider`, or the one stored
    /// under `token_ref` when given.
    ///
    /// # Errors
    ///
    /// [`CredentialError::Missing`] when nothing is stored,
    /// [`CredentialError::StoreUnavailable`] when the store cannot be read.
    async fn get_credential(
        &self,
        tenant: &TenantId,
        provider: &ProviderId,
        token_ref: Option<&TokenRef>,
    ) -> Result<StoredCredential, CredentialError>;
}

/// Opaque credential passed from the broker to the provider executor.
///
/// Not `Clone`, not `Serialize`, and `Debug` prints only the tenant and
/// provider. It is moved into the executor and dropped there.
///
/// ```compile_fail
/// fn needs_clone<T: Clone>() {}
/// needs_clone::<credential_broker::CredentialHandle>();
/// ```
///
/// ```compile_fail
/// fn needs_serialize<T: serde::Serialize>() {}
/// needs_serialize::<credential_broker::CredentialHandle>();
/// ```
pub struct CredentialHandle {
    tenant_id: TenantId,
    provider: ProviderId,
    correlation_id: CorrelationId,
    material: CredentialMaterial,
    _private: (),
}

impl CredentialHandle {
    /// Issues a handle. Requires the grant of the request it serves.
    pub(crate) fn issue(grant: &Grant, stored: StoredCredential) -> Self {
        Self {
            tenant_id: stored.tenant_id,
            provider: stored.provider,
            correlation_id: grant.correlation_id().clone(),
            material: stored.material,
            _private: (),
        }
    }

    /// Tenant the credential belongs to.
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// Provider the credential is for.
    pub fn provider(&self) -> &ProviderId {
        &self.provider
    }

    /// Correlation id of the request the handle was issued for.
    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    /// The secret material, for provider adapters.
    pub fn material(&self) -> &CredentialMaterial {
        &self.material
    }

    /// Replaces every occurrence of the secret in `text` with `[REDACTED]`.
    ///
    /// Provider adapters sometimes echo request headers in error bodies.
    pub(crate) fn scrub(&self, text: &str) -> String {
        let secret = self.material.secret_text();
        if secret.is_empty() {
            text.to_string()
        } else {
            text.replace(secret, REDACTED)
        }
    }
}

impl fmt::Debug for CredentialHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialHandle")
            .field("tenant_id", &self.tenant_id)
            .field("provider", &self.provider)
            .field("material", &REDACTED)
            .finish()
    }
}
