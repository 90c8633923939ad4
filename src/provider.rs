//! Provider execution.
//!
//! A [`ProviderPort`] talks to one external system. The [`ProviderExecutor`]
//! owns one port per provider id, hands it the credential, and turns what
//! comes back into a [`ProviderResult`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::correlation::CorrelationId;
use crate::credential::CredentialHandle;
use crate::error::ProviderError;
use crate::operation::Operation;
use crate::request::ProviderId;

/// What a provider adapter got back from the external system.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    /// Status reported by the provider.
    pub status: u16,
    /// Response body, if any.
    pub data: Option<Value>,
    /// Error text reported by the provider, if any.
    pub error: Option<String>,
}

impl ProviderResponse {
    /// A successful response.
    pub fn ok(status: u16, data: Option<Value>) -> Self {
        Self {
            status,
            data,
            error: None,
        }
    }

    /// A response the provider reported as failed.
    pub fn failed(status: u16, error: impl Into<String>) -> Self {
        Self {
            status,
            data: None,
            error: Some(error.into()),
        }
    }

    /// `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The provider could not be reached or did not answer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ProviderFailure {
    message: String,
}

impl ProviderFailure {
    /// Creates a failure with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Adapter for one external provider.
#[async_trait]
pub trait ProviderPort: Send + Sync {
    /// Runs `operation` with `credential`.
    ///
    /// A non-2xx answer from the provider is a normal [`ProviderResponse`].
    ///
    /// # Errors
    ///
    /// [`ProviderFailure`] for transport-level failures only.
    async fn execute(
        &self,
        operation: &Operation,
        credential: &CredentialHandle,
    ) -> Result<ProviderResponse, ProviderFailure>;
}

/// Result of one broker operation, safe to return to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderResult {
    /// Whether the provider reported success.
    pub ok: bool,
    /// Status for the caller.
    pub status: u16,
    /// Provider data on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Scrubbed provider error on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Correlation id of the request.
    pub correlation_id: CorrelationId,
}

/// Dispatches operations to registered provider ports.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use async_trait::async_trait;
/// use credential_broker::{
///     CredentialHandle, Operation, ProviderExecutor, ProviderFailure, ProviderId, ProviderPort,
///     ProviderResponse,
/// };
///
/// struct Noop;
///
/// #[async_trait]
/// impl ProviderPort for Noop {
///     async fn execute(
///         &self,
///         _operation: &Operation,
///         _credential: &CredentialHandle,
///     ) -> Result<ProviderResponse, ProviderFailure> {
///         Ok(ProviderResponse::ok(200, None))
///     }
/// }
///
/// let executor = ProviderExecutor::new().with_provider("supabase", Arc::new(Noop));
/// assert!(executor.supports(&ProviderId::new("supabase")));
/// assert!(!executor.supports(&ProviderId::new("stripe")));
/// ```
#[derive(Clone, Default)]
pub struct ProviderExecutor {
    providers: HashMap<ProviderId, Arc<dyn ProviderPort>>,
}

impl ProviderExecutor {
    /// Executor with no providers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `port` under `provider`, replacing any previous one.
    pub fn with_provider(
        mut self,
        provider: impl Into<ProviderId>,
        port: Arc<dyn ProviderPort>,
    ) -> Self {
        self.providers.insert(provider.into(), port);
        self
    }

    /// `true` if a port is registered for `provider`.
    pub fn supports(&self, provider: &ProviderId) -> bool {
        self.providers.contains_key(provider)
    }

    /// Registered provider ids, sorted.
    pub fn providers(&self) -> Vec<&ProviderId> {
        let mut ids: Vec<_> = self.providers.keys().collect();
        ids.sort();
        ids
    }

    /// Runs `operation` on `provider`, consuming the credential.
    ///
    /// On a 2xx response the result carries the success status for the
    /// operation kind. Any other response becomes `ok: false` with the
    /// provider's status and its scrubbed error text. The credential is
    /// dropped before this returns.
    ///
    /// # Errors
    ///
    /// [`ProviderError`] (502) if no port is registered or the port fails.
    pub async fn execute(
        &self,
        provider: &ProviderId,
        operation: &Operation,
        credential: CredentialHandle,
        correlation_id: &CorrelationId,
    ) -> Result<ProviderResult, ProviderError> {
        let kind = operation.kind();
        let Some(port) = self.providers.get(provider) else {
            return Err(ProviderError::new(
                provider.clone(),
                kind,
                "no adapter registered".to_string(),
            ));
        };

        let response = match port.execute(operation, &credential).await {
            Ok(response) => response,
            Err(failure) => {
                let message = credential.scrub(failure.message());
                tracing::error!(provider = %provider, operation = %kind, error = %message, "provider call failed");
                return Err(ProviderError::new(provider.clone(), kind, message));
            }
        };

        let result = if response.is_success() {
            ProviderResult {
                ok: true,
                status: kind.success_status(),
                data: response.data,
                error: None,
                correlation_id: correlation_id.clone(),
            }
        } else {
            let error = response
                .error
                .map(|e| credential.scrub(&e))
                .unwrap_or_else(|| format!("provider returned status {}", response.status));
            ProviderResult {
                ok: false,
                status: response.status,
                data: None,
                error: Some(error),
                correlation_id: correlation_id.clone(),
            }
        };

        drop(credential);
        Ok(result)
    }
}

impl std::fmt::Debug for ProviderExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderExecutor")
            .field("providers", &self.providers())
            .finish()
    }
}
