//! Error taxonomy.
//!
//! Each component has its own error enum; [`BrokerError`] unifies them for
//! `execute_operation`. `Display` output of every error here is safe to hand
//! back to a caller: none of them can carry credential material.

use thiserror::Error;

use crate::operation::OperationKind;
use crate::request::ProviderId;

/// The request itself is malformed. Raised before any port is called.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    /// Operation type outside the supported set.
    #[error("unsupported operation '{0}'")]
    UnsupportedOperation(String),

    /// Payload does not decode or violates a payload rule.
    #[error("invalid {kind} payload: {message}")]
    InvalidPayload {
        /// Operation the payload was meant for.
        kind: OperationKind,
        /// What was wrong.
        message: String,
    },

    /// A required request field is missing or failed sanitization.
    #[error("invalid {field}: {message}")]
    InvalidField {
        /// Field name (header or body key).
        field: &'static str,
        /// What was wrong.
        message: String,
    },
}

/// Authorization was not granted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthorizationError {
    /// Tenant or user id is blank.
    #[error("unauthorized: {0} is missing")]
    MissingIdentity(&'static str),

    /// The policy engine does not know the user.
    #[error("unauthorized: unknown principal")]
    UnknownPrincipal,

    /// The user belongs to a different tenant than the one claimed.
    #[error("unauthorized: tenant mismatch")]
    TenantMismatch,

    /// The policy evaluated to deny.
    #[error("unauthorized: {}", .reason.as_deref().unwrap_or("denied by policy"))]
    Denied {
        /// Reason given by the policy engine.
        reason: Option<String>,
        /// Policy that produced the decision.
        policy_id: Option<String>,
    },

    /// A grant was presented for a different request.
    #[error("unauthorized: grant does not match request")]
    GrantMismatch,

    /// The policy port could not produce a decision.
    #[error("policy decision unavailable")]
    PolicyUnavailable(String),
}

impl AuthorizationError {
    /// Denial reason suitable for the caller, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            AuthorizationError::Denied { reason, .. } => reason.as_deref(),
            AuthorizationError::TenantMismatch => Some("tenant mismatch"),
            AuthorizationError::UnknownPrincipal => Some("unknown principal"),
            _ => None,
        }
    }

    /// Id of the deciding policy, if any.
    pub fn policy_id(&self) -> Option<&str> {
        match self {
            AuthorizationError::Denied { policy_id, .. } => policy_id.as_deref(),
            _ => None,
        }
    }
}

/// Credential resolution failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialError {
    /// Nothing usable is configured for this tenant and provider.
    #[error("missing credential for provider '{provider}'")]
    Missing {
        /// Requested provider.
        provider: ProviderId,
    },

    /// The stored credential is owned by another tenant.
    #[error("invalid credential: tenant mismatch")]
    TenantMismatch,

    /// The stored credential was issued for another provider.
    #[error("invalid credential: issued for provider '{stored}', requested '{requested}'")]
    ProviderMismatch {
        /// Provider recorded on the credential.
        stored: ProviderId,
        /// Provider the request targets.
        requested: ProviderId,
    },

    /// The secrets port failed.
    #[error("credential store unavailable")]
    StoreUnavailable(String),
}

impl CredentialError {
    /// `true` for the `MissingCredential` class.
    pub fn is_missing(&self) -> bool {
        matches!(self, CredentialError::Missing { .. })
    }

    /// `true` for the `InvalidCredential` class.
    pub fn is_invalid(&self) -> bool {
        matches!(
            self,
            CredentialError::TenantMismatch | CredentialError::ProviderMismatch { .. }
        )
    }
}

/// The audit port did not accept the intent record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("audit sink unavailable")]
pub struct AuditError {
    detail: String,
}

impl AuditError {
    /// Creates an audit error with an internal detail message.
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    /// Internal detail; for logs only.
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

/// Provider I/O failed after the intent was audited.
///
/// Always reported with status 502. The message has been scrubbed of the
/// credential used for the call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("provider '{provider}' failed during {operation}: {message}")]
pub struct ProviderError {
    provider: ProviderId,
    operation: OperationKind,
    message: String,
}

impl ProviderError {
    /// Status reported for provider failures.
    pub const STATUS: u16 = 502;

    pub(crate) fn new(provider: ProviderId, operation: OperationKind, message: String) -> Self {
        Self {
            provider,
            operation,
            message,
        }
    }

    /// Provider that failed.
    pub fn provider(&self) -> &ProviderId {
        &self.provider
    }

    /// Operation that was running.
    pub fn operation(&self) -> OperationKind {
        self.operation
    }

    /// Scrubbed failure message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Always 502.
    pub fn status(&self) -> u16 {
        Self::STATUS
    }
}

/// Every way `execute_operation` can fail.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BrokerError {
    /// Malformed request (including unsupported operation types).
    #[error(transparent)]
    Request(#[from] RequestError),

    /// No provider adapter is registered under this id.
    #[error("unsupported provider '{0}'")]
    UnsupportedProvider(ProviderId),

    /// Authorization gate denied the request.
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    /// Credential resolution failed.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Intent could not be audited; nothing was executed.
    #[error(transparent)]
    Audit(#[from] AuditError),

    /// Provider execution failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl BrokerError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            BrokerError::Request(RequestError::UnsupportedOperation(_)) => "unsupported_operation",
            BrokerError::Request(_) => "invalid_request",
            BrokerError::UnsupportedProvider(_) => "unsupported_provider",
            BrokerError::Authorization(AuthorizationError::PolicyUnavailable(_)) => {
                "policy_unavailable"
            }
            BrokerError::Authorization(_) => "unauthorized",
            BrokerError::Credential(CredentialError::StoreUnavailable(_)) => {
                "credential_store_unavailable"
            }
            BrokerError::Credential(e) if e.is_missing() => "missing_credential",
            BrokerError::Credential(_) => "invalid_credential",
            BrokerError::Audit(_) => "audit_unavailable",
            BrokerError::Provider(_) => "provider_error",
        }
    }

    /// Status code for an HTTP binding.
    ///
    /// # Examples
    ///
    /// ```
    /// use credential_broker::{AuthorizationError, BrokerError};
    ///
    /// let err = BrokerError::from(AuthorizationError::TenantMismatch);
    /// assert_eq!(err.http_status(), 401);
    /// ```
    pub fn http_status(&self) -> u16 {
        match self {
            BrokerError::Request(_) | BrokerError::UnsupportedProvider(_) => 400,
            BrokerError::Authorization(AuthorizationError::PolicyUnavailable(_)) => 503,
            BrokerError::Authorization(_) => 401,
            BrokerError::Credential(CredentialError::StoreUnavailable(_)) => 503,
            BrokerError::Credential(_) => 401,
            BrokerError::Audit(_) => 503,
            BrokerError::Provider(e) => e.status(),
        }
    }
}
