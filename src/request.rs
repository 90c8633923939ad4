use std::fmt;

use serde::{Deserialize, Serialize};

use crate::correlation::CorrelationId;
use crate::operation::Operation;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an identifier.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns `true` if the identifier is empty or whitespace only.
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id! {
    /// Tenant isolation boundary.
    TenantId
}

string_id! {
    /// User acting within a tenant.
    UserId
}

string_id! {
    /// External system an operation targets (e.g. `supabase`).
    ProviderId
}

string_id! {
    /// Reference to a stored token or credential record.
    ///
    /// A reference, never the credential itself.
    TokenRef
}

/// A single request to run one provider operation on behalf of a tenant user.
///
/// Immutable once built: fields are private and there are no setters. The
/// correlation id is fixed at build time, generated if the caller gave none.
///
/// # Examples
///
/// ```
/// use credential_broker::{Operation, OperationRequest};
/// use serde_json::json;
///
/// let op = Operation::from_parts("create_table", json!({ "name": "docs" })).unwrap();
/// let request = OperationRequest::builder("tenant-1", "user-1", "supabase", op)
///     .correlation_id("corr-123")
///     .build();
///
/// assert_eq!(request.tenant_id().as_str(), "tenant-1");
/// assert_eq!(request.correlation_id().as_str(), "corr-123");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRequest {
    tenant_id: TenantId,
    user_id: UserId,
    correlation_id: CorrelationId,
    provider: ProviderId,
    operation: Operation,
    token_ref: Option<TokenRef>,
}

impl OperationRequest {
    /// Starts building a request.
    pub fn builder(
        tenant_id: impl Into<TenantId>,
        user_id: impl Into<UserId>,
        provider: impl Into<ProviderId>,
        operation: Operation,
    ) -> OperationRequestBuilder {
        OperationRequestBuilder {
            tenant_id: tenant_id.into(),
            user_id: user_id.into(),
            provider: provider.into(),
            operation,
            correlation_id: None,
            token_ref: None,
        }
    }

    /// Tenant the caller claims to act in.
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// User performing the operation.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Correlation id for this request.
    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    /// Provider the operation targets.
    pub fn provider(&self) -> &ProviderId {
        &self.provider
    }

    /// The typed operation and its payload.
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Optional reference selecting a specific stored credential.
    pub fn token_ref(&self) -> Option<&TokenRef> {
        self.token_ref.as_ref()
    }
}

/// Builder for [`OperationRequest`].
#[derive(Debug)]
pub struct OperationRequestBuilder {
    tenant_id: TenantId,
    user_id: UserId,
    provider: ProviderId,
    operation: Operation,
    correlation_id: Option<CorrelationId>,
    token_ref: Option<TokenRef>,
}

impl OperationRequestBuilder {
    /// Uses a caller-supplied correlation id. A blank id counts as absent
    /// and one is generated instead.
    pub fn correlation_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.correlation_id = Some(CorrelationId::from_header(Some(&id)));
        self
    }

    /// Sets the correlation id from an already-built value.
    pub fn with_correlation(mut self, id: CorrelationId) -> Self {
        self.correlation_id = Some(id);
        self
    }

    /// Selects a specific stored credential.
    pub fn token_ref(mut self, token_ref: impl Into<TokenRef>) -> Self {
        self.token_ref = Some(token_ref.into());
        self
    }

    /// Finishes the request, generating a correlation id if none was given.
    pub fn build(self) -> OperationRequest {
        OperationRequest {
            tenant_id: self.tenant_id,
            user_id: self.user_id,
            correlation_id: self.correlation_id.unwrap_or_else(CorrelationId::generate),
            provider: self.provider,
            operation: self.operation,
            token_ref: self.token_ref,
        }
    }
}
