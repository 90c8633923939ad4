//! Multi-tenant credential broker for third-party database providers.
//!
//! A caller asks to run one operation (create a table, query, insert, update,
//! delete) against a provider on behalf of a tenant. The broker:
//!
//! 1. asks the policy engine whether the user may perform the action,
//! 2. resolves the tenant's provider credential,
//! 3. records an audit event of the intent,
//! 4. runs the operation through the provider adapter.
//!
//! Callers never see credential material, and each step is only reachable
//! once the previous one succeeded:
//!
//! - [`Grant`]: proof of a positive policy decision, minted only by the
//!   [`AuthorizationGate`]
//! - [`CredentialHandle`]: credential material usable only for one grant
//! - [`AuditReceipt`]: proof the intent was recorded
//! - [`OperationCtx`]: type-state request context that moves through
//!   [`Pending`], [`Authorized`], [`Credentialed`] and [`Audited`]
//! - [`Secret<T>`] and [`SecretRedactor`]: redaction for logs and audit
//! - [`Tainted<T>`] and [`Verified<T>`]: untrusted input and its sanitized form
//!
//! External systems sit behind async ports ([`PolicyPort`], [`SecretsPort`],
//! [`AuditPort`], [`ProviderPort`]); [`StaticPolicy`], [`MemorySecrets`],
//! [`AuditTrail`] and [`TracingAuditSink`] are bundled implementations.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use credential_broker::{
//!     AuditRecorder, AuditTrail, AuthorizationGate, BrokerOrchestrator, CredentialBroker,
//!     CredentialMaterial, MemorySecrets, Operation, OperationRequest, PolicyRule,
//!     ProviderExecutor, Secret, StaticPolicy,
//! };
//! use serde_json::json;
//!
//! let policy = StaticPolicy::new()
//!     .with_member("user-1", "tenant-1")
//!     .with_rule(PolicyRule::allow_all("tenant-admin", "tenant-1"));
//! let secrets = MemorySecrets::new().with_credential(
//!     "tenant-1",
//!     "supabase",
//!     CredentialMaterial::endpoint("https://example.supabase.co", "SERVICE_ROLE_FAKE"),
//! );
//! let trail = Arc::new(AuditTrail::new());
//!
//! let orchestrator = BrokerOrchestrator::new(
//!     AuthorizationGate::new(Arc::new(policy)),
//!     CredentialBroker::new(Arc::new(secrets)),
//!     AuditRecorder::new(trail.clone()),
//!     ProviderExecutor::new(), // no adapters registered
//! );
//!
//! let op = Operation::from_parts("create_table", json!({ "name": "docs" })).unwrap();
//! let request = OperationRequest::builder("tenant-1", "user-1", "supabase", op).build();
//!
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! let err = rt.block_on(orchestrator.execute_operation(request)).unwrap_err();
//! assert_eq!(err.code(), "unsupported_provider");
//! assert!(trail.is_empty());
//!
//! // Secrets are redacted wherever they are formatted.
//! let key = Secret::new("SERVICE_ROLE_FAKE".to_string());
//! assert_eq!(format!("{:?}", key), "[REDACTED]");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod audit;
mod broker;
mod capability;
mod config;
mod context;
mod correlation;
mod credential;
mod error;
mod gate;
mod logging;
mod memory;
mod operation;
mod orchestrator;
mod policy;
mod provider;
mod redact;
mod request;
mod sanitizer;
mod secret;
mod state;
mod tainted;
mod verified;
pub mod web;

#[cfg(test)]
mod test_utils;

pub use audit::{
    AuditEvent, AuditOutcome, AuditPort, AuditRecorder, AuditTrail, AuditValue, TracingAuditSink,
    AUDIT_TARGET, OPERATION_ACTION,
};
pub use broker::CredentialBroker;
pub use capability::{AuditReceipt, Grant};
pub use config::{BrokerConfig, ConfigError};
pub use context::OperationCtx;
pub use correlation::{CorrelationId, CORRELATION_HEADER};
pub use credential::{CredentialHandle, CredentialMaterial, SecretsPort, StoredCredential};
pub use error::{
    AuditError, AuthorizationError, BrokerError, CredentialError, ProviderError, RequestError,
};
pub use gate::AuthorizationGate;
pub use logging::{init as init_logging, RequestLog};
pub use memory::{MemorySecrets, PolicyRule, StaticPolicy, NO_MATCHING_POLICY};
pub use operation::{ColumnDef, CreateTable, Delete, Insert, Operation, OperationKind, Query, Update};
pub use orchestrator::BrokerOrchestrator;
pub use policy::{
    Action, PolicyDecision, PolicyError, PolicyPort, PolicyQuery, PolicyVerdict, Resource,
};
pub use provider::{ProviderExecutor, ProviderFailure, ProviderPort, ProviderResponse, ProviderResult};
pub use redact::SecretRedactor;
pub use request::{OperationRequest, OperationRequestBuilder, ProviderId, TenantId, TokenRef, UserId};
pub use sanitizer::{
    IdentifierSanitizer, SanitizationError, SanitizationErrorKind, Sanitizer, StringSanitizer,
};
pub use secret::Secret;
pub use state::{Audited, Authorized, Credentialed, Pending, Stage};
pub use tainted::Tainted;
pub use verified::Verified;
