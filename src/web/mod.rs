//! Framework-agnostic HTTP binding.
//!
//! This module maps an HTTP request onto an [`OperationRequest`] and a
//! [`BrokerError`] back onto a status code and JSON body. It contains no
//! framework code; an axum or actix handler builds a [`RequestAdapter`] from
//! its own request type and calls into the orchestrator.
//!
//! # Design Principles
//!
//! 1. **Taint at Boundary**: every header and body field starts as
//!    [`Tainted`](crate::Tainted) and is sanitized before it becomes an id.
//! 2. **Identity is upstream**: `x-tenant-id` and `x-user-id` are set by an
//!    authenticating proxy. This module only validates their shape; the
//!    [`AuthorizationGate`](crate::AuthorizationGate) decides whether they
//!    may act.
//! 3. **Safe errors**: [`ErrorResponse`] carries the error code, the policy
//!    reason and the correlation id, never credential material.
//!
//! # Example Flow
//!
//! ```ignore
//! let adapter = RequestAdapter::from_parts(headers, body);
//! let request = adapter.extract_request(&config)?;
//! let correlation_id = request.correlation_id().clone();
//! let (status, body) = respond(orchestrator.execute_operation(request).await, &correlation_id);
//! ```
//!
//! [`OperationRequest`]: crate::OperationRequest
//! [`BrokerError`]: crate::BrokerError

mod adapter;
mod extract;
mod response;

pub use adapter::{RequestAdapter, TaintedInputs};
pub use extract::{ExtractOperationRequest, ExtractTaintedInputs};
pub use response::{respond, ErrorResponse, ResponseBody};

/// Header carrying the tenant id set by the upstream authenticator.
pub const TENANT_HEADER: &str = "x-tenant-id";

/// Header carrying the user id set by the upstream authenticator.
pub const USER_HEADER: &str = "x-user-id";
