//! Pipeline states for [`OperationCtx`](crate::OperationCtx).
//!
//! Each state owns the evidence gathered to reach it, so a later state
//! cannot exist without the earlier proofs. States have private fields and
//! are built only by context transitions.

use std::fmt;

use crate::capability::{AuditReceipt, Grant};
use crate::credential::CredentialHandle;

/// Request received, nothing decided yet.
#[derive(Debug)]
pub struct Pending {
    _private: (),
}

impl Pending {
    pub(crate) fn new() -> Self {
        Self { _private: () }
    }
}

/// The gate allowed the request.
#[derive(Debug)]
pub struct Authorized {
    pub(crate) grant: Grant,
}

/// A credential has been resolved under the grant.
#[derive(Debug)]
pub struct Credentialed {
    pub(crate) grant: Grant,
    pub(crate) credential: CredentialHandle,
}

/// The intent event has been recorded. Only this state can execute.
#[derive(Debug)]
pub struct Audited {
    pub(crate) credential: CredentialHandle,
    pub(crate) receipt: AuditReceipt,
}

/// Runtime mirror of the pipeline position, for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Received.
    Pending,
    /// Policy allowed.
    Authorized,
    /// Credential resolved.
    Credentialed,
    /// Intent recorded.
    Audited,
    /// Provider called.
    Executed,
    /// Provider reported success.
    Succeeded,
    /// Stopped with an error or a provider failure.
    Failed,
}

impl Stage {
    /// Upper-case name used in log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Pending => "PENDING",
            Stage::Authorized => "AUTHORIZED",
            Stage::Credentialed => "CREDENTIALED",
            Stage::Audited => "AUDITED",
            Stage::Executed => "EXECUTED",
            Stage::Succeeded => "SUCCEEDED",
            Stage::Failed => "FAILED",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
