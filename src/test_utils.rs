//! Shared fixtures for unit tests.

use proptest::prelude::*;

use crate::audit::AuditEvent;
use crate::capability::Grant;
use crate::correlation::CorrelationId;
use crate::operation::{CreateTable, Operation};
use crate::policy::{Action, PolicyDecision, Resource};
use crate::request::{OperationRequest, TenantId, UserId};

/// Strings that pass `StringSanitizer::new(max_len)` unchanged.
pub fn arb_valid_string(max_len: usize) -> impl Strategy<Value = String> {
    let pattern = format!("[a-zA-Z0-9][a-zA-Z0-9 _.-]{{0,{}}}[a-zA-Z0-9]", max_len.saturating_sub(2));
    prop::string::string_regex(&pattern).expect("valid regex")
}

/// Identifiers accepted by `IdentifierSanitizer`.
pub fn arb_identifier() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9][a-zA-Z0-9._:@-]{0,40}").expect("valid regex")
}

pub fn grant_for(correlation: &str) -> Grant {
    Grant::new(
        TenantId::new("tenant-1"),
        UserId::new("user-1"),
        Resource::new("provider:supabase"),
        Action::new("create_table"),
        PolicyDecision::allow("pol-1"),
        CorrelationId::new(correlation),
    )
}

pub fn intent_event_on_table(correlation: &str, table: &str) -> AuditEvent {
    let op = Operation::CreateTable(CreateTable {
        name: table.to_string(),
        columns: Vec::new(),
    });
    let request = OperationRequest::builder("tenant-1", "user-1", "supabase", op)
        .correlation_id(correlation)
        .build();
    AuditEvent::intent(&request, &grant_for(correlation))
}

pub fn intent_event(correlation: &str) -> AuditEvent {
    intent_event_on_table(correlation, "docs")
}
