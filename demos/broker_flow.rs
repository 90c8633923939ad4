//! Credential broker walkthrough.
//!
//! Wires the in-memory policy and secrets adapters, the tracing audit sink
//! and a toy table provider, then runs a few requests through the broker:
//! 1. An allowed `create_table`
//! 2. A request the policy denies
//! 3. A request using another tenant's token
//! 4. An `insert` the provider rejects
//!
//! Run with: `cargo run --example broker_flow`
//! Set `BROKER_JSON_LOGS=1` for JSON output.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use credential_broker::web::{respond, ExtractOperationRequest, RequestAdapter};
use credential_broker::{
    init_logging, AuditRecorder, AuthorizationGate, BrokerConfig, BrokerOrchestrator,
    CredentialBroker, CredentialHandle, CredentialMaterial, MemorySecrets, Operation,
    PolicyRule, ProviderExecutor, ProviderFailure, ProviderPort, ProviderResponse, StaticPolicy,
    StoredCredential, TracingAuditSink,
};
use serde_json::json;

/// Provider that keeps tables in memory and checks the endpoint key.
struct TableProvider {
    expected_key: String,
    tables: Mutex<HashMap<String, usize>>,
}

#[async_trait]
impl ProviderPort for TableProvider {
    async fn execute(
        &self,
        operation: &Operation,
        credential: &CredentialHandle,
    ) -> Result<ProviderResponse, ProviderFailure> {
        let CredentialMaterial::Endpoint { key, .. } = credential.material() else {
            return Ok(ProviderResponse::failed(401, "endpoint credential required"));
        };
        if key.expose_secret() != &self.expected_key {
            return Ok(ProviderResponse::failed(401, "bad service key"));
        }

        let mut tables = self
            .tables
            .lock()
            .map_err(|_| ProviderFailure::new("table store poisoned"))?;
        let response = match operation {
            Operation::CreateTable(op) if tables.contains_key(&op.name) => {
                ProviderResponse::failed(409, format!("table '{}' already exists", op.name))
            }
            Operation::CreateTable(op) => {
                tables.insert(op.name.clone(), 0);
                ProviderResponse::ok(201, Some(json!({ "table": op.name })))
            }
            Operation::Insert(op) => match tables.get_mut(&op.table) {
                Some(rows) => {
                    *rows += op.rows.len();
                    ProviderResponse::ok(201, Some(json!({ "inserted": op.rows.len() })))
                }
                None => ProviderResponse::failed(404, format!("no table '{}'", op.table)),
            },
            other => ProviderResponse::ok(200, Some(json!({ "table": other.table() }))),
        };
        Ok(response)
    }
}

fn request(tenant: &str, user: &str, correlation: &str, body: serde_json::Value) -> RequestAdapter {
    RequestAdapter::new()
        .with_header("x-tenant-id", tenant)
        .with_header("x-user-id", user)
        .with_header("x-correlation-id", correlation)
        .with_body(body)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = BrokerConfig::from_env()?;
    init_logging(&config);

    println!("=== Credential Broker Example ===\n");

    let policy = StaticPolicy::new()
        .with_member("alice", "tenant-1")
        .with_member("bob", "tenant-2")
        .with_rule(PolicyRule::allow_all("tenant-1-admin", "tenant-1"));

    let secrets = MemorySecrets::new()
        .with_credential(
            "tenant-1",
            "supabase",
            CredentialMaterial::endpoint("https://example.supabase.co", "SERVICE_ROLE_FAKE"),
        )
        .with_token(
            "tok-tenant-2",
            StoredCredential {
                tenant_id: "tenant-2".into(),
                provider: "supabase".into(),
                material: CredentialMaterial::endpoint("https://other.supabase.co", "OTHER_KEY"),
                token_ref: Some("tok-tenant-2".into()),
            },
        );

    let provider = TableProvider {
        expected_key: "SERVICE_ROLE_FAKE".to_string(),
        tables: Mutex::new(HashMap::new()),
    };

    let orchestrator = BrokerOrchestrator::new(
        AuthorizationGate::new(Arc::new(policy)),
        CredentialBroker::new(Arc::new(secrets)),
        AuditRecorder::new(Arc::new(TracingAuditSink::with_redaction(
            config.redact_audit_metadata,
        ))),
        ProviderExecutor::new().with_provider("supabase", Arc::new(provider)),
    );

    let scenarios = [
        (
            "Allowed create_table",
            request(
                "tenant-1",
                "alice",
                "corr-001",
                json!({
                    "provider": "supabase",
                    "operation": { "type": "create_table", "payload": { "name": "docs" } }
                }),
            ),
        ),
        (
            "Denied by policy",
            request(
                "tenant-2",
                "bob",
                "corr-002",
                json!({
                    "provider": "supabase",
                    "operation": { "type": "query", "payload": { "table": "docs" } }
                }),
            ),
        ),
        (
            "Another tenant's token",
            request(
                "tenant-1",
                "alice",
                "corr-003",
                json!({
                    "provider": "supabase",
                    "operation": { "type": "query", "payload": { "table": "docs" } },
                    "token_ref": "tok-tenant-2"
                }),
            ),
        ),
        (
            "Provider rejects insert",
            request(
                "tenant-1",
                "alice",
                "corr-004",
                json!({
                    "provider": "supabase",
                    "operation": {
                        "type": "insert",
                        "payload": { "table": "missing", "rows": [{ "title": "x" }] }
                    }
                }),
            ),
        ),
    ];

    for (title, adapter) in scenarios {
        println!("--- {} ---", title);
        let request = match adapter.extract_request(&config) {
            Ok(request) => request,
            Err(e) => {
                println!("rejected at the boundary: {}\n", e);
                continue;
            }
        };
        let correlation_id = request.correlation_id().clone();

        let (status, body) = respond(orchestrator.execute_operation(request).await, &correlation_id);
        println!("{} {}\n", status, serde_json::to_string_pretty(&body)?);
    }

    println!("=== Example Complete ===");
    Ok(())
}
