//! Shared port doubles for the integration tests.
//!
//! Every double writes to one [`Probe`], so a test can assert on call
//! counts, call order and the correlation id each port saw.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use credential_broker::{
    AuditError, AuditEvent, AuditPort, AuditRecorder, AuditTrail, AuthorizationGate,
    BrokerOrchestrator, CredentialBroker, CredentialError, CredentialHandle, CredentialMaterial,
    MemorySecrets, Operation, OperationRequest, PolicyError, PolicyPort, PolicyQuery, PolicyRule,
    PolicyVerdict, ProviderExecutor, ProviderFailure, ProviderId, ProviderPort, ProviderResponse,
    SecretsPort, StaticPolicy, StoredCredential, TenantId, TokenRef,
};
use serde_json::json;

pub const PROVIDER: &str = "supabase";
pub const URL: &str = "https://example.supabase.co";
pub const KEY: &str = "SERVICE_ROLE_FAKE";

pub const DECIDE: &str = "decide";
pub const RESOLVE: &str = "resolve";
pub const RECORD: &str = "record";
pub const EXECUTE: &str = "execute";

#[derive(Debug, Default)]
struct ProbeState {
    calls: Vec<&'static str>,
    correlation_ids: Vec<(&'static str, String)>,
    keys_seen: Vec<String>,
}

/// Shared call log.
#[derive(Debug, Clone, Default)]
pub struct Probe {
    state: Arc<Mutex<ProbeState>>,
}

impl Probe {
    fn hit(&self, port: &'static str, correlation_id: &str) {
        let mut state = self.state.lock().unwrap();
        state.calls.push(port);
        state.correlation_ids.push((port, correlation_id.to_string()));
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, port: &str) -> usize {
        self.calls().iter().filter(|c| **c == port).count()
    }

    /// Correlation ids seen by each port, in call order.
    pub fn correlation_ids(&self) -> Vec<(&'static str, String)> {
        self.state.lock().unwrap().correlation_ids.clone()
    }

    /// Secret material the provider double received.
    pub fn keys_seen(&self) -> Vec<String> {
        self.state.lock().unwrap().keys_seen.clone()
    }
}

struct RecordingPolicy {
    inner: StaticPolicy,
    probe: Probe,
}

#[async_trait]
impl PolicyPort for RecordingPolicy {
    async fn decide(&self, query: &PolicyQuery) -> Result<PolicyVerdict, PolicyError> {
        self.probe.hit(DECIDE, query.correlation_id.as_str());
        self.inner.decide(query).await
    }
}

struct RecordingSecrets {
    inner: MemorySecrets,
    probe: Probe,
}

#[async_trait]
impl SecretsPort for RecordingSecrets {
    async fn get_credential(
        &self,
        tenant: &TenantId,
        provider: &ProviderId,
        token_ref: Option<&TokenRef>,
    ) -> Result<StoredCredential, CredentialError> {
        self.probe.hit(RESOLVE, "");
        self.inner.get_credential(tenant, provider, token_ref).await
    }
}

struct RecordingAudit {
    trail: Arc<AuditTrail>,
    probe: Probe,
    fail: bool,
}

#[async_trait]
impl AuditPort for RecordingAudit {
    async fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        self.probe.hit(RECORD, event.correlation_id().as_str());
        if self.fail {
            return Err(AuditError::new("audit store rejected write"));
        }
        self.trail.record(event).await
    }
}

/// What the provider double does when called.
#[derive(Debug, Clone)]
pub enum ProviderOutcome {
    Respond(ProviderResponse),
    Fail(String),
}

struct RecordingProvider {
    outcome: ProviderOutcome,
    probe: Probe,
}

#[async_trait]
impl ProviderPort for RecordingProvider {
    async fn execute(
        &self,
        _operation: &Operation,
        credential: &CredentialHandle,
    ) -> Result<ProviderResponse, ProviderFailure> {
        self.probe.hit(EXECUTE, credential.correlation_id().as_str());
        if let CredentialMaterial::Endpoint { key, .. } = credential.material() {
            self.probe
                .state
                .lock()
                .unwrap()
                .keys_seen
                .push(key.expose_secret().clone());
        }
        match &self.outcome {
            ProviderOutcome::Respond(response) => Ok(response.clone()),
            ProviderOutcome::Fail(message) => Err(ProviderFailure::new(message.clone())),
        }
    }
}

/// `user-1` belongs to `tenant-1`, which may do anything on any provider.
/// `user-2` belongs to `tenant-2`, which has no rules.
pub fn default_policy() -> StaticPolicy {
    StaticPolicy::new()
        .with_member("user-1", "tenant-1")
        .with_member("user-2", "tenant-2")
        .with_rule(PolicyRule::allow_all("tenant-1-admin", "tenant-1"))
}

pub fn default_secrets() -> MemorySecrets {
    MemorySecrets::new().with_credential("tenant-1", PROVIDER, CredentialMaterial::endpoint(URL, KEY))
}

pub struct HarnessBuilder {
    policy: StaticPolicy,
    secrets: MemorySecrets,
    outcome: ProviderOutcome,
    audit_fails: bool,
}

impl HarnessBuilder {
    pub fn policy(mut self, policy: StaticPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn secrets(mut self, secrets: MemorySecrets) -> Self {
        self.secrets = secrets;
        self
    }

    pub fn provider_responds(mut self, response: ProviderResponse) -> Self {
        self.outcome = ProviderOutcome::Respond(response);
        self
    }

    pub fn provider_fails(mut self, message: &str) -> Self {
        self.outcome = ProviderOutcome::Fail(message.to_string());
        self
    }

    pub fn audit_fails(mut self) -> Self {
        self.audit_fails = true;
        self
    }

    pub fn build(self) -> Harness {
        let probe = Probe::default();
        let trail = Arc::new(AuditTrail::new());

        let orchestrator = BrokerOrchestrator::new(
            AuthorizationGate::new(Arc::new(RecordingPolicy {
                inner: self.policy,
                probe: probe.clone(),
            })),
            CredentialBroker::new(Arc::new(RecordingSecrets {
                inner: self.secrets,
                probe: probe.clone(),
            })),
            AuditRecorder::new(Arc::new(RecordingAudit {
                trail: trail.clone(),
                probe: probe.clone(),
                fail: self.audit_fails,
            })),
            ProviderExecutor::new().with_provider(
                PROVIDER,
                Arc::new(RecordingProvider {
                    outcome: self.outcome,
                    probe: probe.clone(),
                }),
            ),
        );

        Harness {
            orchestrator,
            probe,
            trail,
        }
    }
}

pub struct Harness {
    pub orchestrator: BrokerOrchestrator,
    pub probe: Probe,
    pub trail: Arc<AuditTrail>,
}

pub fn harness() -> HarnessBuilder {
    HarnessBuilder {
        policy: default_policy(),
        secrets: default_secrets(),
        outcome: ProviderOutcome::Respond(ProviderResponse::ok(200, Some(json!({ "created": true })))),
        audit_fails: false,
    }
}

pub fn create_table(tenant: &str, user: &str, correlation_id: &str) -> OperationRequest {
    let op = Operation::from_parts("create_table", json!({ "name": "docs" })).unwrap();
    OperationRequest::builder(tenant, user, PROVIDER, op)
        .correlation_id(correlation_id)
        .build()
}
