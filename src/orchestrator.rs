use tracing::Instrument;

use crate::audit::AuditRecorder;
use crate::broker::CredentialBroker;
use crate::context::OperationCtx;
use crate::error::BrokerError;
use crate::gate::AuthorizationGate;
use crate::logging::RequestLog;
use crate::provider::{ProviderExecutor, ProviderResult};
use crate::request::OperationRequest;
use crate::state::Stage;

/// Runs one operation request through gate, broker, audit and provider.
///
/// ```text
/// PENDING -> AUTHORIZED -> CREDENTIALED -> AUDITED -> EXECUTED -> SUCCEEDED | FAILED
/// ```
///
/// Each step awaits exactly one port call and the steps never overlap. A
/// failure at any step ends the request; nothing is retried. Holds no
/// per-request state, so one orchestrator serves concurrent requests.
#[derive(Debug, Clone)]
pub struct BrokerOrchestrator {
    gate: AuthorizationGate,
    broker: CredentialBroker,
    recorder: AuditRecorder,
    executor: ProviderExecutor,
}

impl BrokerOrchestrator {
    /// Wires the four components together.
    pub fn new(
        gate: AuthorizationGate,
        broker: CredentialBroker,
        recorder: AuditRecorder,
        executor: ProviderExecutor,
    ) -> Self {
        Self {
            gate,
            broker,
            recorder,
            executor,
        }
    }

    /// Authorizes, resolves, audits and executes `request`.
    ///
    /// # Errors
    ///
    /// - [`BrokerError::Request`] if the operation payload breaks a rule,
    ///   before any port call
    /// - [`BrokerError::UnsupportedProvider`] before any port call
    /// - [`BrokerError::Authorization`] with no credential lookup and no audit
    /// - [`BrokerError::Credential`] with no audit and no execution
    /// - [`BrokerError::Audit`] with no execution
    /// - [`BrokerError::Provider`] after the intent was recorded
    ///
    /// A provider that answers with a non-2xx status is not an error: the
    /// result comes back with `ok: false`.
    pub async fn execute_operation(
        &self,
        request: OperationRequest,
    ) -> Result<ProviderResult, BrokerError> {
        let span = tracing::info_span!(
            "operation",
            correlation_id = %request.correlation_id(),
            tenant_id = %request.tenant_id(),
            user_id = %request.user_id(),
            provider = %request.provider(),
            operation = %request.operation().kind(),
        );

        let correlation_id = request.correlation_id().clone();
        let result = self.run(request).instrument(span.clone()).await;

        let _entered = span.enter();
        let log = RequestLog::new(&correlation_id);
        match &result {
            Ok(r) if r.ok => log.info(format_args!("{} status={}", Stage::Succeeded, r.status)),
            Ok(r) => log.warn(format_args!("{} provider status={}", Stage::Failed, r.status)),
            Err(e) => log.warn(format_args!("{} {}: {}", Stage::Failed, e.code(), e)),
        }

        result
    }

    async fn run(&self, request: OperationRequest) -> Result<ProviderResult, BrokerError> {
        request.operation().validate()?;
        if !self.executor.supports(request.provider()) {
            return Err(BrokerError::UnsupportedProvider(request.provider().clone()));
        }

        let ctx = OperationCtx::new(request);
        let grant = self.gate.decide(ctx.policy_query()).await?;
        let ctx = ctx.authorize(grant)?;
        tracing::debug!(stage = %ctx.stage(), "policy allowed");

        let credential = self
            .broker
            .resolve(ctx.grant(), ctx.request().provider(), ctx.request().token_ref())
            .await?;
        let ctx = ctx.with_credential(credential);
        tracing::debug!(stage = %ctx.stage(), "credential resolved");

        let receipt = self.recorder.record(ctx.audit_event()).await?;
        let ctx = ctx.audited(receipt)?;
        tracing::debug!(
            stage = %ctx.stage(),
            receipt = %ctx.receipt().correlation_id(),
            "intent recorded"
        );

        let (request, credential) = ctx.into_execution();
        let result = self
            .executor
            .execute(
                request.provider(),
                request.operation(),
                credential,
                request.correlation_id(),
            )
            .await?;
        tracing::debug!(stage = %Stage::Executed, ok = result.ok, "provider returned");

        Ok(result)
    }
}
