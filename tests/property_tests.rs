//! Cross-component properties of the broker pipeline.
//!
//! Requests are generated over a mix of known and unknown tenants, users
//! and credentials, then run through the orchestrator with counting doubles.

mod common;

use common::{harness, Harness, DECIDE, EXECUTE, PROVIDER, RECORD, RESOLVE, URL};
use credential_broker::{
    BrokerError, CredentialMaterial, MemorySecrets, Operation, OperationRequest, ProviderResult,
};
use proptest::prelude::*;
use serde_json::json;

fn arb_tenant() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("tenant-1".to_string()),
        Just("tenant-2".to_string()),
        "[a-z][a-z0-9-]{2,12}",
    ]
}

fn arb_user() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("user-1".to_string()),
        Just("user-2".to_string()),
        "[a-z][a-z0-9_.]{2,12}",
    ]
}

fn arb_correlation() -> impl Strategy<Value = String> {
    "corr-[a-z0-9]{4,16}"
}

/// Secrets never overlap with identifiers, which are lower-case.
fn arb_secret() -> impl Strategy<Value = String> {
    "[A-Z][A-Z_]{15,31}"
}

fn arb_operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        Just(("create_table", json!({ "name": "docs" }))),
        Just(("query", json!({ "table": "docs" }))),
        Just(("insert", json!({ "table": "docs", "rows": [{ "title": "x" }] }))),
        Just(("delete", json!({ "table": "docs", "filter": { "id": 7 } }))),
    ]
    .prop_map(|(kind, payload)| Operation::from_parts(kind, payload).unwrap())
}

struct Run {
    h: Harness,
    result: Result<ProviderResult, BrokerError>,
}

fn run(tenant: &str, user: &str, correlation: &str, secret: &str, op: Operation) -> Run {
    let h = harness()
        .secrets(MemorySecrets::new().with_credential(
            "tenant-1",
            PROVIDER,
            CredentialMaterial::endpoint(URL, secret),
        ))
        .build();
    let request = OperationRequest::builder(tenant, user, PROVIDER, op)
        .correlation_id(correlation)
        .build();

    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let result = rt.block_on(h.orchestrator.execute_operation(request));
    Run { h, result }
}

proptest! {
    /// P1: a denied request never reaches the secrets store or the audit log.
    #[test]
    fn proptest_denial_is_fail_fast(
        tenant in arb_tenant(),
        user in arb_user(),
        correlation in arb_correlation(),
        secret in arb_secret(),
        op in arb_operation(),
    ) {
        let Run { h, result } = run(&tenant, &user, &correlation, &secret, op);

        if let Err(BrokerError::Authorization(_)) = result {
            prop_assert_eq!(h.probe.count(RESOLVE), 0);
            prop_assert_eq!(h.probe.count(RECORD), 0);
            prop_assert_eq!(h.probe.count(EXECUTE), 0);
            prop_assert!(h.trail.is_empty());
        }
    }

    /// P2: an authorized, credentialed request is audited exactly once and
    /// the recorded event never contains the secret.
    #[test]
    fn proptest_authorized_requests_are_audited_once(
        user in arb_user(),
        correlation in arb_correlation(),
        secret in arb_secret(),
        op in arb_operation(),
    ) {
        let Run { h, result } = run("tenant-1", &user, &correlation, &secret, op);

        match result {
            Err(BrokerError::Authorization(_)) => {
                prop_assert_eq!(h.probe.count(RECORD), 0);
            }
            _ => {
                prop_assert_eq!(h.probe.count(RECORD), 1);
                let events = h.trail.events();
                prop_assert_eq!(events.len(), 1);
                let json = events[0].to_json().unwrap();
                prop_assert!(!json.contains(&secret));
                prop_assert!(!events[0].to_string().contains(&secret));
            }
        }
    }

    /// P3: the credential store is only consulted after the policy allowed.
    #[test]
    fn proptest_resolve_follows_allow(
        tenant in arb_tenant(),
        user in arb_user(),
        correlation in arb_correlation(),
        secret in arb_secret(),
        op in arb_operation(),
    ) {
        let Run { h, result } = run(&tenant, &user, &correlation, &secret, op);
        let calls = h.probe.calls();

        if let Some(resolve_at) = calls.iter().position(|c| *c == RESOLVE) {
            prop_assert_eq!(calls.iter().position(|c| *c == DECIDE), Some(0));
            prop_assert!(resolve_at > 0);
            prop_assert!(!matches!(result, Err(BrokerError::Authorization(_))));
        }
    }

    /// P4: every port and the result see the request's correlation id.
    #[test]
    fn proptest_correlation_propagates(
        tenant in arb_tenant(),
        user in arb_user(),
        correlation in arb_correlation(),
        secret in arb_secret(),
        op in arb_operation(),
    ) {
        let Run { h, result } = run(&tenant, &user, &correlation, &secret, op);

        for (port, seen) in h.probe.correlation_ids() {
            if port != RESOLVE {
                prop_assert_eq!(&seen, &correlation, "port {}", port);
            }
        }
        for event in h.trail.events() {
            prop_assert_eq!(event.correlation_id().as_str(), correlation.as_str());
        }
        if let Ok(result) = result {
            prop_assert_eq!(result.correlation_id.as_str(), correlation.as_str());
        }
    }
}
