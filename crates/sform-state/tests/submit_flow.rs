//! Integration test: full edit → validate → submit flows through a
//! recording sink.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use proptest::prelude::*;
use serde_json::{json, Value};

use sform_core::FieldPath;
use sform_schema::{discriminant_path, Schema, ValidatorCache};
use sform_state::{FormSession, SessionConfig, SinkError, SubmitError, SubmitSink};

/// Records every payload; optionally fails every call.
#[derive(Default, Clone)]
struct RecordingSink {
    received: Arc<Mutex<Vec<Value>>>,
    fail_with: Option<String>,
}

impl RecordingSink {
    fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    fn received(&self) -> Vec<Value> {
        self.received.lock().clone()
    }
}

#[async_trait]
impl SubmitSink for RecordingSink {
    async fn submit(&self, payload: &Value) -> Result<(), SinkError> {
        self.received.lock().push(payload.clone());
        match &self.fail_with {
            Some(message) => Err(SinkError::Custom(message.clone())),
            None => Ok(()),
        }
    }
}

/// Never answers.
struct HangingSink;

#[async_trait]
impl SubmitSink for HangingSink {
    async fn submit(&self, _payload: &Value) -> Result<(), SinkError> {
        std::future::pending().await
    }
}

fn host_port() -> Schema {
    Schema::from_value(json!({
        "properties": {
            "host": {"type": "string"},
            "port": {"type": "string", "enum": ["80", "443"]}
        },
        "required": ["host"]
    }))
    .unwrap()
}

fn connector() -> Schema {
    Schema::from_value(json!({
        "type": "object",
        "required": ["host"],
        "properties": {
            "host": {"type": "string"},
            "auth": {
                "type": "object",
                "oneOf": [
                    {"title": "None", "type": "object"},
                    {
                        "title": "Token",
                        "type": "object",
                        "required": ["token"],
                        "properties": {"token": {"type": "string"}}
                    }
                ]
            }
        }
    }))
    .unwrap()
}

fn session(schema: Schema, initial: Value) -> FormSession {
    FormSession::new(schema, initial, &ValidatorCache::new(), SessionConfig::default()).unwrap()
}

fn path(dotted: &str) -> FieldPath {
    FieldPath::parse_dotted(dotted)
}

#[tokio::test]
async fn test_empty_host_blocks_submission() {
    let sink = RecordingSink::default();
    let mut s = session(host_port(), json!({"name": "c1", "host": "", "port": "80"}));
    let err = s.submit(&sink).await.unwrap_err();
    assert!(matches!(err, SubmitError::Invalid { count: 1 }));
    assert!(s.errors().get_dotted("host").is_some());
    assert!(s.errors().get_dotted("port").is_none());
    assert!(sink.received().is_empty());
}

#[tokio::test]
async fn test_valid_form_reaches_sink_exactly() {
    let sink = RecordingSink::default();
    let mut s = session(host_port(), json!({"name": "c1", "host": "", "port": "80"}));
    s.on_change(&path("host"), json!("x"));
    s.submit(&sink).await.unwrap();
    assert!(s.errors().is_empty());
    assert_eq!(
        sink.received(),
        [json!({"name": "c1", "host": "x", "port": "80"})]
    );
    assert!(!s.is_busy());
}

#[tokio::test]
async fn test_sink_failure_banner_is_retryable() {
    let failing = RecordingSink::failing("503 from upstream");
    let mut s = session(host_port(), json!({"name": "c1", "host": "x"}));
    let err = s.submit(&failing).await.unwrap_err();
    assert!(matches!(err, SubmitError::Sink(_)));
    assert_eq!(s.banner(), Some("Submission failed: 503 from upstream"));
    assert!(s.errors().is_empty());

    let ok = RecordingSink::default();
    s.submit(&ok).await.unwrap();
    assert_eq!(s.banner(), None);
    assert_eq!(ok.received().len(), 1);
}

#[tokio::test]
async fn test_timed_out_submission_can_be_retried() {
    let mut s = session(host_port(), json!({"name": "c1", "host": "x"}));
    let outcome = tokio::time::timeout(Duration::from_millis(50), s.submit(&HangingSink)).await;
    assert!(outcome.is_err());
    assert!(!s.is_busy());

    let sink = RecordingSink::default();
    s.submit(&sink).await.unwrap();
    assert_eq!(sink.received(), [json!({"name": "c1", "host": "x"})]);
    assert!(!s.is_busy());
}

#[tokio::test]
async fn test_branch_switch_submits_active_branch_only() {
    let sink = RecordingSink::default();
    let mut s = session(connector(), json!({"name": "c1", "host": "db"}));

    s.on_change(&discriminant_path(&path("auth")), json!("Token"));
    s.on_change(&path("auth.token"), json!("secret"));
    s.on_change(&discriminant_path(&path("auth")), json!("None"));
    s.submit(&sink).await.unwrap();
    assert_eq!(sink.received()[0], json!({"name": "c1", "host": "db", "auth": {}}));
    assert_eq!(s.values()["auth"]["token"], "secret");

    s.on_change(&discriminant_path(&path("auth")), json!("Token"));
    s.submit(&sink).await.unwrap();
    assert_eq!(
        sink.received()[1],
        json!({"name": "c1", "host": "db", "auth": {"token": "secret"}})
    );
}

#[tokio::test]
async fn test_dormant_values_submitted_when_pruning_disabled() {
    let sink = RecordingSink::default();
    let config = SessionConfig {
        prune_inactive_branches: false,
        ..SessionConfig::default()
    };
    let mut s = FormSession::new(
        connector(),
        json!({"name": "c1", "host": "db", "auth": {"token": "secret"}}),
        &ValidatorCache::new(),
        config,
    )
    .unwrap();
    s.submit(&sink).await.unwrap();
    assert_eq!(sink.received()[0]["auth"], json!({"token": "secret"}));
}

#[tokio::test]
async fn test_active_branch_requirement_blocks_submission() {
    let sink = RecordingSink::default();
    let mut s = session(connector(), json!({"name": "c1", "host": "db"}));
    s.on_change(&discriminant_path(&path("auth")), json!("Token"));
    s.on_change(&path("auth.token"), json!(""));
    let err = s.submit(&sink).await.unwrap_err();
    assert!(matches!(err, SubmitError::Invalid { .. }));
    assert!(s.errors().get_dotted("auth.token").is_some(), "{:?}", s.errors());
    assert!(sink.received().is_empty());
}

proptest! {
    #[test]
    fn prop_validation_is_deterministic(host in ".{0,12}", port in "(80|443|22)?") {
        let mut s = session(host_port(), json!({"name": "c1", "host": host, "port": port}));
        let first = s.validate().clone();
        let second = s.validate().clone();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_normalization_is_idempotent(token in "[a-z]{0,6}") {
        let mut s = session(connector(), json!({"name": "c1", "auth": {"token": token}}));
        s.validate();
        let once = s.values().clone();
        s.validate();
        prop_assert_eq!(s.values(), &once);
    }
}
