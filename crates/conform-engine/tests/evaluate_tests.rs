//! Rule evaluation scenarios against in-memory collaborators.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use conform_core::baseline::BaselineLocator;
use conform_core::collaborators::{
    EvaluationReporter, InMemoryBaselineStore, InMemoryConfigHistory, Notifier, RecordingSink,
};
use conform_core::compare::ViolationKind;
use conform_core::compliance::{ComplianceStatus, Evaluation, Notification};
use conform_core::errors::{ExError, ExErrorKind, Result};
use conform_core::logging_facility::test_capture::init_test_capture;
use conform_core_types::schema::{
    EVENT_END, EVENT_END_ERROR, EVENT_START, FIELD_COMPLIANCE, FIELD_ERR_CODE, FIELD_REQUEST_ID,
    FIELD_RESOURCE_ID,
};
use conform_core_types::RequestContext;
use conform_engine::evaluate::FORCED_NON_COMPLIANCE_ANNOTATION;
use conform_engine::{evaluate, Collaborators, ConfigEvent, ItemSource};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const BUCKET: &str = "baselines/prod";
const TOPIC: &str = "arn:aws:sns:us-east-1:123456789012:compliance";

struct Fixture {
    baselines: InMemoryBaselineStore,
    history: InMemoryConfigHistory,
    sink: RecordingSink,
}

impl Fixture {
    fn new() -> Self {
        Self {
            baselines: InMemoryBaselineStore::new(),
            history: InMemoryConfigHistory::new(),
            sink: RecordingSink::new(),
        }
    }

    fn with_baseline(self, resource_id: &str, baseline: &Value) -> Self {
        let locator = BaselineLocator::parse(BUCKET).unwrap();
        self.baselines
            .insert(&locator, resource_id, baseline.to_string());
        self
    }

    fn collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            baselines: &self.baselines,
            history: &self.history,
            reporter: &self.sink,
            notifier: &self.sink,
        }
    }

    fn run(&self, event: &ConfigEvent) -> conform_engine::EvaluationOutcome {
        evaluate(event, &self.collaborators(), &RequestContext::new()).unwrap()
    }
}

fn bucket_item(status: &str, versioning: &str) -> Value {
    json!({
        "configurationItemStatus": status,
        "configurationItemCaptureTime": "2020-01-01T00:00:00.000Z",
        "resourceType": "AWS::S3::Bucket",
        "resourceId": "audit-logs",
        "supplementaryConfiguration": {
            "BucketVersioningConfiguration": {"status": versioning}
        }
    })
}

fn baseline() -> Value {
    json!({"supplementaryConfiguration": {"BucketVersioningConfiguration": {"status": "Enabled"}}})
}

fn event_with(invoking: Value, params: Value) -> ConfigEvent {
    let raw = json!({
        "invokingEvent": invoking.to_string(),
        "ruleParameters": params.to_string(),
        "resultToken": "token-123",
        "eventLeftScope": false,
        "configRuleName": "baseline-drift"
    });
    ConfigEvent::from_slice(raw.to_string().as_bytes()).unwrap()
}

fn item_event(item: Value, params: Value) -> ConfigEvent {
    event_with(json!({"configurationItem": item}), params)
}

// ---------------------------------------------------------------------------
// Verdicts
// ---------------------------------------------------------------------------

#[test]
fn test_matching_item_is_compliant() {
    let fixture = Fixture::new().with_baseline("audit-logs", &baseline());
    let event = item_event(bucket_item("OK", "Enabled"), json!({"Bucket": BUCKET, "TopicArn": TOPIC}));

    let outcome = fixture.run(&event);

    assert_eq!(outcome.compliance, ComplianceStatus::Compliant);
    assert_eq!(outcome.item_source, ItemSource::Event);
    assert!(outcome.baseline_digest.is_some());
    assert!(!outcome.notified);

    let evaluations = fixture.sink.evaluations();
    assert_eq!(evaluations.len(), 1);
    assert_eq!(evaluations[0].0, "token-123");
    assert_eq!(evaluations[0].1.annotation, None);
    assert_eq!(evaluations[0].1.ordering_timestamp.timestamp(), 1577836800);
    assert!(fixture.sink.notifications().is_empty());
}

#[test]
fn test_drift_is_reported_and_notified() {
    let fixture = Fixture::new().with_baseline("audit-logs", &baseline());
    let event = item_event(
        bucket_item("ResourceDiscovered", "Suspended"),
        json!({"Bucket": BUCKET, "TopicArn": TOPIC}),
    );

    let outcome = fixture.run(&event);

    assert_eq!(outcome.compliance, ComplianceStatus::NonCompliant);
    let violation = outcome.violation.as_ref().unwrap();
    assert_eq!(violation.kind, ViolationKind::ValueMismatch);
    assert_eq!(
        violation.path.to_string(),
        ".supplementaryConfiguration.BucketVersioningConfiguration.status"
    );
    assert!(outcome.notified);

    let notifications = fixture.sink.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].topic, TOPIC);
    assert_eq!(
        notifications[0].subject,
        "Non-compliance: baseline-drift AWS::S3::Bucket audit-logs"
    );
    assert_eq!(notifications[0].message, outcome.annotation);
}

#[test]
fn test_non_compliance_without_topic_is_not_notified() {
    let fixture = Fixture::new().with_baseline("audit-logs", &baseline());
    let event = item_event(bucket_item("OK", "Suspended"), json!({"Bucket": BUCKET}));

    let outcome = fixture.run(&event);

    assert_eq!(outcome.compliance, ComplianceStatus::NonCompliant);
    assert!(!outcome.notified);
    assert!(fixture.sink.notifications().is_empty());
}

#[test]
fn test_long_annotation_is_truncated_for_reporting_only() {
    let long_value = "v".repeat(400);
    let fixture = Fixture::new().with_baseline("audit-logs", &json!({"tags": {"note": long_value}}));
    let mut item = bucket_item("OK", "Enabled");
    item["tags"] = json!({"note": "short"});
    let event = item_event(item, json!({"Bucket": BUCKET, "TopicArn": TOPIC}));

    let outcome = fixture.run(&event);

    assert!(outcome.annotation.chars().count() > 255);
    let reported = outcome.evaluation.annotation.as_deref().unwrap();
    assert_eq!(reported.chars().count(), 255);
    assert!(outcome.annotation.starts_with(reported));
    assert_eq!(fixture.sink.notifications()[0].message, outcome.annotation);
}

// ---------------------------------------------------------------------------
// Applicability
// ---------------------------------------------------------------------------

#[test]
fn test_deleted_resource_is_not_applicable() {
    let fixture = Fixture::new().with_baseline("audit-logs", &baseline());
    let event = item_event(bucket_item("ResourceDeleted", "Suspended"), json!({"Bucket": BUCKET}));

    let outcome = fixture.run(&event);

    assert_eq!(outcome.compliance, ComplianceStatus::NotApplicable);
    assert_eq!(outcome.evaluation.annotation, None);
    assert_eq!(outcome.baseline_digest, None);
}

#[test]
fn test_left_scope_is_not_applicable() {
    let fixture = Fixture::new().with_baseline("audit-logs", &baseline());
    let raw = json!({
        "invokingEvent": json!({"configurationItem": bucket_item("OK", "Suspended")}).to_string(),
        "ruleParameters": json!({"Bucket": BUCKET}).to_string(),
        "resultToken": "token-123",
        "eventLeftScope": true,
        "configRuleName": "baseline-drift"
    });
    let event = ConfigEvent::from_slice(raw.to_string().as_bytes()).unwrap();

    assert_eq!(fixture.run(&event).compliance, ComplianceStatus::NotApplicable);
}

#[test]
fn test_resource_type_restriction() {
    let fixture = Fixture::new().with_baseline("audit-logs", &baseline());

    let excluded = item_event(
        bucket_item("OK", "Suspended"),
        json!({"Bucket": BUCKET, "ResourceTypes": "AWS::EC2::Instance,AWS::RDS::DBInstance"}),
    );
    assert_eq!(fixture.run(&excluded).compliance, ComplianceStatus::NotApplicable);

    let included = item_event(
        bucket_item("OK", "Suspended"),
        json!({"Bucket": BUCKET, "ResourceTypes": "AWS::EC2::Instance,AWS::S3::Bucket"}),
    );
    assert_eq!(fixture.run(&included).compliance, ComplianceStatus::NonCompliant);
}

#[test]
fn test_forced_non_compliance_skips_comparison() {
    let fixture = Fixture::new();
    let event = item_event(
        bucket_item("OK", "Enabled"),
        json!({"ForceNonCompliance": "", "TopicArn": TOPIC}),
    );

    let outcome = fixture.run(&event);

    assert_eq!(outcome.compliance, ComplianceStatus::NonCompliant);
    assert_eq!(outcome.annotation, FORCED_NON_COMPLIANCE_ANNOTATION);
    assert_eq!(outcome.baseline_digest, None);
    assert!(outcome.notified);
}

#[test]
fn test_forced_non_compliance_respects_applicability() {
    let fixture = Fixture::new();
    let event = item_event(
        bucket_item("ResourceDeleted", "Enabled"),
        json!({"ForceNonCompliance": "yes"}),
    );

    assert_eq!(fixture.run(&event).compliance, ComplianceStatus::NotApplicable);
}

// ---------------------------------------------------------------------------
// Baseline problems
// ---------------------------------------------------------------------------

#[test]
fn test_missing_baseline_is_insufficient_data() {
    let fixture = Fixture::new();
    let event = item_event(bucket_item("OK", "Enabled"), json!({"Bucket": BUCKET, "TopicArn": TOPIC}));

    let outcome = fixture.run(&event);

    assert_eq!(outcome.compliance, ComplianceStatus::InsufficientData);
    assert!(outcome.annotation.contains("prod/audit-logs"));
    assert!(!outcome.notified);
    assert_eq!(fixture.sink.evaluations().len(), 1);
}

#[test]
fn test_missing_bucket_parameter_is_insufficient_data() {
    let fixture = Fixture::new();
    let event = item_event(bucket_item("OK", "Enabled"), json!({}));

    let outcome = fixture.run(&event);

    assert_eq!(outcome.compliance, ComplianceStatus::InsufficientData);
    assert!(outcome.annotation.contains("Bucket"));
}

#[test]
fn test_corrupt_baseline_is_insufficient_data() {
    let fixture = Fixture::new();
    let locator = BaselineLocator::parse(BUCKET).unwrap();
    fixture.baselines.insert(&locator, "audit-logs", "{truncated");
    let event = item_event(bucket_item("OK", "Enabled"), json!({"Bucket": BUCKET}));

    assert_eq!(
        fixture.run(&event).compliance,
        ComplianceStatus::InsufficientData
    );
}

// ---------------------------------------------------------------------------
// Item from history
// ---------------------------------------------------------------------------

#[test]
fn test_summary_reads_normalized_history() {
    let fixture = Fixture::new().with_baseline(
        "audit-logs",
        &json!({"supplementaryConfiguration": {"bucketVersioningConfiguration": {"status": "Enabled"}}}),
    );
    fixture.history.insert(
        "AWS::S3::Bucket",
        "audit-logs",
        json!({
            "ConfigurationItemStatus": "OK",
            "ConfigurationItemCaptureTime": "2020-01-01T00:00:00Z",
            "ResourceType": "AWS::S3::Bucket",
            "ResourceId": "audit-logs",
            "SupplementaryConfiguration": {
                "BucketVersioningConfiguration": {"Status": "Enabled"}
            }
        }),
    );
    let event = event_with(
        json!({"configurationItemSummary": {"resourceType": "AWS::S3::Bucket", "resourceId": "audit-logs"}}),
        json!({"Bucket": BUCKET}),
    );

    let outcome = fixture.run(&event);

    assert_eq!(outcome.item_source, ItemSource::History);
    assert_eq!(outcome.compliance, ComplianceStatus::Compliant);
    assert_eq!(outcome.evaluation.resource_id, "audit-logs");
}

#[test]
fn test_summary_without_history_is_an_error() {
    let fixture = Fixture::new();
    let event = event_with(
        json!({"configurationItemSummary": {"resourceType": "AWS::S3::Bucket", "resourceId": "gone"}}),
        json!({"Bucket": BUCKET}),
    );

    let err = evaluate(&event, &fixture.collaborators(), &RequestContext::new()).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::NotFound);
    assert!(err.request_id().is_some());
    assert!(fixture.sink.evaluations().is_empty());
}

#[test]
fn test_event_without_item_is_an_error() {
    let fixture = Fixture::new();
    let event = event_with(json!({"messageType": "ScheduledNotification"}), json!({}));

    let err = evaluate(&event, &fixture.collaborators(), &RequestContext::new()).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::MissingField);
}

// ---------------------------------------------------------------------------
// Collaborator failures
// ---------------------------------------------------------------------------

struct RefusingSink;

impl EvaluationReporter for RefusingSink {
    fn put_evaluation(&self, _: &str, _: &Evaluation) -> Result<()> {
        Err(ExError::new(ExErrorKind::Io).with_message("connection reset"))
    }
}

impl Notifier for RefusingSink {
    fn publish(&self, _: &Notification) -> Result<()> {
        Err(ExError::new(ExErrorKind::Io).with_message("connection reset"))
    }
}

#[test]
fn test_reporter_failure_is_external_service_error() {
    let fixture = Fixture::new().with_baseline("audit-logs", &baseline());
    let collaborators = Collaborators {
        reporter: &RefusingSink,
        ..fixture.collaborators()
    };
    let event = item_event(bucket_item("OK", "Enabled"), json!({"Bucket": BUCKET}));

    let err = evaluate(&event, &collaborators, &RequestContext::new()).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::ExternalService);
    assert_eq!(err.op(), Some("put_evaluation"));
    assert_eq!(err.source_error().map(|e| e.kind()), Some(ExErrorKind::Io));
}

#[test]
fn test_notifier_failure_after_report() {
    let fixture = Fixture::new().with_baseline("audit-logs", &baseline());
    let collaborators = Collaborators {
        notifier: &RefusingSink,
        ..fixture.collaborators()
    };
    let event = item_event(bucket_item("OK", "Suspended"), json!({"Bucket": BUCKET, "TopicArn": TOPIC}));

    let err = evaluate(&event, &collaborators, &RequestContext::new()).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::ExternalService);
    assert_eq!(err.op(), Some("publish_notification"));
    assert_eq!(fixture.sink.evaluations().len(), 1);
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[test]
fn test_evaluate_logs_lifecycle() {
    let capture = init_test_capture();
    let fixture = Fixture::new().with_baseline("logged-bucket", &baseline());
    let mut item = bucket_item("OK", "Enabled");
    item["resourceId"] = json!("logged-bucket");
    let event = item_event(item, json!({"Bucket": BUCKET}));

    fixture.run(&event);

    let ends: Vec<_> = capture
        .events_for_op("evaluate")
        .into_iter()
        .filter(|e| {
            e.event.as_deref() == Some(EVENT_END)
                && e.fields.get(FIELD_RESOURCE_ID).map(String::as_str) == Some("logged-bucket")
        })
        .collect();
    assert_eq!(ends.len(), 1);
    assert_eq!(
        ends[0].fields.get(FIELD_COMPLIANCE).map(String::as_str),
        Some("COMPLIANT")
    );
    capture.assert_event_exists("evaluate", EVENT_START);
}

#[test]
fn test_evaluate_logs_error_with_code() {
    let capture = init_test_capture();
    let fixture = Fixture::new();
    let ctx = RequestContext::new();
    let event = event_with(json!({"unrelated": true}), json!({}));

    let _ = evaluate(&event, &fixture.collaborators(), &ctx);

    let request_id = ctx.request_id.to_string();
    let errors: Vec<_> = capture
        .events_for_op("evaluate")
        .into_iter()
        .filter(|e| {
            e.event.as_deref() == Some(EVENT_END_ERROR)
                && e.fields.get(FIELD_REQUEST_ID) == Some(&request_id)
        })
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].fields.get(FIELD_ERR_CODE).map(String::as_str),
        Some("ERR_MISSING_FIELD")
    );
}
