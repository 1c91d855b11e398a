//! Evaluation wired to the filesystem collaborators.

use conform_core::compliance::ComplianceStatus;
use conform_core_types::RequestContext;
use conform_engine::{evaluate, Collaborators, ConfigEvent};
use conform_store::{BaselineLocator, FsBaselineStore, FsConfigHistory, FsOutbox, OutboxEntry};
use serde_json::json;
use tempfile::TempDir;

#[test]
fn test_evaluation_lands_in_outbox() {
    let dir = TempDir::new().unwrap();
    let baselines = FsBaselineStore::new(dir.path().join("baselines"));
    let history = FsConfigHistory::new(dir.path().join("history"));
    let outbox = FsOutbox::new(dir.path().join("outbox.jsonl"));

    let locator = BaselineLocator::parse("golden/sg").unwrap();
    baselines
        .record(
            &locator,
            "sg-1",
            br#"{"configuration":{"ipPermissions":[{"fromPort":"22","ipRanges":["10.0.0.0/8"]}]}}"#,
        )
        .unwrap();

    let item = json!({
        "configurationItemStatus": "OK",
        "configurationItemCaptureTime": "2021-05-01T10:00:00Z",
        "resourceType": "AWS::EC2::SecurityGroup",
        "resourceId": "sg-1",
        "configuration": {"ipPermissions": [{"fromPort": 22, "ipRanges": ["0.0.0.0/0"]}]}
    });
    let raw = json!({
        "invokingEvent": json!({"configurationItem": item}).to_string(),
        "ruleParameters": json!({"Bucket": "golden/sg", "TopicArn": "alerts"}).to_string(),
        "resultToken": "tok",
        "configRuleName": "sg-baseline"
    });
    let event = ConfigEvent::from_slice(raw.to_string().as_bytes()).unwrap();

    let collaborators = Collaborators {
        baselines: &baselines,
        history: &history,
        reporter: &outbox,
        notifier: &outbox,
    };
    let outcome = evaluate(&event, &collaborators, &RequestContext::new()).unwrap();

    assert_eq!(outcome.compliance, ComplianceStatus::NonCompliant);
    assert_eq!(
        outcome.annotation,
        "path=[.configuration.ipPermissions.0.ipRanges.0] value mismatch: targetValue=10.0.0.0/8 itemValue=0.0.0.0/0"
    );

    let entries = outbox.entries().unwrap();
    assert_eq!(entries.len(), 2);
    match &entries[0] {
        OutboxEntry::Evaluation {
            result_token,
            evaluation,
            ..
        } => {
            assert_eq!(result_token, "tok");
            assert_eq!(evaluation.compliance, ComplianceStatus::NonCompliant);
        }
        other => panic!("expected evaluation first, got {:?}", other),
    }
    assert!(matches!(&entries[1], OutboxEntry::Notification { notification, .. }
        if notification.subject == "Non-compliance: sg-baseline AWS::EC2::SecurityGroup sg-1"));
}
