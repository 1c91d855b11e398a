//! Recorded item/target pairs under `tests/testdata`.
//!
//! `item/<name>.json` is compared against `target/<name>.json`. When
//! `annotation/<name>.txt` exists the pair must be non-compliant with exactly
//! that annotation; otherwise it must be compliant.

use conform_core::compare::compare;
use conform_core::value::decode_bytes;
use std::fs;
use std::path::{Path, PathBuf};

fn testdata() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("testdata")
}

#[test]
fn test_recorded_fixtures() {
    let root = testdata();
    let mut names: Vec<String> = fs::read_dir(root.join("item"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert!(!names.is_empty(), "no fixtures found");

    for name in names {
        let stem = name.trim_end_matches(".json");
        let item = decode_bytes(&fs::read(root.join("item").join(&name)).unwrap())
            .unwrap_or_else(|e| panic!("{}: bad item json: {}", name, e));
        let target = decode_bytes(&fs::read(root.join("target").join(&name)).unwrap())
            .unwrap_or_else(|e| panic!("{}: bad target json: {}", name, e));
        let annotation = fs::read_to_string(root.join("annotation").join(format!("{}.txt", stem)))
            .ok()
            .map(|s| s.trim_end().to_string());

        let verdict = compare(&item, &target);
        match annotation {
            Some(expected) => assert_eq!(verdict.annotation(), expected, "{}", name),
            None => assert!(verdict.is_compliant(), "{}: {:?}", name, verdict),
        }
    }
}

#[test]
fn test_normalized_history_record_matches_baseline() {
    let record = serde_json::json!({
        "ResourceType": "AWS::S3::Bucket",
        "ResourceId": "audit-logs",
        "Tags": {"env": "prod"},
        "Configuration": {"Versioning": {"Status": "Enabled"}}
    });
    let target = serde_json::json!({
        "resourceId": "audit-logs",
        "configuration": {"versioning": {"status": "Enabled"}}
    });

    assert!(!compare(&record, &target).is_compliant());
    let normalized = conform_core::normalize_keys(record);
    assert!(compare(&normalized, &target).is_compliant());
}
