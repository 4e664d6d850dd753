// Metadata snapshot projection: determinism and round-trip over arbitrary records

use chrono::{DateTime, Utc};
use filevault_core::metadata::{from_json_bytes, to_json_bytes};
use filevault_core::{ContentHandle, FileProperties, FileRecord, MetaSnapshot};
use proptest::prelude::*;

fn record_with(
    name: String,
    mime: String,
    size: i64,
    external_id: Option<String>,
    millis: i64,
) -> FileRecord {
    let mut record = FileRecord::new(
        "record-under-test".to_string(),
        FileProperties::new(name, mime, size),
        ContentHandle::from_bytes(Vec::new()),
    );
    record.content = None;
    record.external_id = external_id;
    record.creation_time = DateTime::<Utc>::from_timestamp_millis(millis).unwrap();
    record
}

proptest! {
    #[test]
    fn snapshot_bytes_are_deterministic(
        name in ".{0,40}",
        mime in "[a-z]{1,10}/[a-z0-9.+-]{1,20}",
        size in 0i64..i64::MAX,
        external_id in proptest::option::of("[0-9a-f-]{36}"),
        millis in 0i64..4_102_444_800_000,
    ) {
        let record = record_with(name, mime, size, external_id, millis);

        let first = to_json_bytes(&record).unwrap();
        let second = to_json_bytes(&record).unwrap();
        prop_assert_eq!(&first, &second);

        let parsed = from_json_bytes(&first).unwrap();
        prop_assert_eq!(parsed, MetaSnapshot::from(&record));
    }
}

#[test]
fn test_hello_world_snapshot_fields() {
    // Given: the canonical upload scenario after commit
    let record = record_with(
        "test.txt".to_string(),
        "text/plain".to_string(),
        13,
        Some("0b6f0c57-3f2a-4d0e-9a57-8e2f1c9d4b11".to_string()),
        1_700_000_000_123,
    );

    // When: we project it
    let json: serde_json::Value = serde_json::from_slice(&to_json_bytes(&record).unwrap()).unwrap();

    // Then: every descriptive field is present with the expected value
    assert_eq!(json["id"], "record-under-test");
    assert_eq!(json["name"], "test.txt");
    assert_eq!(json["mimeType"], "text/plain");
    assert_eq!(json["contentSize"], 13);
    assert_eq!(json["externalId"], "0b6f0c57-3f2a-4d0e-9a57-8e2f1c9d4b11");
    assert_eq!(json["creationTime"], "2023-11-14T22:13:20.123Z");
}
