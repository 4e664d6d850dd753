// Logging behaviour of the upload path, asserted through the test capture
// layer. All tests in this binary share one global subscriber, so every
// assertion filters on an id unique to its test.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use filevault_core::logging_facility::test_capture::init_test_capture;
use filevault_core::model::FileProperties;
use filevault_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
use filevault_engine::FileService;
use filevault_store::blob::META_DIR;
use filevault_store::StoreConfig;
use std::io::Cursor;
use tempfile::TempDir;

fn setup() -> (FileService, TempDir) {
    let dir = TempDir::new().unwrap();
    let service = FileService::open(&StoreConfig::new(dir.path())).unwrap();
    (service, dir)
}

#[test]
fn test_swallowed_meta_failure_is_logged() {
    // Given: Capture mode and a vault without a meta area
    let capture = init_test_capture();
    let (mut service, dir) = setup();
    std::fs::remove_dir(dir.path().join(META_DIR)).unwrap();

    // When: A file is added
    let id = service
        .add_file(
            FileProperties::new("a.txt", "text/plain", 1),
            Cursor::new(b"a".to_vec()),
        )
        .unwrap();

    // Then: The metadata failure left an error event for the record
    let failures = capture.metadata_failures_for(&id);
    assert!(!failures.is_empty(), "expected a metadata failure event for {}", id);

    // And: The upload itself still ended successfully
    let ended: Vec<_> = capture
        .events_for_record(&id)
        .into_iter()
        .filter(|e| e.op.as_deref() == Some("add_file"))
        .collect();
    assert_eq!(ended.len(), 1);
    assert_eq!(ended[0].event.as_deref(), Some(EVENT_END));
}

#[test]
fn test_failed_reload_after_commit_is_logged_not_raised() {
    // Given: Capture mode and a vault whose committed rows cannot be read back
    let capture = init_test_capture();
    let (mut service, _dir) = setup();
    service
        .connection()
        .execute_batch(
            "CREATE TRIGGER unloadable_rows AFTER INSERT ON file_records
             BEGIN
                 UPDATE file_records SET creation_time = 9223372036854775807 WHERE id = NEW.id;
             END;",
        )
        .unwrap();

    // When: A file is added
    let id = service
        .add_file(
            FileProperties::new("b.txt", "text/plain", 1),
            Cursor::new(b"b".to_vec()),
        )
        .unwrap();

    // Then: The failed reload is logged as a metadata failure for the record
    assert_eq!(capture.metadata_failures_for(&id).len(), 1);

    // And: The request still ends with `end`, never `end_error`
    let end = capture
        .events_for_record(&id)
        .into_iter()
        .find(|e| e.event.as_deref() == Some(EVENT_END))
        .expect("end event for the record");
    let request_id = end.request_id().expect("request id on end event");
    assert_eq!(capture.lifecycle_of(request_id), vec![EVENT_START, EVENT_END]);
}

#[test]
fn test_failed_upload_logs_end_error() {
    // Given: Capture mode
    let capture = init_test_capture();
    let (mut service, _dir) = setup();

    // When: An upload with a lying size is attempted
    let err = service
        .add_file(
            FileProperties::new("liar.txt", "text/plain", 99),
            Cursor::new(b"tiny".to_vec()),
        )
        .unwrap_err();
    let request_id = err.request_id().expect("request id attached").to_string();

    // Then: The lifecycle shows start then end_error for that request
    assert_eq!(
        capture.lifecycle_of(&request_id),
        vec![EVENT_START, EVENT_END_ERROR]
    );

    // And: The error event carries the mismatch code
    let coded: Vec<_> = capture
        .events_for_request(&request_id)
        .into_iter()
        .filter_map(|e| e.err_code().map(str::to_string))
        .collect();
    assert_eq!(coded, vec!["ERR_CONTENT_SIZE_MISMATCH"]);
}
