//! Record lifecycle hooks
//!
//! The persistence boundary calls these at two fixed points: `pre_commit`
//! inside the insert transaction before the row is written, `post_load`
//! after a row has been turned back into a `FileRecord`.

use crate::errors::{ExError, ExErrorKind};
use crate::model::FileRecord;

/// Hook invoked by the persistence boundary around a record's lifecycle
pub trait RecordLifecycleHook: Send + Sync {
    /// Runs once, before the record becomes durable.
    ///
    /// # Errors
    ///
    /// Any error aborts the enclosing transaction; no row is written.
    #[allow(clippy::result_large_err)]
    fn pre_commit(&self, record: &mut FileRecord) -> std::result::Result<(), ExError>;

    /// Runs after every load. Infallible from the loader's point of view.
    fn post_load(&self, record: &FileRecord);
}

/// Does nothing (for repository tests that exercise plain row I/O).
pub struct NoopLifecycleHook;

impl RecordLifecycleHook for NoopLifecycleHook {
    fn pre_commit(&self, _: &mut FileRecord) -> std::result::Result<(), ExError> {
        Ok(())
    }

    fn post_load(&self, _: &FileRecord) {}
}

/// Always fails pre-commit (for tests that verify an aborted commit writes nothing).
pub struct RejectAllLifecycleHook;

impl RecordLifecycleHook for RejectAllLifecycleHook {
    fn pre_commit(&self, record: &mut FileRecord) -> std::result::Result<(), ExError> {
        Err(ExError::new(ExErrorKind::StorageFailure)
            .with_op("pre_commit")
            .with_entity_id(record.id.clone())
            .with_message("RejectAll lifecycle hook"))
    }

    fn post_load(&self, _: &FileRecord) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentHandle, FileProperties};

    fn record() -> FileRecord {
        FileRecord::new(
            "r1".to_string(),
            FileProperties::new("a.txt", "text/plain", 1),
            ContentHandle::from_bytes(b"a".to_vec()),
        )
    }

    #[test]
    fn test_noop_hook_leaves_record_untouched() {
        let mut r = record();
        NoopLifecycleHook.pre_commit(&mut r).unwrap();
        assert!(r.has_inline_content());
        assert!(r.external_id.is_none());
    }

    #[test]
    fn test_reject_all_hook_reports_storage_failure() {
        let mut r = record();
        let err = RejectAllLifecycleHook.pre_commit(&mut r).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::StorageFailure);
        assert_eq!(err.entity_id(), Some("r1"));
    }
}
