//! Error handling for filevault-store
//!
//! Wraps filevault-core ExError with store-specific helpers

use filevault_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::ConstraintViolation)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a blob write failure (fatal to the enclosing commit)
pub fn storage_failure(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::StorageFailure)
        .with_op(operation.to_string())
        .with_message(err.to_string())
        .with_source(io_error(operation, err))
}

/// Create a metadata write failure (always swallowed by callers)
pub fn metadata_failure(key: &str, source: ExError) -> ExError {
    ExError::new(ExErrorKind::MetadataWriteFailure)
        .with_op("store_meta_information")
        .with_entity_id(key)
        .with_message(format!("Failed to store meta file {}", key))
        .with_source(source)
}

/// Create a configuration error
pub fn configuration_error(reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::Configuration)
        .with_op("configuration")
        .with_message(reason)
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    let kind = match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation => {
            ExErrorKind::ConstraintViolation
        }
        _ => ExErrorKind::Persistence,
    };
    ExError::new(kind)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
