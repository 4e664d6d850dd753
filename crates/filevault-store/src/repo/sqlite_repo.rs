//! SQLite repository implementation
//!
//! Persists `FileRecord` rows and drives the lifecycle hooks: `pre_commit`
//! inside the insert transaction, `post_load` after every materialized row.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use chrono::{DateTime, Utc};
use filevault_core::errors::{ExError, VaultError};
use filevault_core::hooks::RecordLifecycleHook;
use filevault_core::model::FileRecord;
use rusqlite::{Connection, OptionalExtension, Row};

const SELECT_COLUMNS: &str =
    "SELECT id, name, mime_type, external_id, content_size, creation_time FROM file_records";

/// SQLite repository for file records
pub struct SqliteRepo;

impl SqliteRepo {
    /// Insert a new record, running `hook.pre_commit` first
    ///
    /// The hook runs inside the transaction that writes the row. If the hook
    /// fails, or the record still carries inline content afterwards, or the
    /// insert itself fails, the transaction is rolled back and no row exists.
    ///
    /// # Errors
    ///
    /// - whatever the hook returns
    /// - `ExErrorKind::ConstraintViolation` for inline content or a duplicate id
    /// - `ExErrorKind::Persistence` for other database failures
    pub fn insert_record(
        conn: &mut Connection,
        record: &mut FileRecord,
        hook: &dyn RecordLifecycleHook,
    ) -> Result<()> {
        let tx = conn.transaction().map_err(from_rusqlite)?;

        hook.pre_commit(record)?;

        if record.has_inline_content() {
            return Err(ExError::from(VaultError::InlineContentAtCommit {
                record_id: record.id.clone(),
            })
            .with_op("insert_record"));
        }

        tx.execute(
            "INSERT INTO file_records (id, name, mime_type, external_id, content_size, creation_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                record.id,
                record.name,
                record.mime_type,
                record.external_id,
                record.content_size,
                record.creation_time.timestamp_millis(),
            ],
        )
        .map_err(|e| from_rusqlite(e).with_entity_id(record.id.clone()))?;

        tx.commit().map_err(from_rusqlite)?;

        tracing::debug!(record_id = %record.id, "Inserted file record");

        Ok(())
    }

    /// Load a record by id, running `hook.post_load` on it
    pub fn load_record(
        conn: &Connection,
        record_id: &str,
        hook: &dyn RecordLifecycleHook,
    ) -> Result<Option<FileRecord>> {
        let mut stmt = conn
            .prepare(&format!("{} WHERE id = ?1", SELECT_COLUMNS))
            .map_err(from_rusqlite)?;

        let record = stmt
            .query_row([record_id], record_from_row)
            .optional()
            .map_err(from_rusqlite)?;

        if let Some(record) = &record {
            hook.post_load(record);
        }

        Ok(record)
    }

    /// List all records, oldest first, running `hook.post_load` on each
    pub fn list_records(
        conn: &Connection,
        hook: &dyn RecordLifecycleHook,
    ) -> Result<Vec<FileRecord>> {
        let mut stmt = conn
            .prepare(&format!("{} ORDER BY creation_time, id", SELECT_COLUMNS))
            .map_err(from_rusqlite)?;

        let records = stmt
            .query_map([], record_from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        for record in &records {
            hook.post_load(record);
        }

        Ok(records)
    }

    /// Number of committed records
    pub fn count_records(conn: &Connection) -> Result<u64> {
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM file_records", [], |row| row.get(0))
            .map_err(from_rusqlite)?;
        Ok(count.max(0) as u64)
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<FileRecord> {
    let creation_ms: i64 = row.get(5)?;
    let creation_time: DateTime<Utc> = DateTime::from_timestamp_millis(creation_ms)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(5, creation_ms))?;

    Ok(FileRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        mime_type: row.get(2)?,
        external_id: row.get(3)?,
        content_size: row.get(4)?,
        creation_time,
        content: None,
    })
}
