//! Record service: create, load and read stored files.
//!
//! ## Logging Ownership
//!
//! `add_file` owns the lifecycle events for an upload (`log_op_start!`,
//! `log_op_end!`, `log_op_error!`). The store and the storage listener only
//! emit `debug` details and swallowed-failure errors.

#![allow(clippy::result_large_err)]

use crate::commands::storage_listener::StorageListener;
use filevault_core::errors::{ExError, ExErrorKind, VaultError};
use filevault_core::model::{ContentHandle, FileProperties, FileRecord};
use filevault_core::{log_meta_failure, log_op_end, log_op_error, log_op_start};
use filevault_core_types::RequestId;
use filevault_store::errors::Result;
use filevault_store::{db, BlobStore, SqliteRepo, StoreConfig};
use rusqlite::Connection;
use std::io::Read;
use std::sync::Arc;
use uuid::Uuid;

/// Record service bound to one database connection
///
/// Connections are not shared; give each thread its own service and share
/// the `BlobStore` between them.
pub struct FileService {
    conn: Connection,
    listener: StorageListener,
}

impl FileService {
    pub fn new(conn: Connection, store: Arc<BlobStore>) -> Self {
        Self {
            conn,
            listener: StorageListener::new(store),
        }
    }

    /// Open the blob store and database named by `config`
    ///
    /// # Errors
    ///
    /// `ExErrorKind::Configuration` for a bad root, `Persistence` if the
    /// database cannot be opened or migrated.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        config.validate()?;
        let store = Arc::new(BlobStore::open(&config.root_path)?);
        let conn = db::open_ready(config.database_path())?;
        Ok(Self::new(conn, store))
    }

    pub fn blob_store(&self) -> &BlobStore {
        self.listener.store()
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Store a new file and return its record id
    ///
    /// The content is written to the blob store during the commit; the
    /// committed record is then reloaded, which refreshes its metadata
    /// snapshot. Nothing is reloaded if the commit fails.
    ///
    /// # Errors
    ///
    /// - `InvalidInput`: negative declared size
    /// - `StorageFailure`: the blob could not be written
    /// - `ContentSizeMismatch`: the stream length differs from `properties.size`
    /// - `ConstraintViolation` / `Persistence`: the row could not be inserted
    ///
    /// Once the row is committed the call succeeds, even if the metadata
    /// refresh fails.
    pub fn add_file<R>(&mut self, properties: FileProperties, content: R) -> Result<String>
    where
        R: Read + Send + 'static,
    {
        let request_id = RequestId::new();
        log_op_start!(
            "add_file",
            request_id = %request_id,
            name = %properties.name,
            content_size = properties.size
        );
        let start = std::time::Instant::now();

        let result = self.add_file_impl(properties, content).map_err(|e| {
            let e = e.with_request_id(request_id.clone());
            log_op_error!(
                "add_file",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                request_id = %request_id
            );
            e
        })?;

        log_op_end!(
            "add_file",
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = %request_id,
            record_id = %result
        );

        Ok(result)
    }

    fn add_file_impl<R>(&mut self, properties: FileProperties, content: R) -> Result<String>
    where
        R: Read + Send + 'static,
    {
        properties
            .validate()
            .map_err(|e| ExError::from(e).with_op("add_file"))?;

        let id = Uuid::now_v7().to_string();
        let mut record = FileRecord::new(id.clone(), properties, ContentHandle::new(content));

        SqliteRepo::insert_record(&mut self.conn, &mut record, &self.listener)?;

        // Committed: from here on nothing may turn the upload into a failure
        self.refresh_metadata(&id);

        Ok(id)
    }

    /// Reload a committed record so its post-load hook rewrites the snapshot
    ///
    /// Best-effort, like every metadata write: a failed reload is logged as a
    /// metadata failure and otherwise ignored.
    fn refresh_metadata(&self, record_id: &str) {
        let err = match SqliteRepo::load_record(&self.conn, record_id, &self.listener) {
            Ok(Some(_)) => return,
            Ok(None) => ExError::new(ExErrorKind::NotFound)
                .with_op("refresh_metadata")
                .with_message("Committed record could not be reloaded"),
            Err(e) => e,
        };

        log_meta_failure!(record_id, err, "Failed to refresh meta snapshot after commit");
    }

    /// Load a record, refreshing its metadata snapshot
    pub fn get_file(&self, record_id: &str) -> Result<Option<FileRecord>> {
        SqliteRepo::load_record(&self.conn, record_id, &self.listener)
    }

    /// All records, oldest first
    pub fn list_files(&self) -> Result<Vec<FileRecord>> {
        SqliteRepo::list_records(&self.conn, &self.listener)
    }

    /// Stored bytes of a record; empty for zero-length records
    ///
    /// # Errors
    ///
    /// `NotFound` if the record or its blob does not exist.
    pub fn read_content(&self, record_id: &str) -> Result<Vec<u8>> {
        let record = self.get_file(record_id)?.ok_or_else(|| {
            ExError::from(VaultError::RecordNotFound {
                record_id: record_id.to_string(),
            })
            .with_op("read_content")
        })?;

        match &record.external_id {
            Some(external_id) => self.blob_store().read(external_id),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn setup() -> (FileService, TempDir) {
        let dir = TempDir::new().unwrap();
        let service = FileService::open(&StoreConfig::new(dir.path())).unwrap();
        (service, dir)
    }

    #[test]
    fn test_add_then_read_content() {
        let (mut service, _dir) = setup();

        let id = service
            .add_file(
                FileProperties::new("a.txt", "text/plain", 5),
                Cursor::new(b"hello".to_vec()),
            )
            .unwrap();

        assert_eq!(service.read_content(&id).unwrap(), b"hello");
    }

    #[test]
    fn test_negative_size_is_invalid_input() {
        let (mut service, _dir) = setup();

        let err = service
            .add_file(
                FileProperties::new("a.txt", "text/plain", -1),
                Cursor::new(Vec::new()),
            )
            .unwrap_err();

        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
        assert!(err.request_id().is_some());
    }

    #[test]
    fn test_read_content_unknown_record() {
        let (service, _dir) = setup();
        let err = service.read_content("missing").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::NotFound);
    }

    #[test]
    fn test_open_places_database_under_root() {
        let (_service, dir) = setup();
        assert!(dir.path().join("filevault.db").is_file());
    }
}
