//! Storage listener: the record lifecycle hook backed by the blob store.
//!
//! ## Pre-commit
//!
//! Drains the record's content handle into the blob store and stamps the
//! record with the resulting external id. Every failure propagates and aborts
//! the enclosing transaction. Zero-length records skip the write entirely,
//! but their stream must really be empty.
//!
//! ## Post-load
//!
//! Re-writes `meta/{id}.json` from the loaded record. Failures are logged and
//! dropped; a load never fails because of metadata.

#![allow(clippy::result_large_err)]

use filevault_core::errors::{ExError, VaultError};
use filevault_core::hooks::RecordLifecycleHook;
use filevault_core::log_meta_failure;
use filevault_core::metadata;
use filevault_core::model::FileRecord;
use filevault_store::errors::storage_failure;
use filevault_store::BlobStore;
use std::io::Read;
use std::sync::Arc;

/// Lifecycle hook that keeps records and blobs in step
pub struct StorageListener {
    store: Arc<BlobStore>,
}

impl StorageListener {
    pub fn new(store: Arc<BlobStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &BlobStore {
        &self.store
    }
}

impl RecordLifecycleHook for StorageListener {
    fn pre_commit(&self, record: &mut FileRecord) -> Result<(), ExError> {
        // Owned here until the end of the write, then dropped either way
        let content = record.take_content();

        if record.content_size == 0 {
            if let Some(mut content) = content {
                let mut first = [0u8; 1];
                let extra = content.read(&mut first).map_err(|e| {
                    storage_failure("pre_commit", e).with_entity_id(record.id.clone())
                })?;
                if extra > 0 {
                    return Err(ExError::from(VaultError::ContentSizeMismatch {
                        expected: 0,
                        actual: extra as u64,
                    })
                    .with_op("pre_commit")
                    .with_entity_id(record.id.clone()));
                }
            }
            tracing::debug!(record_id = %record.id, "Empty record, no blob written");
            return Ok(());
        }

        if let Some(existing) = &record.external_id {
            return Err(ExError::from(VaultError::ExternalIdAlreadySet {
                record_id: record.id.clone(),
                external_id: existing.clone(),
            })
            .with_op("pre_commit"));
        }

        let content = content.ok_or_else(|| {
            ExError::from(VaultError::MissingContent {
                record_id: record.id.clone(),
                content_size: record.content_size,
            })
            .with_op("pre_commit")
        })?;

        let expected = u64::try_from(record.content_size).map_err(|_| {
            ExError::from(VaultError::InvalidContentSize {
                content_size: record.content_size,
            })
            .with_op("pre_commit")
            .with_entity_id(record.id.clone())
        })?;

        let blob = self.store.store_exact(content, expected).map_err(|e| {
            ExError::new(e.kind())
                .with_op("pre_commit")
                .with_entity_id(record.id.clone())
                .with_message(e.message().to_string())
                .with_source(e)
        })?;

        tracing::debug!(
            record_id = %record.id,
            external_id = %blob.external_id,
            content_size = blob.size,
            "Stored record content"
        );

        record.set_external_id(blob.external_id)?;
        Ok(())
    }

    fn post_load(&self, record: &FileRecord) {
        match metadata::to_json_bytes(record) {
            Ok(bytes) => self.store.store_meta_information(&bytes[..], &record.id),
            Err(e) => log_meta_failure!(record.id, e, "Failed to build meta snapshot"),
        }
    }
}
