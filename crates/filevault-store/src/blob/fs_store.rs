//! Filesystem blob store
//!
//! Layout under an absolute root:
//!
//! ```text
//! <root>/
//! ├── data/<external_id>   immutable payloads, named by a random UUID
//! ├── meta/<key>.json      best-effort metadata snapshots
//! └── tmp/                 private staging area, empty between operations
//! ```
//!
//! Every write goes through `tmp/` and becomes visible with a single rename.

#![allow(clippy::result_large_err)]

use crate::blob::atomic::stage;
use crate::errors::{configuration_error, io_error, metadata_failure, storage_failure, Result};
use filevault_core::errors::{ExError, ExErrorKind, VaultError};
use filevault_core::log_meta_failure;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const DATA_DIR: &str = "data";
pub const META_DIR: &str = "meta";
pub const TMP_DIR: &str = "tmp";

const META_EXTENSION: &str = "json";

/// A blob that has been durably written under `data/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Generated identifier, also the file name under `data/`
    pub external_id: String,
    /// Bytes written
    pub size: u64,
}

/// Filesystem blob store
///
/// Holds only paths, so it is cheap to share across threads behind an `Arc`.
/// Distinct uploads never touch the same temp or data file.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
    data_dir: PathBuf,
    meta_dir: PathBuf,
    tmp_dir: PathBuf,
}

impl BlobStore {
    /// Open a store rooted at `root`, creating `data/`, `meta/` and `tmp/`
    ///
    /// Directories that already exist are reused.
    ///
    /// # Errors
    ///
    /// `ExErrorKind::Configuration` if `root` is not absolute or a
    /// subdirectory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_absolute() {
            return Err(ExError::from(VaultError::RelativeRootPath {
                path: root.display().to_string(),
            })
            .with_op("open_blob_store"));
        }

        let store = Self {
            data_dir: root.join(DATA_DIR),
            meta_dir: root.join(META_DIR),
            tmp_dir: root.join(TMP_DIR),
            root,
        };

        for dir in [&store.data_dir, &store.meta_dir, &store.tmp_dir] {
            fs::create_dir_all(dir).map_err(|e| {
                configuration_error(format!("Failed to make dir {}: {}", dir.display(), e))
            })?;
        }

        tracing::debug!(root = %store.root.display(), "Opened blob store");

        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn meta_dir(&self) -> &Path {
        &self.meta_dir
    }

    pub fn tmp_dir(&self) -> &Path {
        &self.tmp_dir
    }

    /// Write a stream as a new blob and return its external id
    ///
    /// The id is returned only after the blob is fully visible at
    /// `data/{external_id}`.
    ///
    /// # Errors
    ///
    /// `ExErrorKind::StorageFailure` on any I/O error while writing or moving.
    /// The temp file is removed in that case.
    pub fn store<R: Read>(&self, content: R) -> Result<String> {
        self.write_blob(content, None).map(|blob| blob.external_id)
    }

    /// Write a stream that must contain exactly `expected_len` bytes
    ///
    /// # Errors
    ///
    /// - `ExErrorKind::ContentSizeMismatch` if the stream is shorter or
    ///   longer than declared; nothing is written under `data/`
    /// - `ExErrorKind::StorageFailure` on I/O errors
    pub fn store_exact<R: Read>(&self, content: R, expected_len: u64) -> Result<StoredBlob> {
        self.write_blob(content, Some(expected_len))
    }

    fn write_blob<R: Read>(&self, content: R, expected_len: Option<u64>) -> Result<StoredBlob> {
        let external_id = Uuid::new_v4().to_string();

        let staged = stage(&self.tmp_dir, &external_id, content).map_err(|e| {
            storage_failure("write_blob_temp", e).with_entity_id(external_id.clone())
        })?;

        let size = staged.bytes_written();
        if let Some(expected) = expected_len {
            if size != expected {
                staged.discard();
                return Err(ExError::from(VaultError::ContentSizeMismatch {
                    expected,
                    actual: size,
                })
                .with_op("store_blob"));
            }
        }

        let target = self.data_dir.join(&external_id);
        staged
            .commit(&target)
            .map_err(|e| storage_failure("move_blob", e).with_entity_id(external_id.clone()))?;

        tracing::debug!(
            external_id = %external_id,
            size_bytes = size,
            "Stored blob"
        );

        Ok(StoredBlob { external_id, size })
    }

    /// Write a metadata snapshot to `meta/{key}.json`, never failing
    ///
    /// Any error is logged and dropped. Concurrent writers for the same key
    /// each stage their own temp file; the last rename wins.
    pub fn store_meta_information<R: Read>(&self, content: R, key: &str) {
        if let Err(e) = self.try_store_meta_information(content, key) {
            log_meta_failure!(key, e, "Failed to store meta file");
        }
    }

    /// Write a metadata snapshot, reporting failure to the caller
    ///
    /// # Errors
    ///
    /// `ExErrorKind::MetadataWriteFailure` wrapping the underlying cause.
    pub fn try_store_meta_information<R: Read>(&self, content: R, key: &str) -> Result<()> {
        let target = self.meta_path(key).map_err(|e| metadata_failure(key, e))?;

        let staged = stage(&self.tmp_dir, key, content)
            .map_err(|e| metadata_failure(key, io_error("write_meta_temp", e)))?;

        staged
            .commit(&target)
            .map_err(|e| metadata_failure(key, io_error("move_meta", e)))?;

        tracing::debug!(record_id = key, "Stored meta file");

        Ok(())
    }

    /// Read a whole blob into memory
    ///
    /// # Errors
    ///
    /// - `ExErrorKind::InvalidInput` if `external_id` is not a blob id
    /// - `ExErrorKind::NotFound` if no such blob exists
    pub fn read(&self, external_id: &str) -> Result<Vec<u8>> {
        let path = self.blob_path(external_id)?;
        fs::read(&path).map_err(|e| read_error(external_id, e))
    }

    /// Open a blob for streaming reads
    ///
    /// The file is opened read-only.
    pub fn open_blob(&self, external_id: &str) -> Result<File> {
        let path = self.blob_path(external_id)?;
        File::open(&path).map_err(|e| read_error(external_id, e))
    }

    /// Whether a blob with this id exists
    pub fn contains(&self, external_id: &str) -> bool {
        self.blob_path(external_id)
            .map(|p| p.is_file())
            .unwrap_or(false)
    }

    /// Read `meta/{key}.json` if it exists
    pub fn read_meta(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.meta_path(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error("read_meta", e).with_entity_id(key)),
        }
    }

    /// Path of a blob under `data/`
    ///
    /// Only canonical hyphenated UUIDs are accepted, so no id can address a
    /// file outside the data area.
    pub fn blob_path(&self, external_id: &str) -> Result<PathBuf> {
        let canonical = Uuid::parse_str(external_id)
            .map(|u| u.to_string() == external_id)
            .unwrap_or(false);
        if !canonical {
            return Err(ExError::from(VaultError::InvalidExternalId {
                external_id: external_id.to_string(),
            })
            .with_op("blob_path"));
        }
        Ok(self.data_dir.join(external_id))
    }

    /// Path of a metadata snapshot under `meta/`
    pub fn meta_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && !key.contains(&['/', '\\', '\0'][..]);
        if !valid {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("meta_path")
                .with_entity_id(key)
                .with_message("Invalid metadata key"));
        }
        Ok(self.meta_dir.join(format!("{}.{}", key, META_EXTENSION)))
    }
}

fn read_error(external_id: &str, err: io::Error) -> ExError {
    if err.kind() == io::ErrorKind::NotFound {
        ExError::from(VaultError::BlobNotFound {
            external_id: external_id.to_string(),
        })
        .with_op("read_blob")
    } else {
        io_error("read_blob", err).with_entity_id(external_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_store() -> (BlobStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = BlobStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn count(dir: &Path) -> usize {
        fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_open_creates_layout() {
        let (store, dir) = setup_store();
        assert!(dir.path().join(DATA_DIR).is_dir());
        assert!(dir.path().join(META_DIR).is_dir());
        assert!(dir.path().join(TMP_DIR).is_dir());
        assert_eq!(store.root(), dir.path());
    }

    #[test]
    fn test_open_tolerates_existing_dirs() {
        let (_store, dir) = setup_store();
        assert!(BlobStore::open(dir.path()).is_ok());
    }

    #[test]
    fn test_relative_root_rejected() {
        let err = BlobStore::open("relative/root").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Configuration);
    }

    #[test]
    fn test_store_read_roundtrip() {
        let (store, _dir) = setup_store();

        let external_id = store.store(&b"Hello, blob!"[..]).unwrap();

        assert_eq!(store.read(&external_id).unwrap(), b"Hello, blob!");
        assert!(store.contains(&external_id));
        assert_eq!(count(store.tmp_dir()), 0);
    }

    #[test]
    fn test_store_generates_distinct_ids() {
        let (store, _dir) = setup_store();

        let a = store.store(&b"same"[..]).unwrap();
        let b = store.store(&b"same"[..]).unwrap();

        assert_ne!(a, b, "no deduplication: every store is a new blob");
        assert_eq!(count(store.data_dir()), 2);
    }

    #[test]
    fn test_store_exact_mismatch_writes_nothing() {
        let (store, _dir) = setup_store();

        let err = store.store_exact(&b"12345"[..], 4).unwrap_err();

        assert_eq!(err.kind(), ExErrorKind::ContentSizeMismatch);
        assert_eq!(count(store.data_dir()), 0);
        assert_eq!(count(store.tmp_dir()), 0);
    }

    #[test]
    fn test_store_into_missing_data_dir_is_storage_failure() {
        let (store, _dir) = setup_store();
        fs::remove_dir(store.data_dir()).unwrap();

        let err = store.store(&b"lost"[..]).unwrap_err();

        assert_eq!(err.kind(), ExErrorKind::StorageFailure);
        assert_eq!(count(store.tmp_dir()), 0, "temp file cleaned up");
    }

    #[test]
    fn test_meta_write_and_overwrite() {
        let (store, _dir) = setup_store();

        store.store_meta_information(&b"{\"v\":1}"[..], "rec-1");
        store.store_meta_information(&b"{\"v\":2}"[..], "rec-1");

        assert_eq!(store.read_meta("rec-1").unwrap().unwrap(), b"{\"v\":2}");
        assert!(store.meta_dir().join("rec-1.json").is_file());
        assert_eq!(count(store.tmp_dir()), 0);
    }

    #[test]
    fn test_meta_failure_is_swallowed() {
        let (store, _dir) = setup_store();
        fs::remove_dir(store.meta_dir()).unwrap();

        // Must not panic or propagate
        store.store_meta_information(&b"{}"[..], "rec-2");

        let err = store.try_store_meta_information(&b"{}"[..], "rec-2").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::MetadataWriteFailure);
        assert_eq!(count(store.tmp_dir()), 0);
    }

    #[test]
    fn test_meta_key_cannot_escape_meta_dir() {
        let (store, _dir) = setup_store();

        for key in ["", "../evil", "a/b", ".hidden"] {
            let err = store.try_store_meta_information(&b"{}"[..], key).unwrap_err();
            assert_eq!(err.kind(), ExErrorKind::MetadataWriteFailure, "key {:?}", key);
        }
        assert_eq!(count(store.meta_dir()), 0);
    }

    #[test]
    fn test_read_missing_meta_is_none() {
        let (store, _dir) = setup_store();
        assert!(store.read_meta("nobody").unwrap().is_none());
    }

    #[test]
    fn test_read_missing_blob() {
        let (store, _dir) = setup_store();

        let err = store.read(&Uuid::new_v4().to_string()).unwrap_err();

        assert_eq!(err.kind(), ExErrorKind::NotFound);
    }

    #[test]
    fn test_read_rejects_non_canonical_ids() {
        let (store, _dir) = setup_store();

        for id in ["../tmp", "not-a-uuid", "67E55044-10B1-426F-9247-BB680E5FE0C8"] {
            let err = store.read(id).unwrap_err();
            assert_eq!(err.kind(), ExErrorKind::InvalidInput, "id {:?}", id);
        }
    }
}
