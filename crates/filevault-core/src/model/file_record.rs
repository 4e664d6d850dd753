use chrono::{DateTime, SubsecRound, Utc};
use std::io::Read;

use super::file_properties::FileProperties;
use crate::errors::VaultError;

/// Transient handle on a record's binary payload
///
/// Lives on a `FileRecord` only between construction and the first
/// successful commit. The storage listener moves it out of the record, drains
/// it into the blob store and drops it, whether or not the write succeeded.
pub struct ContentHandle {
    reader: Box<dyn Read + Send>,
}

impl ContentHandle {
    /// Wrap any readable stream
    pub fn new(reader: impl Read + Send + 'static) -> Self {
        Self {
            reader: Box::new(reader),
        }
    }

    /// Wrap an in-memory buffer
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(std::io::Cursor::new(bytes.into()))
    }
}

impl Read for ContentHandle {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

impl std::fmt::Debug for ContentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentHandle").finish_non_exhaustive()
    }
}

/// A file record - the relational half of a stored file
///
/// The binary half lives in the blob store under `external_id`. A record
/// that has been committed never carries `content`; a record with
/// `content_size == 0` never gets an `external_id`.
#[derive(Debug)]
pub struct FileRecord {
    /// Primary key (UUID v7, issued by the record service)
    pub id: String,

    /// Original file name
    pub name: String,

    /// MIME type reported at upload
    pub mime_type: String,

    /// Number of bytes stored in the blob store for this record
    pub content_size: i64,

    /// Blob store identifier of the payload, set at pre-commit
    pub external_id: Option<String>,

    /// Creation timestamp, millisecond precision, immutable
    pub creation_time: DateTime<Utc>,

    /// Payload awaiting its first commit
    pub content: Option<ContentHandle>,
}

impl FileRecord {
    /// Create a new, uncommitted record carrying its content
    pub fn new(id: String, properties: FileProperties, content: ContentHandle) -> Self {
        Self {
            id,
            name: properties.name,
            mime_type: properties.mime_type,
            content_size: properties.size,
            external_id: None,
            creation_time: creation_timestamp(),
            content: Some(content),
        }
    }

    /// Whether the payload is still held in memory
    pub fn has_inline_content(&self) -> bool {
        self.content.is_some()
    }

    /// Move the content handle out of the record
    pub fn take_content(&mut self) -> Option<ContentHandle> {
        self.content.take()
    }

    /// Assign the blob store identifier
    ///
    /// Fails if an external id is already present: once set it never changes.
    pub fn set_external_id(&mut self, external_id: String) -> Result<(), VaultError> {
        if let Some(existing) = &self.external_id {
            return Err(VaultError::ExternalIdAlreadySet {
                record_id: self.id.clone(),
                external_id: existing.clone(),
            });
        }
        self.external_id = Some(external_id);
        Ok(())
    }
}

/// Current time truncated to what the database stores (unix milliseconds)
pub fn creation_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
