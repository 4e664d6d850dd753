use serde::{Deserialize, Serialize};

use crate::errors::VaultError;

/// Caller-supplied description of an upload
///
/// `size` is the declared number of content bytes; the storage listener
/// refuses to commit a record whose stream does not match it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileProperties {
    /// Original file name
    pub name: String,

    /// MIME type reported by the caller
    pub mime_type: String,

    /// Declared content length in bytes
    pub size: i64,
}

impl FileProperties {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size: i64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size,
        }
    }

    /// Reject sizes that cannot describe a stream
    pub fn validate(&self) -> Result<(), VaultError> {
        if self.size < 0 {
            return Err(VaultError::InvalidContentSize {
                content_size: self.size,
            });
        }
        Ok(())
    }
}
