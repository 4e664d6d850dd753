//! Metadata snapshot projection
//!
//! Turns a record's descriptive fields into the JSON document stored at
//! `meta/{id}.json`. Pure and deterministic: the same record always yields
//! the same bytes. The content handle is never part of the projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::VaultError;
use crate::model::FileRecord;

/// Descriptive fields of a record, as written to the metadata area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaSnapshot {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub external_id: Option<String>,
    pub creation_time: DateTime<Utc>,
    pub content_size: i64,
}

impl From<&FileRecord> for MetaSnapshot {
    fn from(record: &FileRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            mime_type: record.mime_type.clone(),
            external_id: record.external_id.clone(),
            creation_time: record.creation_time,
            content_size: record.content_size,
        }
    }
}

/// Serialize a record's snapshot to JSON bytes
pub fn to_json_bytes(record: &FileRecord) -> Result<Vec<u8>, VaultError> {
    Ok(serde_json::to_vec(&MetaSnapshot::from(record))?)
}

/// Parse a snapshot previously written by `to_json_bytes`
pub fn from_json_bytes(bytes: &[u8]) -> Result<MetaSnapshot, VaultError> {
    Ok(serde_json::from_slice(bytes)?)
}
