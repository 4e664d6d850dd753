//! Upload entry point.
//!
//! Stands in for the transport layer: forwards to the record service and
//! folds the outcome into an `UploadResponse`.

use crate::commands::file_service::FileService;
use filevault_core::model::{FileProperties, UploadResponse};
use std::io::Read;

/// Store `content` and report the outcome as an envelope
///
/// Never fails; errors become `success: false` with the error text as the
/// message and no file id.
pub fn upload<R>(service: &mut FileService, properties: FileProperties, content: R) -> UploadResponse
where
    R: Read + Send + 'static,
{
    match service.add_file(properties, content) {
        Ok(file_id) => UploadResponse::ok(file_id),
        Err(e) => UploadResponse::failed(e.to_string()),
    }
}
