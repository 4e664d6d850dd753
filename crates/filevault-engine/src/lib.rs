//! filevault engine - orchestration layer
//!
//! Wires the record lifecycle to the blob store and exposes the record
//! service and upload entry point used by the CLI.

pub mod commands;

pub use commands::file_service::FileService;
pub use commands::storage_listener::StorageListener;
pub use commands::upload::upload;
