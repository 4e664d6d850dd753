//! filevault core - domain model, error and logging facilities
//!
//! Provides:
//! - `FileRecord` and its transient `ContentHandle`
//! - The `RecordLifecycleHook` seam between persistence and storage
//! - Metadata snapshot projection (`metadata`)
//! - Structured errors (`ExError`) and the logging facility

pub mod errors;
pub mod hooks;
pub mod logging_facility;
pub mod metadata;
pub mod model;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, Result, VaultError};
pub use hooks::{NoopLifecycleHook, RecordLifecycleHook, RejectAllLifecycleHook};
pub use metadata::MetaSnapshot;
pub use model::{ContentHandle, FileProperties, FileRecord, UploadResponse};
