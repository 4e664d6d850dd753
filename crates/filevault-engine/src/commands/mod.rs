//! Command orchestration layer.
//!
//! Coordinates the core model, the SQLite repository and the blob store.

pub mod file_service;
pub mod storage_listener;
pub mod upload;
