//! filevault store - persistence layer with SQLite and a filesystem blob store
//!
//! Provides:
//! - `BlobStore`: atomic temp→rename writes into `data/`, best-effort
//!   metadata snapshots into `meta/`
//! - SQLite schema with migrations framework
//! - `SqliteRepo`: the persistence boundary that fires record lifecycle hooks
//! - `StoreConfig`: root path and database location

pub mod blob;
pub mod config;
pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;

// Re-export key types
pub use blob::{BlobStore, StoredBlob};
pub use config::StoreConfig;
pub use errors::Result;
pub use repo::SqliteRepo;
