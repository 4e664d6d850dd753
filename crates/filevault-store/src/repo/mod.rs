//! Repository layer for persisting file records to SQLite
//!
//! The only place that runs record lifecycle hooks.

pub mod sqlite_repo;

pub use sqlite_repo::SqliteRepo;
