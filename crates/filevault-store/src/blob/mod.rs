//! Blob storage on the local filesystem

mod atomic;
mod fs_store;

pub use fs_store::{BlobStore, StoredBlob, DATA_DIR, META_DIR, TMP_DIR};
