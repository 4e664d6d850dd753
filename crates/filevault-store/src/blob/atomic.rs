//! Atomic write primitives
//!
//! Content is streamed into a private temp file, fsynced, then renamed into
//! place. A reader of the final path sees either nothing or the whole file.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tempfile::NamedTempFile;

/// Content fully written to a temp file, not yet visible at its final path
pub struct StagedFile {
    temp: NamedTempFile,
    bytes_written: u64,
}

/// Stream `content` into a fresh temp file under `tmp_dir`
///
/// The temp name starts with `prefix` and ends in `.tmp`; concurrent callers
/// always get distinct files. On failure the temp file is removed before
/// returning.
pub fn stage<R: Read>(tmp_dir: &Path, prefix: &str, mut content: R) -> io::Result<StagedFile> {
    let temp = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(".tmp")
        .tempfile_in(tmp_dir)?;

    match copy_synced(&mut content, temp.as_file()) {
        Ok(bytes_written) => Ok(StagedFile {
            temp,
            bytes_written,
        }),
        Err(e) => {
            remove_temp(temp);
            Err(e)
        }
    }
}

fn copy_synced<R: Read>(content: &mut R, file: &File) -> io::Result<u64> {
    let mut out = file;
    let bytes_written = io::copy(content, &mut out)?;
    file.sync_all()?;
    Ok(bytes_written)
}

impl StagedFile {
    /// Number of bytes copied from the source stream
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Rename into `target`, replacing any file already there
    ///
    /// If the rename fails the temp file is removed.
    pub fn commit(self, target: &Path) -> io::Result<()> {
        match self.temp.persist(target) {
            Ok(_) => Ok(()),
            Err(e) => {
                remove_temp(e.file);
                Err(e.error)
            }
        }
    }

    /// Throw the staged content away
    pub fn discard(self) {
        remove_temp(self.temp);
    }
}

/// Delete a temp file; a failed delete is logged, never escalated
fn remove_temp(temp: NamedTempFile) {
    let path = temp.path().to_path_buf();
    if let Err(e) = temp.close() {
        tracing::error!(
            path = %path.display(),
            error = %e,
            "Failed to delete temp file"
        );
    }
}
