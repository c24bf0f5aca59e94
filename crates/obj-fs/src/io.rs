//! Commit-or-discard file writes
//!
//! A [`PendingWrite`] stages content in a temporary file next to its target.
//! The target only appears on [`PendingWrite::commit`], which renames the
//! temporary file into place. Every other exit path, including an early
//! return or a panic unwinding through the owner, removes the temporary file.

use std::fs;
use std::io::Write;
use std::path::Path;

use fs2::FileExt;
use tempfile::NamedTempFile;

use crate::{Error, NormalizedPath, Result};

const TEMP_PREFIX: &str = ".pending-";
const TEMP_SUFFIX: &str = ".tmp";

/// A write that is not yet visible at its final path.
#[derive(Debug)]
pub struct PendingWrite {
    target: NormalizedPath,
    temp: NamedTempFile,
}

impl PendingWrite {
    /// Open a pending write for `target`.
    ///
    /// Missing parent directories are created owner-only. The temporary file
    /// lives in the target directory so the final rename stays on one
    /// filesystem.
    pub fn open(target: &NormalizedPath) -> Result<Self> {
        let native = target.to_native();
        let parent = native
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| Error::NoParent {
                path: native.clone(),
            })?;

        create_dir_private(parent)?;

        // The temp name is short on purpose: the target name may already be
        // close to the filesystem's name length limit.
        let temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(parent)
            .map_err(|e| Error::io(parent, e))?;

        tracing::trace!(path = %target, temp = %temp.path().display(), "opened pending write");

        Ok(Self {
            target: target.clone(),
            temp,
        })
    }

    /// The path this write will be committed to.
    pub fn target(&self) -> &NormalizedPath {
        &self.target
    }

    /// The temporary file currently holding the content.
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    /// Append content to the temporary file.
    pub fn write_all(&mut self, content: &[u8]) -> Result<()> {
        self.temp
            .as_file_mut()
            .write_all(content)
            .map_err(|e| Error::io(self.temp.path(), e))
    }

    /// Flush buffered content and sync it to disk, surfacing I/O errors now
    /// rather than at commit time.
    pub fn flush(&mut self) -> Result<()> {
        let temp_path = self.temp.path().to_path_buf();
        let file = self.temp.as_file_mut();
        file.flush().map_err(|e| Error::io(&temp_path, e))?;
        file.sync_all().map_err(|e| Error::io(&temp_path, e))
    }

    /// Atomically rename the temporary file onto the target path.
    pub fn commit(self) -> Result<()> {
        let native = self.target.to_native();
        self.temp
            .persist(&native)
            .map_err(|e| Error::io(&native, e.error))?;

        tracing::trace!(path = %self.target, "committed pending write");
        Ok(())
    }

    /// Remove the temporary file without touching the target.
    ///
    /// Dropping a `PendingWrite` has the same effect; this variant reports
    /// removal errors.
    pub fn discard(self) -> Result<()> {
        let temp_path = self.temp.path().to_path_buf();
        self.temp.close().map_err(|e| Error::io(temp_path, e))
    }
}

/// Write content atomically to a file with locking.
///
/// Stages the content in a [`PendingWrite`], holds an advisory lock on the
/// temporary file while writing, then commits it.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let mut pending = PendingWrite::open(path)?;

    pending
        .temp
        .as_file()
        .lock_exclusive()
        .map_err(|_| Error::LockFailed {
            path: path.to_native(),
        })?;

    pending.write_all(content)?;
    pending.flush()?;

    pending
        .temp
        .as_file()
        .unlock()
        .map_err(|_| Error::LockFailed {
            path: path.to_native(),
        })?;

    pending.commit()
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Write text content to a file atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

/// Remove a file. A file that is already gone is not an error.
pub fn remove_file(path: &NormalizedPath) -> Result<()> {
    let native = path.to_native();
    match fs::remove_file(&native) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io(native, e)),
    }
}

/// Create a directory and any missing parents, traversable by the owner only.
pub fn create_dir_private(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }

    builder.create(path).map_err(|e| Error::io(path, e))
}
