//! File-per-key backend under a data directory

use super::{Backend, StorageError};
use fs4::fs_std::FileExt;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Backend storing each key as `<dir>/<key>.json`.
///
/// Writes go to a temporary file that is renamed over the target while an
/// exclusive lock is held on `<dir>/<key>.lock`, so a reader never sees a
/// half-written blob and two processes never interleave writes.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Backend rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File holding the blob for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is empty or contains path components.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        self.sibling(key, "json")
    }

    fn sibling(&self, key: &str, extension: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.{extension}")))
    }
}

fn io_error(action: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> StorageError {
    let path = path.to_path_buf();
    move |source| StorageError::Io {
        action,
        path,
        source,
    }
}

impl Backend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error("read", &path)(e)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let lock_path = self.sibling(key, "lock")?;
        let tmp_path = self.sibling(key, "json.tmp")?;

        fs::create_dir_all(&self.dir).map_err(io_error("create directory", &self.dir))?;

        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(io_error("open lock file", &lock_path))?;
        lock.lock_exclusive().map_err(io_error("lock", &lock_path))?;

        let written = fs::write(&tmp_path, value)
            .map_err(io_error("write", &tmp_path))
            .and_then(|()| fs::rename(&tmp_path, &path).map_err(io_error("replace", &path)));
        if written.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        written?;
        debug!("Saved {} bytes to {:?}", value.len(), path);

        // Closing the handle releases the lock.
        drop(lock);
        Ok(())
    }
}
