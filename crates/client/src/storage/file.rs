//! Filesystem-backed storage.

use std::path::{Path, PathBuf};

use super::{StorageBackend, StorageError};

/// Storage backed by one file per key under a root directory.
///
/// Writes go to a temp file first and are renamed into place, so a crash
/// mid-write leaves the previous value intact rather than a truncated file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Create a storage rooted at `root`. The directory is created on first
    /// write, not here.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory this storage reads and writes under.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(StorageError::Io(error)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.root)?;

        let path = self.path_for(key);
        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, value)?;
        std::fs::rename(&temp_path, &path)?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(StorageError::Io(error)),
        }
    }
}
