//! Durable key-value storage for client state.
//!
//! The marketplace frontend keeps a small amount of state on the device:
//! the signed-in identity and the offline cart. Both are stored through the
//! [`StorageBackend`] trait so the stores can run against the real filesystem
//! in production and an in-memory map in tests.
//!
//! Values are opaque strings; serialization is the caller's concern.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use thiserror::Error;

/// Errors that can occur when reading or writing backing storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failure.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A durable string key-value store.
///
/// Implementations must tolerate concurrent access from multiple handles;
/// all methods take `&self`.
pub trait StorageBackend: Send + Sync {
    /// Read the value for `key`, or `None` if it has never been written.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value under `key`. Deleting an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: StorageBackend + ?Sized> StorageBackend for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Storage keys for durable client state.
pub mod keys {
    /// Key for the signed-in identity snapshot.
    pub const IDENTITY: &str = "identity";

    /// Key for locally captured cart lines.
    pub const CART_LINES: &str = "cart_lines";
}
