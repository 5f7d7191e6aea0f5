//! Local key-value storage for ProsperIA.
//!
//! Values are strings keyed by name, mirroring a browser's local storage:
//! - [`FileStore`] keeps every key in one JSON object on disk
//! - [`MemoryStore`] keeps them in memory (tests, ephemeral sessions)
//!
//! Structured values go through [`LocalStoreExt::get_json`] and
//! [`LocalStoreExt::set_json`].

mod file;
mod keys;
mod memory;
mod traits;

pub use file::FileStore;
pub use keys::StorageKeys;
pub use memory::MemoryStore;
pub use traits::{LocalStore, LocalStoreExt, SharedStore};

use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Encoding/decoding error
    #[error("Encoding error for key {key}: {source}")]
    Encoding {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The backing file exists but is not a JSON object of strings
    #[error("Corrupt storage file: {0}")]
    Corrupt(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
