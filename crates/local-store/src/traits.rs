//! Storage trait definitions.

use crate::{StorageError, StorageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Store handle shared between the session layer and feature state.
pub type SharedStore = Arc<dyn LocalStore>;

/// Trait for key-value storage backends.
pub trait LocalStore: Send + Sync {
    /// Store a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Retrieve a value
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Delete a value, reporting whether it existed
    fn delete(&self, key: &str) -> StorageResult<bool>;

    /// Check if a key exists
    fn has(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// All stored keys, sorted.
    fn keys(&self) -> StorageResult<Vec<String>>;
}

/// Typed JSON access on top of any [`LocalStore`].
pub trait LocalStoreExt {
    /// Decode the value under `key`. A missing key yields `Ok(None)`; a value
    /// that does not decode yields [`StorageError::Encoding`].
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>>;

    /// Encode `value` as JSON and store it under `key`.
    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()>;
}

impl<S: LocalStore + ?Sized> LocalStoreExt for S {
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        match self.get(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StorageError::Encoding {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Encoding {
            key: key.to_string(),
            source,
        })?;
        self.set(key, &raw)
    }
}
