//! Single-file JSON backend.
//!
//! The whole store is one JSON object (`{"key": "value", ...}`). Every write
//! rewrites the file through a temporary sibling and a rename, so a crash
//! never leaves a half-written object behind.

use crate::{LocalStore, StorageError, StorageResult};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Durable store backed by a JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    data: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, creating parent directories.
    ///
    /// A missing file starts an empty store. A file that is not a JSON object
    /// of strings is reported as [`StorageError::Corrupt`].
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let data = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| StorageError::Corrupt(format!("{}: {}", path.display(), e)))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), keys = data.len(), "opened local store");
        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    /// Open the store, moving an unreadable file aside and starting empty.
    pub fn open_or_reset(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        match Self::open(&path) {
            Err(StorageError::Corrupt(reason)) => {
                let backup = path.with_extension("json.corrupt");
                warn!(
                    path = %path.display(),
                    backup = %backup.display(),
                    reason = %reason,
                    "local store unreadable, starting empty"
                );
                fs::rename(&path, &backup)?;
                Self::open(path)
            }
            other => other,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, data: &BTreeMap<String, String>) -> StorageResult<()> {
        let content = serde_json::to_string_pretty(data).map_err(|source| StorageError::Encoding {
            key: "*".to_string(),
            source,
        })?;
        write_atomically(&self.path, content.as_bytes())?;
        Ok(())
    }
}

fn write_atomically(path: &Path, content: &[u8]) -> io::Result<()> {
    let tmp_path = path.with_extension("json.tmp");

    let result = (|| -> io::Result<()> {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

impl LocalStore for FileStore {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut data = self.data.lock();
        let previous = data.insert(key.to_string(), value.to_string());
        if let Err(e) = self.persist(&data) {
            // Keep memory and disk in agreement.
            match previous {
                Some(old) => data.insert(key.to_string(), old),
                None => data.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.data.lock().get(key).cloned())
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        let mut data = self.data.lock();
        let Some(previous) = data.remove(key) else {
            return Ok(false);
        };
        if let Err(e) = self.persist(&data) {
            data.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(true)
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.data.lock().keys().cloned().collect())
    }
}
