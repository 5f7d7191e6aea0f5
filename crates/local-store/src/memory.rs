//! In-memory backend.

use crate::{LocalStore, StorageResult};
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// Volatile store; contents vanish with the value.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.data.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.data.lock().get(key).cloned())
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        Ok(self.data.lock().remove(key).is_some())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.data.lock().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LocalStoreExt, StorageError};

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();

        store.set("test_key", "test_value").unwrap();
        assert_eq!(store.get("test_key").unwrap(), Some("test_value".to_string()));

        assert!(store.has("test_key").unwrap());
        assert!(!store.has("nonexistent").unwrap());

        assert!(store.delete("test_key").unwrap());
        assert!(!store.delete("test_key").unwrap());
        assert_eq!(store.get("test_key").unwrap(), None);
    }

    #[test]
    fn test_json_helpers() {
        let store = MemoryStore::new();

        store.set_json("monthlyTarget", &7500.0_f64).unwrap();
        assert_eq!(store.get("monthlyTarget").unwrap().as_deref(), Some("7500.0"));
        assert_eq!(store.get_json::<f64>("monthlyTarget").unwrap(), Some(7500.0));
        assert_eq!(store.get_json::<f64>("missing").unwrap(), None);

        store.set("broken", "not json").unwrap();
        let err = store.get_json::<f64>("broken").unwrap_err();
        assert!(matches!(err, StorageError::Encoding { ref key, .. } if key == "broken"));
    }

    #[test]
    fn test_keys_sorted() {
        let store = MemoryStore::new();
        store.set("theme", "dark").unwrap();
        store.set("authUser", "{}").unwrap();
        assert_eq!(store.keys().unwrap(), vec!["authUser", "theme"]);
    }
}
