//! Light/dark theme preference.

use crate::FeatureResult;
use local_store::{LocalStore, SharedStore, StorageKeys};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    fn from_stored(value: &str) -> Option<Theme> {
        match value {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored theme choice. The raw `light`/`dark` string is kept, not JSON.
pub struct ThemePreference {
    store: SharedStore,
}

impl ThemePreference {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Explicit choice, if one was saved.
    pub fn stored(&self) -> FeatureResult<Option<Theme>> {
        Ok(self
            .store
            .get(StorageKeys::THEME)?
            .as_deref()
            .and_then(Theme::from_stored))
    }

    /// Saved choice, or the system's when none was saved.
    pub fn resolve(&self, system_prefers_dark: bool) -> FeatureResult<Theme> {
        Ok(self.stored()?.unwrap_or(if system_prefers_dark {
            Theme::Dark
        } else {
            Theme::Light
        }))
    }

    pub fn set(&self, theme: Theme) -> FeatureResult<()> {
        self.store.set(StorageKeys::THEME, theme.as_str())?;
        debug!(theme = %theme, "Theme saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use local_store::{LocalStore, MemoryStore};
    use std::sync::Arc;

    #[test]
    fn test_resolution_order() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let theme = ThemePreference::new(Arc::clone(&store));

        assert_eq!(theme.resolve(true).unwrap(), Theme::Dark);
        assert_eq!(theme.resolve(false).unwrap(), Theme::Light);

        theme.set(Theme::Light).unwrap();
        assert_eq!(store.get(StorageKeys::THEME).unwrap().as_deref(), Some("light"));
        assert_eq!(theme.resolve(true).unwrap(), Theme::Light);

        store.set(StorageKeys::THEME, "sepia").unwrap();
        assert_eq!(theme.stored().unwrap(), None);
        assert_eq!(theme.resolve(true).unwrap(), Theme::Dark);
    }
}
