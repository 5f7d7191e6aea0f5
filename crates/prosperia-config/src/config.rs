//! Application configuration.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Identity Toolkit REST endpoint root.
pub const DEFAULT_FIREBASE_AUTH_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Generative Language REST endpoint root.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used by the AI flows unless overridden.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Identity provider settings. The provider counts as configured only when
/// an API key is present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FirebaseConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub auth_domain: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default = "default_firebase_auth_base_url")]
    pub auth_base_url: String,
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            auth_domain: None,
            project_id: None,
            auth_base_url: default_firebase_auth_base_url(),
        }
    }
}

/// Hosted model settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            base_url: default_gemini_base_url(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Mirror log output on stderr.
    #[serde(default)]
    pub log_to_stderr: bool,
    #[serde(default)]
    pub firebase: FirebaseConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_firebase_auth_base_url() -> String {
    DEFAULT_FIREBASE_AUTH_BASE_URL.to_string()
}

fn default_gemini_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

fn default_gemini_base_url() -> String {
    DEFAULT_GEMINI_BASE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_to_stderr: false,
            firebase: FirebaseConfig::default(),
            gemini: GeminiConfig::default(),
        }
    }
}

impl Config {
    /// Create a new Config with default values, then override from environment.
    pub fn new() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    /// Load configuration from `config.json` under the base directory,
    /// falling back to defaults, then apply environment overrides.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    fn load_from_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from a variable lookup. Empty values count as absent.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).and_then(non_empty);

        if let Some(level) = var("PROSPERIA_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(flag) = var("PROSPERIA_LOG_STDERR") {
            self.log_to_stderr = matches!(flag.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(key) = var("PROSPERIA_FIREBASE_API_KEY") {
            self.firebase.api_key = Some(key);
        }
        if let Some(domain) = var("PROSPERIA_FIREBASE_AUTH_DOMAIN") {
            self.firebase.auth_domain = Some(domain);
        }
        if let Some(project) = var("PROSPERIA_FIREBASE_PROJECT_ID") {
            self.firebase.project_id = Some(project);
        }
        if let Some(key) = var("PROSPERIA_GEMINI_API_KEY").or_else(|| var("GOOGLE_API_KEY")) {
            self.gemini.api_key = Some(key);
        }
        if let Some(model) = var("PROSPERIA_GEMINI_MODEL") {
            self.gemini.model = model;
        }

        // A blank key in the file is the same as no key.
        self.firebase.api_key = self.firebase.api_key.take().and_then(non_empty);
        self.gemini.api_key = self.gemini.api_key.take().and_then(non_empty);
    }

    /// Whether the identity provider can be contacted at all.
    pub fn identity_configured(&self) -> bool {
        self.firebase.api_key.is_some()
    }

    /// Whether the hosted model can be contacted at all.
    pub fn model_configured(&self) -> bool {
        self.gemini.api_key.is_some()
    }

    /// Get the identity endpoint root as a parsed URL.
    pub fn firebase_auth_base_url(&self) -> CoreResult<Url> {
        Url::parse(&self.firebase.auth_base_url).map_err(CoreError::from)
    }

    /// Get the model endpoint root as a parsed URL.
    pub fn gemini_base_url(&self) -> CoreResult<Url> {
        if self.gemini.model.trim().is_empty() {
            return Err(CoreError::Config("gemini model name is empty".to_string()));
        }
        Url::parse(&self.gemini.base_url).map_err(CoreError::from)
    }
}

fn non_empty(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.gemini.model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.firebase.auth_base_url, DEFAULT_FIREBASE_AUTH_BASE_URL);
        assert!(!config.identity_configured());
        assert!(!config.model_configured());
    }

    #[test]
    fn test_config_load_from_file_fills_missing_sections() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(
            &config_path,
            r#"{ "log_level": "debug", "firebase": { "api_key": "fb-key" } }"#,
        )
        .unwrap();

        let config = Config::load_from_file(&config_path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.firebase.api_key.as_deref(), Some("fb-key"));
        assert_eq!(config.firebase.auth_base_url, DEFAULT_FIREBASE_AUTH_BASE_URL);
        assert_eq!(config.gemini, GeminiConfig::default());
    }

    #[test]
    fn test_config_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        let mut config = Config::default();
        config.log_level = "trace".to_string();
        config.gemini.model = "gemini-1.5-pro".to_string();
        config.save(&paths).unwrap();

        let loaded = Config::load_from_file(&paths.config_file()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_load_nonexistent_uses_defaults() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().join("missing"));

        let config = Config::load(&paths).unwrap();
        assert_eq!(config.firebase.auth_base_url, DEFAULT_FIREBASE_AUTH_BASE_URL);
    }

    #[test]
    fn test_overrides_apply() {
        let mut config = Config::default();
        config.apply_overrides(lookup(&[
            ("PROSPERIA_LOG_LEVEL", "warn"),
            ("PROSPERIA_LOG_STDERR", "true"),
            ("PROSPERIA_FIREBASE_API_KEY", "fb"),
            ("PROSPERIA_FIREBASE_PROJECT_ID", "prosperia-app"),
            ("PROSPERIA_GEMINI_API_KEY", "gm"),
            ("PROSPERIA_GEMINI_MODEL", "gemini-1.5-flash"),
        ]));

        assert_eq!(config.log_level, "warn");
        assert!(config.log_to_stderr);
        assert!(config.identity_configured());
        assert_eq!(config.firebase.project_id.as_deref(), Some("prosperia-app"));
        assert_eq!(config.gemini.api_key.as_deref(), Some("gm"));
        assert_eq!(config.gemini.model, "gemini-1.5-flash");
    }

    #[test]
    fn test_google_api_key_fallback() {
        let mut config = Config::default();
        config.apply_overrides(lookup(&[("GOOGLE_API_KEY", "google")]));
        assert_eq!(config.gemini.api_key.as_deref(), Some("google"));

        let mut config = Config::default();
        config.apply_overrides(lookup(&[
            ("GOOGLE_API_KEY", "google"),
            ("PROSPERIA_GEMINI_API_KEY", "explicit"),
        ]));
        assert_eq!(config.gemini.api_key.as_deref(), Some("explicit"));
    }

    #[test]
    fn test_empty_values_count_as_absent() {
        let mut config = Config::default();
        config.firebase.api_key = Some("   ".to_string());
        config.apply_overrides(lookup(&[
            ("PROSPERIA_GEMINI_API_KEY", ""),
            ("PROSPERIA_LOG_LEVEL", "  "),
        ]));

        assert!(!config.identity_configured());
        assert!(!config.model_configured());
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_base_urls_parse() {
        let config = Config::default();
        assert_eq!(config.firebase_auth_base_url().unwrap().scheme(), "https");
        assert!(config
            .gemini_base_url()
            .unwrap()
            .host_str()
            .unwrap()
            .contains("googleapis.com"));
    }

    #[test]
    fn test_invalid_urls_and_model() {
        let mut config = Config::default();
        config.firebase.auth_base_url = "not a valid url".to_string();
        assert!(matches!(
            config.firebase_auth_base_url(),
            Err(CoreError::InvalidUrl(_))
        ));

        config.gemini.model = " ".to_string();
        assert!(matches!(config.gemini_base_url(), Err(CoreError::Config(_))));
    }
}
