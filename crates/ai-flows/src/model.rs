//! Generative model boundary.

use crate::ModelResult;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A hosted model that answers a prompt with JSON shaped by `schema`.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// `Ok(None)` means the model produced no output.
    async fn generate(&self, prompt: &str, schema: &Value) -> ModelResult<Option<Value>>;
}

/// A model that may be missing from the configuration.
#[derive(Clone)]
pub enum ModelHandle {
    Configured(Arc<dyn GenerativeModel>),
    Unconfigured,
}

impl ModelHandle {
    pub fn configured(model: impl GenerativeModel + 'static) -> Self {
        ModelHandle::Configured(Arc::new(model))
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, ModelHandle::Configured(_))
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelHandle::Configured(_) => f.write_str("ModelHandle::Configured(..)"),
            ModelHandle::Unconfigured => f.write_str("ModelHandle::Unconfigured"),
        }
    }
}
