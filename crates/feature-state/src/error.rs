//! Error types for feature state.

use local_store::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeatureError {
    /// Amount is not a finite number in the accepted range
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Task text is empty after trimming
    #[error("Task text cannot be empty")]
    EmptyTaskText,

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl FeatureError {
    /// Text shown to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            FeatureError::InvalidAmount(_) => "Por favor, ingresa un monto válido.",
            FeatureError::EmptyTaskText => "La tarea no puede estar vacía.",
            FeatureError::TaskNotFound(_) => "La tarea ya no existe.",
            FeatureError::Storage(_) => "No se pudieron guardar los cambios.",
        }
    }
}

/// Result type alias using FeatureError.
pub type FeatureResult<T> = Result<T, FeatureError>;
