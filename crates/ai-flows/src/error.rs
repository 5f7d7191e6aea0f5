//! Error types for the generative flows.

use thiserror::Error;
use validator::ValidationErrors;

/// Errors talking to the hosted model.
#[derive(Error, Debug)]
pub enum ModelError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error response
    #[error("Gemini API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// The model refused to answer
    #[error("Response blocked: {0}")]
    Blocked(String),

    /// Invalid response from API (missing expected fields)
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

/// Result type alias using ModelError.
pub type ModelResult<T> = Result<T, ModelError>;

/// Failure of a flow's `run`.
#[derive(Error, Debug)]
pub enum FlowError {
    /// No model API key was configured.
    #[error("generative model is not configured")]
    ProviderUnconfigured,

    /// The request did not pass validation; nothing was sent.
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationErrors),

    /// The model returned nothing usable.
    #[error("generation failed: {0}")]
    Generation(String),
}

impl FlowError {
    /// Text shown to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            FlowError::ProviderUnconfigured => {
                "El servicio de IA no está configurado. Contacta al administrador."
            }
            FlowError::Validation(_) => "Revisa los datos del formulario.",
            FlowError::Generation(_) => {
                "No se pudo generar una respuesta. Inténtalo de nuevo más tarde."
            }
        }
    }
}

impl From<ModelError> for FlowError {
    fn from(err: ModelError) -> Self {
        FlowError::Generation(err.to_string())
    }
}

/// Result type alias using FlowError.
pub type FlowResult<T> = Result<T, FlowError>;
