//! Shared flow plumbing.

use crate::{FlowError, FlowResult, GenerativeModel, ModelHandle};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use validator::Validate;

/// One prompt-templated call to the model with typed input and output.
#[async_trait]
pub trait Flow: Send + Sync {
    type Request: Send + 'static;
    type Response: Send;

    /// Flow name used in logs.
    fn name(&self) -> &'static str;

    async fn run(&self, request: Self::Request) -> FlowResult<Self::Response>;
}

pub(crate) fn require_model(handle: &ModelHandle) -> FlowResult<Arc<dyn GenerativeModel>> {
    match handle {
        ModelHandle::Configured(model) => Ok(Arc::clone(model)),
        ModelHandle::Unconfigured => Err(FlowError::ProviderUnconfigured),
    }
}

/// Send `prompt`, then decode and validate the answer as `T`.
pub(crate) async fn generate_structured<T>(
    model: &dyn GenerativeModel,
    flow: &'static str,
    prompt: &str,
    schema: &Value,
) -> FlowResult<T>
where
    T: DeserializeOwned + Validate,
{
    let output = model.generate(prompt, schema).await.map_err(|e| {
        tracing::error!(flow, error = %e, "Model call failed");
        FlowError::from(e)
    })?;

    let Some(output) = output else {
        tracing::error!(flow, "Model returned no output");
        return Err(FlowError::Generation(
            "the model returned an empty output".to_string(),
        ));
    };

    let response: T = serde_json::from_value(output).map_err(|e| {
        tracing::error!(flow, error = %e, "Model output does not match the response schema");
        FlowError::Generation(format!("output does not match the response schema: {}", e))
    })?;

    response.validate().map_err(|e| {
        tracing::error!(flow, error = %e, "Model output failed validation");
        FlowError::Generation(format!("output failed validation: {}", e))
    })?;

    Ok(response)
}
