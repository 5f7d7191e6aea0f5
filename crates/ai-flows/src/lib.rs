//! Generative flows for ProsperIA.
//!
//! Each flow validates its request, renders it into a fixed prompt, asks the
//! hosted model for JSON matching a response schema and validates what comes
//! back. There is no retry; a bad answer is a [`FlowError::Generation`].
//!
//! Flows hold a [`ModelHandle`]. Without an API key the handle is
//! `Unconfigured` and every `run` fails with
//! [`FlowError::ProviderUnconfigured`] before looking at the request.

mod error;
mod flow;
mod gemini;
mod model;
mod skill_relevance;
mod strategy;

pub use error::{FlowError, FlowResult, ModelError, ModelResult};
pub use flow::Flow;
pub use gemini::{GeminiModel, DEFAULT_MODEL, GEMINI_API_BASE};
pub use model::{GenerativeModel, ModelHandle};
pub use skill_relevance::{
    SkillRelevanceFlow, SkillRelevanceRequest, SkillRelevanceResponse, SuggestedItem,
};
pub use strategy::{RiskTolerance, StrategyFlow, StrategyRequest, StrategyResponse};
