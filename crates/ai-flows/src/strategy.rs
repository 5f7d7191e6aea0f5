//! Personalized income strategy generation.

use crate::flow::{generate_structured, require_model};
use crate::{Flow, FlowResult, ModelHandle};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use validator::Validate;

const FLOW_NAME: &str = "generate_income_strategy";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RiskTolerance::Low => "low",
            RiskTolerance::Medium => "medium",
            RiskTolerance::High => "high",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StrategyRequest {
    /// Comma-separated skills.
    #[validate(length(min = 10, message = "Skills description must be at least 10 characters."))]
    pub skills: String,
    #[validate(length(
        min = 10,
        message = "Experience description must be at least 10 characters."
    ))]
    pub experience: String,
    /// City and state.
    #[validate(length(min = 2, message = "Location must be at least 2 characters."))]
    pub location: String,
    pub risk_tolerance: RiskTolerance,
}

impl StrategyRequest {
    fn trimmed(self) -> Self {
        Self {
            skills: self.skills.trim().to_string(),
            experience: self.experience.trim().to_string(),
            location: self.location.trim().to_string(),
            risk_tolerance: self.risk_tolerance,
        }
    }

    fn prompt(&self) -> String {
        format!(
            "You are an AI assistant designed to generate personalized income strategies for users \
based on their skills, experience, location, and risk tolerance.

Skills: {skills}
Experience: {experience}
Location: {location}
Risk Tolerance: {risk}

Generate a list of income strategies that are tailored to the user's specific circumstances. \
Consider various factors such as job market trends, salary data, and the user's risk appetite.
Strategies:",
            skills = self.skills,
            experience = self.experience,
            location = self.location,
            risk = self.risk_tolerance,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct StrategyResponse {
    pub strategies: Vec<String>,
}

fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "strategies": {
                "type": "ARRAY",
                "description": "A list of personalized income strategies for the user.",
                "items": { "type": "STRING" }
            }
        },
        "required": ["strategies"]
    })
}

/// Generates income strategies from a profile.
#[derive(Debug, Clone)]
pub struct StrategyFlow {
    model: ModelHandle,
}

impl StrategyFlow {
    pub fn new(model: ModelHandle) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Flow for StrategyFlow {
    type Request = StrategyRequest;
    type Response = StrategyResponse;

    fn name(&self) -> &'static str {
        FLOW_NAME
    }

    async fn run(&self, request: StrategyRequest) -> FlowResult<StrategyResponse> {
        let model = require_model(&self.model)?;
        let request = request.trimmed();
        request.validate()?;

        tracing::debug!(
            flow = FLOW_NAME,
            risk_tolerance = %request.risk_tolerance,
            "Generating income strategies"
        );

        let response: StrategyResponse =
            generate_structured(model.as_ref(), FLOW_NAME, &request.prompt(), &response_schema())
                .await?;

        tracing::info!(
            flow = FLOW_NAME,
            strategies = response.strategies.len(),
            "Income strategies generated"
        );
        Ok(response)
    }
}
