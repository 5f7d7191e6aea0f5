//! Market relevance analysis of a single skill.
//!
//! The model is told to echo `skillName` verbatim. When it does not, the
//! requested name is written back before the response is returned.

use crate::flow::{generate_structured, require_model};
use crate::{Flow, FlowResult, ModelHandle};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

const FLOW_NAME: &str = "analyze_skill_relevance";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SkillRelevanceRequest {
    #[validate(length(min = 1, message = "Please enter a skill name to analyze."))]
    pub skill_name: String,
    /// Comma-separated list of the user's current skills.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_skills: Option<String>,
}

impl SkillRelevanceRequest {
    pub fn new(skill_name: impl Into<String>) -> Self {
        Self {
            skill_name: skill_name.into(),
            user_skills: None,
        }
    }

    pub fn with_user_skills(mut self, user_skills: impl Into<String>) -> Self {
        self.user_skills = Some(user_skills.into());
        self
    }

    fn trimmed(self) -> Self {
        Self {
            skill_name: self.skill_name.trim().to_string(),
            user_skills: self
                .user_skills
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }

    fn prompt(&self) -> String {
        let skill = &self.skill_name;
        let (context, synergy) = match &self.user_skills {
            Some(user_skills) => (
                format!(
                    "The user's current skills are: {user_skills}.\n\
Please analyze how {skill} synergizes with these existing skills."
                ),
                format!("How {skill} complements or enhances the user's skills: {user_skills}."),
            ),
            None => (
                "The user has not provided their current skills. Focus the synergy analysis on \
general complementarity."
                    .to_string(),
                format!("General synergies of {skill} with common professional skills."),
            ),
        };

        format!(
            "You are an AI career advisor. A user wants to analyze the relevance of the skill: {skill}.
{context}

Provide an analysis covering the following points. Your response MUST be a valid JSON object \
that strictly follows the response schema. All fields in the schema are important.

1. Market Demand for {skill}: (Categorize as High, Medium, Low, or Emerging, and briefly explain).
2. Synergy: ({synergy})
3. Income Impact Potential: (Qualitatively describe how learning {skill} could impact income potential).
4. Suggested Courses: (A list of 2 to 3 diverse course types or specific learning topics relevant \
to {skill}. Each item in this list MUST be an object with a 'name' field and a 'reason' field.)
5. Suggested Job Roles: (A list of 2 to 3 diverse job roles where {skill} is highly valued. Each \
item in this list MUST be an object with a 'name' field and a 'reason' field.)

The 'skillName' in the output JSON must be exactly \"{skill}\".
The 'suggestedCourses' and 'suggestedJobRoles' fields must be arrays of objects, where each \
object contains 'name' and 'reason' string properties. Ensure there are between 2 and 3 items \
in each of these arrays."
        )
    }
}

/// A suggested course or job role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedItem {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SkillRelevanceResponse {
    pub skill_name: String,
    /// High, Medium, Low or Emerging, with a short explanation.
    pub market_demand: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synergy_with_user_skills: Option<String>,
    pub income_impact_potential: String,
    #[validate(length(min = 2, max = 3, message = "expected 2 to 3 suggested courses"))]
    pub suggested_courses: Vec<SuggestedItem>,
    #[validate(length(min = 2, max = 3, message = "expected 2 to 3 suggested job roles"))]
    pub suggested_job_roles: Vec<SuggestedItem>,
}

impl SkillRelevanceResponse {
    /// Force `skill_name` to the requested value. Returns whether it changed.
    fn pin_skill_name(&mut self, requested: &str) -> bool {
        if self.skill_name == requested {
            return false;
        }
        self.skill_name = requested.to_string();
        true
    }
}

fn suggested_items_schema(description: &str) -> Value {
    json!({
        "type": "ARRAY",
        "description": description,
        "minItems": 2,
        "maxItems": 3,
        "items": {
            "type": "OBJECT",
            "properties": {
                "name": { "type": "STRING" },
                "reason": { "type": "STRING" }
            },
            "required": ["name", "reason"]
        }
    })
}

fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "skillName": { "type": "STRING" },
            "marketDemand": { "type": "STRING" },
            "synergyWithUserSkills": { "type": "STRING" },
            "incomeImpactPotential": { "type": "STRING" },
            "suggestedCourses": suggested_items_schema("2 to 3 suggested course types or topics."),
            "suggestedJobRoles": suggested_items_schema("2 to 3 job roles where this skill is valuable.")
        },
        "required": [
            "skillName",
            "marketDemand",
            "incomeImpactPotential",
            "suggestedCourses",
            "suggestedJobRoles"
        ]
    })
}

/// Analyzes market demand, synergy and income impact of a skill.
#[derive(Debug, Clone)]
pub struct SkillRelevanceFlow {
    model: ModelHandle,
}

impl SkillRelevanceFlow {
    pub fn new(model: ModelHandle) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Flow for SkillRelevanceFlow {
    type Request = SkillRelevanceRequest;
    type Response = SkillRelevanceResponse;

    fn name(&self) -> &'static str {
        FLOW_NAME
    }

    async fn run(&self, request: SkillRelevanceRequest) -> FlowResult<SkillRelevanceResponse> {
        let model = require_model(&self.model)?;
        let requested = request.skill_name.clone();
        let request = request.trimmed();
        request.validate()?;

        tracing::debug!(
            flow = FLOW_NAME,
            skill = %request.skill_name,
            with_user_skills = request.user_skills.is_some(),
            "Analyzing skill relevance"
        );

        let mut response: SkillRelevanceResponse =
            generate_structured(model.as_ref(), FLOW_NAME, &request.prompt(), &response_schema())
                .await?;

        let echoed = response.skill_name.clone();
        // Echo the caller's name as given, padding included.
        if response.pin_skill_name(&requested) {
            tracing::warn!(
                flow = FLOW_NAME,
                from = %echoed,
                to = %requested,
                "Model modified skillName, correcting"
            );
        }

        tracing::info!(
            flow = FLOW_NAME,
            skill = %response.skill_name,
            courses = response.suggested_courses.len(),
            job_roles = response.suggested_job_roles.len(),
            "Skill relevance analyzed"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str) -> SuggestedItem {
        SuggestedItem {
            name: name.into(),
            reason: "relevant".into(),
        }
    }

    fn response(skill_name: &str, courses: usize) -> SkillRelevanceResponse {
        SkillRelevanceResponse {
            skill_name: skill_name.into(),
            market_demand: "High".into(),
            synergy_with_user_skills: None,
            income_impact_potential: "Significant".into(),
            suggested_courses: (0..courses).map(|i| item(&format!("course {i}"))).collect(),
            suggested_job_roles: vec![item("Backend Engineer"), item("Systems Engineer")],
        }
    }

    #[test]
    fn test_pin_skill_name_is_idempotent() {
        let mut exact = response("Rust programming", 2);
        assert!(!exact.pin_skill_name("Rust programming"));
        assert_eq!(exact, response("Rust programming", 2));

        let mut drifted = response("Rust Programming", 2);
        assert!(drifted.pin_skill_name("Rust programming"));
        assert_eq!(drifted.skill_name, "Rust programming");
        assert!(!drifted.pin_skill_name("Rust programming"));
    }

    #[test]
    fn test_suggestion_bounds() {
        assert!(response("Rust", 1).validate().is_err());
        assert!(response("Rust", 2).validate().is_ok());
        assert!(response("Rust", 3).validate().is_ok());
        assert!(response("Rust", 4).validate().is_err());
    }

    #[test]
    fn test_blank_skill_rejected_after_trim() {
        let request = SkillRelevanceRequest::new("   ").trimmed();
        assert!(request.validate().is_err());

        let request = SkillRelevanceRequest::new(" Rust ").with_user_skills("  ").trimmed();
        assert_eq!(request.skill_name, "Rust");
        assert_eq!(request.user_skills, None);
    }

    #[test]
    fn test_prompt_branches_on_user_skills() {
        let without = SkillRelevanceRequest::new("Rust").prompt();
        assert!(without.contains("has not provided their current skills"));
        assert!(without.contains("must be exactly \"Rust\""));

        let with = SkillRelevanceRequest::new("Rust")
            .with_user_skills("Go, Kubernetes")
            .prompt();
        assert!(with.contains("The user's current skills are: Go, Kubernetes."));
        assert!(with.contains("complements or enhances the user's skills: Go, Kubernetes."));
    }

    #[test]
    fn test_response_wire_format() {
        let json = serde_json::json!({
            "skillName": "Rust",
            "marketDemand": "Emerging",
            "incomeImpactPotential": "High",
            "suggestedCourses": [{"name": "a", "reason": "b"}, {"name": "c", "reason": "d"}],
            "suggestedJobRoles": [{"name": "e", "reason": "f"}, {"name": "g", "reason": "h"}]
        });
        let parsed: SkillRelevanceResponse = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.synergy_with_user_skills, None);
        assert_eq!(parsed.suggested_job_roles[1].name, "g");
    }
}
