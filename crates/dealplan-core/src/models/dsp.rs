//! Structured Deal Strategy Plan
//!
//! Every field is required: deserialization is the schema check for content
//! produced by the generation service. Unknown keys are ignored.

use serde::{Deserialize, Serialize};

/// Top-level envelope the generation service must return in structured mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DspDocument {
    pub deal_strategy_plan: DealStrategyPlan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealStrategyPlan {
    pub project_objective: ProjectObjective,
    pub use_case: UseCase,
    pub bundles: Bundles,
    pub preliminary_solution_approach: PreliminarySolutionApproach,
    pub functionalities_description: FunctionalitiesDescription,
    pub technical: Technical,
    pub competitiveness_and_strategic_positioning: CompetitivePositioning,
    pub commercial_roadmap_next_steps: CommercialRoadmap,
    pub meta: DspMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectObjective {
    pub purpose: String,
    pub strategic_objective: String,
    pub success_criteria: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseCase {
    pub purpose: String,
    pub problem_to_solve: String,
    pub current_consequences: String,
    pub business_impact: String,
    pub priority_level: String,
    pub priority_rationale: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bundles {
    pub purpose: String,
    pub recommended_bundle: String,
    pub bundle_options_considered: Vec<BundleOption>,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleOption {
    pub bundle: String,
    pub fit_reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreliminarySolutionApproach {
    pub purpose: String,
    pub recommended_approach: String,
    pub approach_rationale: String,
    pub assumptions: Vec<String>,
    pub open_questions: Vec<String>,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionalitiesDescription {
    pub purpose: String,
    pub expected_functionalities: Vec<Functionality>,
    pub out_of_scope: Vec<String>,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Functionality {
    pub name: String,
    pub description: String,
    pub business_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technical {
    pub purpose: String,
    pub cloud_environment: String,
    pub cloud_experience: String,
    pub infrastructure_owner: String,
    pub required_data: Vec<RequiredData>,
    pub data_gaps_or_risks: Vec<String>,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredData {
    pub data_type: String,
    pub availability: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitivePositioning {
    pub purpose: String,
    pub competitors_or_alternatives: Vec<Competitor>,
    pub santex_advantages: Vec<String>,
    pub differentiation_narrative: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub name: String,
    pub status_or_role: String,
    pub strengths: String,
    pub weaknesses: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommercialRoadmap {
    pub purpose: String,
    pub next_steps: Vec<NextStep>,
    pub dependencies: Vec<String>,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextStep {
    pub step: String,
    pub owner: String,
    pub expected_date_or_window: String,
    pub exit_criteria: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DspMeta {
    pub opportunity_id: String,
    pub generated_from_inputs: Vec<String>,
    pub confidence_level: String,
    pub missing_information_summary: String,
}
