use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use super::{Artifact, Input};

/// Status given to opportunities created without an explicit one
pub const DEFAULT_OPPORTUNITY_STATUS: &str = "OPEN";

/// A sales deal tying together a client, a responsible, inputs and artifacts
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Opportunity {
    pub opportunity_id: i32,
    pub opportunity_name: String,
    pub description: Option<String>,
    pub client_id: i32,
    pub responsible_id: i32,
    pub status: String,
    pub generated_at: DateTime<Utc>,
    pub generated_by: Option<String>,
}

/// Flat row of the opportunity list query (joins plus per-opportunity counts)
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OpportunityOverviewRow {
    pub opportunity_id: i32,
    pub opportunity_name: String,
    pub description: Option<String>,
    pub status: String,
    pub generated_at: DateTime<Utc>,
    pub generated_by: Option<String>,
    pub client_id: i32,
    pub client_name: String,
    pub responsible_id: i32,
    pub responsible_name: String,
    pub responsible_is_active: bool,
    pub input_count: i64,
    pub artifact_count: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClientSummary {
    pub client_id: i32,
    pub client_name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResponsibleSummary {
    pub responsible_id: i32,
    pub responsible_name: String,
    pub is_active: bool,
}

/// Opportunity with its client and responsible embedded
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OpportunityOverview {
    pub opportunity_id: i32,
    pub opportunity_name: String,
    pub description: Option<String>,
    pub status: String,
    pub generated_at: DateTime<Utc>,
    pub generated_by: Option<String>,
    pub client: ClientSummary,
    pub responsible: ResponsibleSummary,
    pub input_count: i64,
    pub artifact_count: i64,
}

impl From<OpportunityOverviewRow> for OpportunityOverview {
    fn from(row: OpportunityOverviewRow) -> Self {
        OpportunityOverview {
            opportunity_id: row.opportunity_id,
            opportunity_name: row.opportunity_name,
            description: row.description,
            status: row.status,
            generated_at: row.generated_at,
            generated_by: row.generated_by,
            client: ClientSummary {
                client_id: row.client_id,
                client_name: row.client_name,
            },
            responsible: ResponsibleSummary {
                responsible_id: row.responsible_id,
                responsible_name: row.responsible_name,
                is_active: row.responsible_is_active,
            },
            input_count: row.input_count,
            artifact_count: row.artifact_count,
        }
    }
}

/// Detail view: overview plus the documents attached to it
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OpportunityDetail {
    #[serde(flatten)]
    pub overview: OpportunityOverview,
    pub inputs: Vec<Input>,
    pub artifacts: Vec<Artifact>,
}

/// Reference to a client or responsible: an existing row by id, or a name
/// that is looked up and created when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum EntityRef {
    Existing { id: i32 },
    ByName { name: String },
}

fn validate_entity_ref(entity: &EntityRef) -> Result<(), ValidationError> {
    match entity {
        EntityRef::Existing { id } if *id <= 0 => {
            let mut err = ValidationError::new("invalid_id");
            err.message = Some("Referenced id must be positive".into());
            Err(err)
        }
        EntityRef::ByName { name } => {
            let trimmed = name.trim();
            if trimmed.is_empty() || trimmed.chars().count() > 255 {
                let mut err = ValidationError::new("invalid_name");
                err.message = Some("Name must be between 1 and 255 characters".into());
                return Err(err);
            }
            Ok(())
        }
        EntityRef::Existing { .. } => Ok(()),
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateOpportunityRequest {
    #[validate(
        length(
            min = 1,
            max = 255,
            message = "Opportunity name must be between 1 and 255 characters"
        ),
        custom(function = "crate::validation::not_blank")
    )]
    pub opportunity_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[validate(custom(function = "validate_entity_ref"))]
    pub client: EntityRef,
    #[validate(custom(function = "validate_entity_ref"))]
    pub responsible: EntityRef,
    #[serde(default)]
    #[validate(length(min = 1, max = 64, message = "Status must be between 1 and 64 characters"))]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateOpportunityRequest {
    #[serde(default)]
    #[validate(
        length(
            min = 1,
            max = 255,
            message = "Opportunity name must be between 1 and 255 characters"
        ),
        custom(function = "crate::validation::not_blank")
    )]
    pub opportunity_name: Option<String>,
    /// An empty string clears the description
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_entity_ref"))]
    pub client: Option<EntityRef>,
    #[serde(default)]
    #[validate(custom(function = "validate_entity_ref"))]
    pub responsible: Option<EntityRef>,
    #[serde(default)]
    #[validate(length(min = 1, max = 64, message = "Status must be between 1 and 64 characters"))]
    pub status: Option<String>,
}

/// Resolved values written to the opportunities table
#[derive(Debug, Clone)]
pub struct OpportunityChanges {
    pub opportunity_name: String,
    pub description: Option<String>,
    pub client_id: i32,
    pub responsible_id: i32,
    pub status: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListOpportunitiesQuery {
    /// Case-insensitive match on opportunity name, client name or status
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_ref_deserializes_both_shapes() {
        let existing: EntityRef = serde_json::from_str(r#"{"id": 4}"#).unwrap();
        assert_eq!(existing, EntityRef::Existing { id: 4 });

        let by_name: EntityRef = serde_json::from_str(r#"{"name": "Acme Corp"}"#).unwrap();
        assert_eq!(
            by_name,
            EntityRef::ByName {
                name: "Acme Corp".to_string()
            }
        );
    }

    #[test]
    fn test_create_request_requires_references() {
        let body = r#"{"opportunity_name": "Acme Renewal", "client": {"name": "Acme Corp"}}"#;
        assert!(serde_json::from_str::<CreateOpportunityRequest>(body).is_err());
    }

    #[test]
    fn test_create_request_rejects_blank_names() {
        let request: CreateOpportunityRequest = serde_json::from_str(
            r#"{"opportunity_name": "   ", "client": {"id": 1}, "responsible": {"name": " "}}"#,
        )
        .unwrap();
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("opportunity_name"));
        assert!(fields.contains_key("responsible"));
        assert!(!fields.contains_key("client"));
    }

    #[test]
    fn test_update_request_rejects_non_positive_reference() {
        let request: UpdateOpportunityRequest =
            serde_json::from_str(r#"{"client": {"id": 0}}"#).unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("client"));

        let echoed = serde_json::to_value(EntityRef::Existing { id: 0 }).unwrap();
        assert_eq!(echoed, serde_json::json!({"id": 0}));
    }
}
