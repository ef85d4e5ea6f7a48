use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// A salesperson owning opportunities. Deactivated rather than deleted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Responsible {
    pub responsible_id: i32,
    pub responsible_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateResponsibleRequest {
    #[validate(
        length(
            min = 1,
            max = 255,
            message = "Responsible name must be between 1 and 255 characters"
        ),
        custom(function = "crate::validation::not_blank")
    )]
    pub responsible_name: String,
}

/// Rename and/or toggle the active flag
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateResponsibleRequest {
    #[serde(default)]
    #[validate(
        length(
            min = 1,
            max = 255,
            message = "Responsible name must be between 1 and 255 characters"
        ),
        custom(function = "crate::validation::not_blank")
    )]
    pub responsible_name: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListResponsiblesQuery {
    /// Only return responsibles with this active flag
    pub active: Option<bool>,
}
