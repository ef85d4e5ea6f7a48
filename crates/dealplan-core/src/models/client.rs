use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// A customer organization referenced by opportunities
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Client {
    pub client_id: i32,
    pub client_name: String,
    pub created_at: DateTime<Utc>,
}

/// Request DTO for creating or renaming a client
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ClientRequest {
    #[validate(
        length(
            min = 1,
            max = 255,
            message = "Client name must be between 1 and 255 characters"
        ),
        custom(function = "crate::validation::not_blank")
    )]
    pub client_name: String,
}
