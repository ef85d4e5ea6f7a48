use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// An uploaded PDF source document attached to an opportunity
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Input {
    pub input_id: i32,
    pub opportunity_id: i32,
    /// Original file name as uploaded
    pub input_name: String,
    /// Key inside the inputs bucket
    pub storage_path: String,
    pub file_size_kb: i32,
    pub uploaded_at: DateTime<Utc>,
    pub uploaded_by: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewInput {
    pub opportunity_id: i32,
    pub input_name: String,
    pub storage_path: String,
    pub file_size_kb: i32,
    pub uploaded_by: String,
}

/// Size in KB as shown to users: bytes / 1024, rounded to nearest
pub fn file_size_kb(bytes: usize) -> i32 {
    let kb = (bytes as f64 / 1024.0).round();
    kb.min(i32::MAX as f64) as i32
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DownloadUrlQuery {
    /// Lifetime of the signed URL in seconds (default 60)
    pub expires_in: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DownloadUrlResponse {
    pub url: String,
    pub expires_in: u64,
}
