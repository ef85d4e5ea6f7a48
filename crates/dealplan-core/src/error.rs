//! Error types module
//!
//! All failures of the service are unified under [`AppError`]. Each variant
//! self-describes how it is presented over HTTP through [`ErrorMetadata`].
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues and upstream refusals
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "DATABASE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Kind of refusal returned by an upstream service (AI gateway or webhook)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamKind {
    /// 429 from the AI gateway
    RateLimited,
    /// 402 from the AI gateway
    PaymentRequired,
    /// Any other gateway failure (bad status, unreachable, malformed reply)
    Gateway,
    /// Non-2xx reply from a webhook; the status is relayed to the caller
    Webhook(u16),
}

impl Display for UpstreamKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UpstreamKind::RateLimited => write!(f, "rate limited"),
            UpstreamKind::PaymentRequired => write!(f, "payment required"),
            UpstreamKind::Gateway => write!(f, "gateway error"),
            UpstreamKind::Webhook(status) => write!(f, "webhook returned {}", status),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("No inputs: {0}")]
    NoInputs(String),

    #[error("Insufficient corpus: {length} characters extracted, at least {minimum} required")]
    InsufficientCorpus { length: usize, minimum: usize },

    #[error("Generation failed after {attempts} attempts: {reason}")]
    GenerationFailed { attempts: u32, reason: String },

    #[error("Gateway timeout: {0}")]
    GatewayTimeout(String),

    #[error("Upstream error ({kind}): {message}")]
    Upstream { kind: UpstreamKind, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}

impl AppError {
    /// True when the error is a Postgres unique-constraint violation
    #[cfg(feature = "sqlx")]
    pub fn is_unique_violation(&self) -> bool {
        match self {
            AppError::Database(SqlxError::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }

    /// True when the error is a Postgres foreign-key violation
    #[cfg(feature = "sqlx")]
    pub fn is_foreign_key_violation(&self) -> bool {
        match self {
            AppError::Database(SqlxError::Database(db_err)) => db_err.is_foreign_key_violation(),
            _ => false,
        }
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Storage(_) => (
            500,
            "STORAGE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::BadRequest(_) => (
            400,
            "BAD_REQUEST",
            false,
            Some("Check request format and parameters"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::Conflict(_) => (
            409,
            "CONFLICT",
            false,
            Some("Rename the resource or remove the existing one"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            false,
            Some("Check the bearer token"),
            false,
            LogLevel::Debug,
        ),
        AppError::NoInputs(_) => (
            400,
            "NO_INPUTS",
            false,
            Some("Upload at least one PDF document before generating"),
            false,
            LogLevel::Debug,
        ),
        AppError::InsufficientCorpus { .. } => (
            400,
            "INSUFFICIENT_CORPUS",
            false,
            Some("Upload PDFs with selectable text (not scanned images)"),
            false,
            LogLevel::Warn,
        ),
        AppError::GenerationFailed { .. } => (
            500,
            "GENERATION_FAILED",
            true,
            Some("Retry the generation"),
            false,
            LogLevel::Error,
        ),
        AppError::GatewayTimeout(_) => (
            504,
            "GATEWAY_TIMEOUT",
            true,
            Some("Retry after a short delay"),
            false,
            LogLevel::Warn,
        ),
        AppError::Upstream { kind, .. } => match kind {
            UpstreamKind::RateLimited => (
                429,
                "RATE_LIMITED",
                true,
                Some("Wait a moment and try again"),
                false,
                LogLevel::Warn,
            ),
            UpstreamKind::PaymentRequired => (
                402,
                "PAYMENT_REQUIRED",
                false,
                Some("Add credits to the AI gateway workspace"),
                false,
                LogLevel::Warn,
            ),
            UpstreamKind::Gateway => (
                502,
                "UPSTREAM_ERROR",
                true,
                Some("Retry after a short delay"),
                false,
                LogLevel::Error,
            ),
            UpstreamKind::Webhook(status) => (
                *status,
                "UPSTREAM_ERROR",
                true,
                Some("Retry after a short delay"),
                false,
                LogLevel::Warn,
            ),
        },
        AppError::Configuration(_) => (
            500,
            "CONFIGURATION_ERROR",
            false,
            Some("Contact the administrator"),
            false,
            LogLevel::Error,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::Storage(_) => "Storage",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::BadRequest(_) => "BadRequest",
            AppError::NotFound(_) => "NotFound",
            AppError::Conflict(_) => "Conflict",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::NoInputs(_) => "NoInputs",
            AppError::InsufficientCorpus { .. } => "InsufficientCorpus",
            AppError::GenerationFailed { .. } => "GenerationFailed",
            AppError::GatewayTimeout(_) => "GatewayTimeout",
            AppError::Upstream { .. } => "Upstream",
            AppError::Configuration(_) => "Configuration",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::BadRequest(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Conflict(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::NoInputs(ref msg) => msg.clone(),
            AppError::InsufficientCorpus { .. } => {
                "The inputs do not contain enough text to generate the DSP".to_string()
            }
            AppError::GenerationFailed { .. } => {
                "Could not structure the DSP after multiple attempts. Please retry.".to_string()
            }
            AppError::GatewayTimeout(ref msg) => msg.clone(),
            AppError::Upstream { kind, message } => match kind {
                UpstreamKind::RateLimited => {
                    "Rate limit exceeded. Please try again later.".to_string()
                }
                UpstreamKind::PaymentRequired => {
                    "Payment required. Please add credits to your workspace.".to_string()
                }
                UpstreamKind::Gateway | UpstreamKind::Webhook(_) => message.clone(),
            },
            AppError::Configuration(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}
