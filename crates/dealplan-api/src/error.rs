//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Domain code
//! returns `AppError`, which converts into `HttpAppError` with `?`, so every
//! failure renders the same JSON body and is logged at the variant's level.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dealplan_core::{AppError, ErrorMetadata, LogLevel};
use dealplan_storage::StorageError;
use serde::de::DeserializeOwned;
use validator::Validate;

pub use dealplan_infra::ErrorResponse;

/// Wrapper type for AppError to implement IntoResponse (orphan rule)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

impl From<validator::ValidationErrors> for HttpAppError {
    fn from(err: validator::ValidationErrors) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(storage_to_app_error(err))
    }
}

/// Map a storage failure onto the shared error taxonomy
pub fn storage_to_app_error(err: StorageError) -> AppError {
    match err {
        StorageError::NotFound(msg) => AppError::NotFound(msg),
        StorageError::AlreadyExists(msg) => {
            AppError::Conflict(format!("A file with this name already exists: {}", msg))
        }
        StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
        StorageError::ConfigError(msg) => AppError::Configuration(msg),
        other => AppError::Storage(other.to_string()),
    }
}

/// JSON body extractor that also runs `validator` rules.
///
/// Deserialization failures and rule violations both become 400 with the
/// standard error body.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        inner.validate()?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Request failed");
        }
    }
}

static IS_PRODUCTION: std::sync::LazyLock<bool> = std::sync::LazyLock::new(|| {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| matches!(env.to_lowercase().as_str(), "production" | "prod"))
        .unwrap_or(false)
});

/// Build the response body; details are hidden in production and for sensitive errors
pub fn error_body(app_error: &AppError, is_production: bool) -> ErrorResponse {
    let expose_details = !is_production && !app_error.is_sensitive();
    ErrorResponse {
        error: app_error.client_message(),
        details: expose_details.then(|| app_error.detailed_message()),
        error_type: expose_details.then(|| app_error.error_type().to_string()),
        code: app_error.error_code().to_string(),
        recoverable: app_error.is_recoverable(),
        suggested_action: app_error.suggested_action().map(String::from),
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        (status, Json(error_body(app_error, *IS_PRODUCTION))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dealplan_core::UpstreamKind;

    #[test]
    fn test_storage_errors_map_to_taxonomy() {
        let HttpAppError(err) = StorageError::NotFound("inputs-files/1/a.pdf".into()).into();
        assert!(matches!(err, AppError::NotFound(_)));

        let HttpAppError(err) = StorageError::AlreadyExists("x".into()).into();
        assert_eq!(err.http_status_code(), 409);

        let HttpAppError(err) = StorageError::InvalidKey("../x".into()).into();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let HttpAppError(err) = StorageError::UploadFailed("disk full".into()).into();
        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(err.http_status_code(), 500);
    }

    #[test]
    fn test_sensitive_details_are_hidden() {
        let body = error_body(&AppError::Storage("bucket path /srv/x".into()), false);
        assert!(body.details.is_none());
        assert_eq!(body.code, "STORAGE_ERROR");

        let body = error_body(&AppError::NotFound("Opportunity 9".into()), false);
        assert!(body.details.is_some());
        assert_eq!(body.error_type.as_deref(), Some("NotFound"));

        let body = error_body(&AppError::NotFound("Opportunity 9".into()), true);
        assert!(body.details.is_none());
    }

    #[test]
    fn test_error_response_shape() {
        let body = error_body(
            &AppError::Upstream {
                kind: UpstreamKind::RateLimited,
                message: "slow down".into(),
            },
            false,
        );
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["code"], "RATE_LIMITED");
        assert!(json["recoverable"].as_bool().unwrap());
        assert!(json["error"].is_string());
    }
}
