use crate::error::HttpAppError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use dealplan_core::AppError;
use serde::{Deserialize, Serialize};

/// JWT claims accepted by the API (HS256)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

/// Authenticated caller, inserted into request extensions by the auth middleware
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub subject: String,
    pub email: Option<String>,
}

impl AuthUser {
    /// Identity recorded in `generated_by` / `uploaded_by`: the email, else the subject
    pub fn actor(&self) -> &str {
        self.email
            .as_deref()
            .filter(|email| !email.trim().is_empty())
            .unwrap_or(&self.subject)
    }
}

impl From<JwtClaims> for AuthUser {
    fn from(claims: JwtClaims) -> Self {
        Self {
            subject: claims.sub,
            email: claims.email,
        }
    }
}

// Extracted from parts so it composes with Multipart
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| {
                HttpAppError(AppError::Unauthorized(
                    "Missing authentication context".to_string(),
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_prefers_email() {
        let user = AuthUser {
            subject: "user-1".into(),
            email: Some("jane@acme.com".into()),
        };
        assert_eq!(user.actor(), "jane@acme.com");

        let user = AuthUser {
            subject: "user-1".into(),
            email: None,
        };
        assert_eq!(user.actor(), "user-1");

        let user = AuthUser {
            subject: "user-1".into(),
            email: Some("  ".into()),
        };
        assert_eq!(user.actor(), "user-1");
    }
}
