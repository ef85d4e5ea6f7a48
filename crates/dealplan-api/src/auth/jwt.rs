//! HS256 token verification (and issuing, for tooling and tests)

use crate::auth::models::{AuthUser, JwtClaims};
use chrono::{Duration, Utc};
use dealplan_core::AppError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 30;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify signature and expiry and return the caller
    pub fn verify(&self, token: &str) -> Result<AuthUser, AppError> {
        let data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

        if data.claims.sub.trim().is_empty() {
            return Err(AppError::Unauthorized(
                "Invalid token: empty subject".to_string(),
            ));
        }

        Ok(AuthUser::from(data.claims))
    }

    pub fn issue(
        &self,
        subject: &str,
        email: Option<&str>,
        ttl: Duration,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: subject.to_string(),
            email: email.map(String::from),
            exp: (now + ttl).timestamp(),
            iat: Some(now.timestamp()),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-min-32-characters-long-for-testing";

    #[test]
    fn test_issue_then_verify() {
        let jwt = JwtService::new(SECRET);
        let token = jwt
            .issue("user-42", Some("jane@acme.com"), Duration::hours(1))
            .unwrap();

        let user = jwt.verify(&token).unwrap();
        assert_eq!(user.subject, "user-42");
        assert_eq!(user.actor(), "jane@acme.com");
    }

    #[test]
    fn test_rejects_wrong_secret_and_expired_tokens() {
        let jwt = JwtService::new(SECRET);
        let other = JwtService::new("another-secret-key-that-is-32-chars-long!!");

        let token = other.issue("user-42", None, Duration::hours(1)).unwrap();
        assert!(matches!(jwt.verify(&token), Err(AppError::Unauthorized(_))));

        let expired = jwt.issue("user-42", None, Duration::hours(-2)).unwrap();
        assert!(matches!(jwt.verify(&expired), Err(AppError::Unauthorized(_))));

        assert!(jwt.verify("not-a-jwt").is_err());
    }
}
