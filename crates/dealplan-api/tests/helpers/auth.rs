use chrono::Duration;
use dealplan_api::auth::JwtService;

/// Secret shared by the test configuration and the tokens issued here
pub const TEST_JWT_SECRET: &str = "test-secret-key-min-32-characters-long-for-testing";

pub const TEST_USER_EMAIL: &str = "tester@acme.com";

/// `Authorization` header value for a valid caller
pub fn bearer() -> String {
    let token = JwtService::new(TEST_JWT_SECRET)
        .issue("user-1", Some(TEST_USER_EMAIL), Duration::hours(1))
        .expect("Failed to sign test token");
    format!("Bearer {}", token)
}

/// Token signed with a different secret
pub fn foreign_bearer() -> String {
    let token = JwtService::new("another-secret-that-is-also-long-enough-1234")
        .issue("intruder", None, Duration::hours(1))
        .expect("Failed to sign test token");
    format!("Bearer {}", token)
}
