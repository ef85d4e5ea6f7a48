//! API constants

/// Prefix of every versioned route
pub const API_PREFIX: &str = "/api/v1";

/// Lifetime of the signed URL stored on a generated artifact (one year)
pub const ARTIFACT_URL_TTL_SECS: u64 = 31_536_000;

/// Default and maximum lifetime of an input download URL
pub const DEFAULT_DOWNLOAD_URL_TTL_SECS: u64 = 60;
pub const MAX_DOWNLOAD_URL_TTL_SECS: u64 = 604_800;

/// Timeout applied to each dependency probe of `/health`
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
