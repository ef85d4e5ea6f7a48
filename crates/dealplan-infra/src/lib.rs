//! Dealplan Infrastructure Library
//!
//! Shared infrastructure used by the API binary:
//! - Middleware (request ID, security headers)
//! - Tracing subscriber initialization
//! - The JSON error body returned by every failing endpoint

#[cfg(feature = "middleware")]
pub mod middleware;

#[cfg(feature = "observability-basic")]
pub mod telemetry;

pub mod error;

// Re-export commonly used types
#[cfg(feature = "middleware")]
pub use middleware::{
    get_request_id, request_id_middleware, security_headers_middleware, RequestId,
};

#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, shutdown_telemetry, LogFormat};

pub use error::ErrorResponse;
