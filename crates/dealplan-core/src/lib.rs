//! Dealplan Core Library
//!
//! Domain models, error types, configuration and validation shared by the
//! storage, database, AI and API crates.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod validation;

pub use config::{BaseConfig, Config, DealPlanConfig};
pub use error::{AppError, ErrorMetadata, LogLevel, UpstreamKind};
pub use storage_types::StorageBackend;
