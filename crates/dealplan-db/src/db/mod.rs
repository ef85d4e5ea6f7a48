//! Database repositories for data access layer
//!
//! Each repository owns one table and returns `AppError` so handlers can
//! propagate failures with `?`.

pub mod artifact;
pub mod client;
pub mod generation;
pub mod input;
pub mod opportunity;
pub mod responsible;
pub mod transaction;

pub use artifact::ArtifactRepository;
pub use client::ClientRepository;
pub use generation::{GenerationStore, PgGenerationStore};
pub use input::InputRepository;
pub use opportunity::OpportunityRepository;
pub use responsible::ResponsibleRepository;
