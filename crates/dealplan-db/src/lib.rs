//! Dealplan Database Library
//!
//! Postgres repositories for clients, responsibles, opportunities, inputs and
//! artifacts, plus the [`GenerationStore`] seam used by DSP generation.

pub mod db;

pub use db::{
    ArtifactRepository, ClientRepository, GenerationStore, InputRepository,
    OpportunityRepository, PgGenerationStore, ResponsibleRepository,
};
