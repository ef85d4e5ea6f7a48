//! Persistence seam of the DSP generation pipeline
//!
//! The pipeline only needs four queries. Keeping them behind a trait lets the
//! pipeline be exercised with in-memory stores.

use async_trait::async_trait;
use dealplan_core::{
    models::{Artifact, Input, NewArtifact, Opportunity},
    AppError,
};
use sqlx::PgPool;

use super::{ArtifactRepository, InputRepository, OpportunityRepository};

#[async_trait]
pub trait GenerationStore: Send + Sync {
    async fn get_opportunity(&self, opportunity_id: i32) -> Result<Option<Opportunity>, AppError>;

    /// Inputs newest first
    async fn list_inputs(&self, opportunity_id: i32) -> Result<Vec<Input>, AppError>;

    async fn count_artifacts(
        &self,
        opportunity_id: i32,
        artifact_type: &str,
    ) -> Result<i64, AppError>;

    /// Must fail with a unique violation when the version is already taken
    async fn insert_artifact(&self, artifact: NewArtifact) -> Result<Artifact, AppError>;
}

/// Postgres-backed [`GenerationStore`]
#[derive(Clone)]
pub struct PgGenerationStore {
    opportunities: OpportunityRepository,
    inputs: InputRepository,
    artifacts: ArtifactRepository,
}

impl PgGenerationStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            opportunities: OpportunityRepository::new(pool.clone()),
            inputs: InputRepository::new(pool.clone()),
            artifacts: ArtifactRepository::new(pool),
        }
    }
}

#[async_trait]
impl GenerationStore for PgGenerationStore {
    async fn get_opportunity(&self, opportunity_id: i32) -> Result<Option<Opportunity>, AppError> {
        self.opportunities.get_opportunity(opportunity_id).await
    }

    async fn list_inputs(&self, opportunity_id: i32) -> Result<Vec<Input>, AppError> {
        self.inputs.list_for_opportunity(opportunity_id).await
    }

    async fn count_artifacts(
        &self,
        opportunity_id: i32,
        artifact_type: &str,
    ) -> Result<i64, AppError> {
        self.artifacts
            .count_for_opportunity(opportunity_id, artifact_type)
            .await
    }

    async fn insert_artifact(&self, artifact: NewArtifact) -> Result<Artifact, AppError> {
        self.artifacts.insert_artifact(artifact).await
    }
}
