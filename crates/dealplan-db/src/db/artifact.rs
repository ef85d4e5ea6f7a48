use dealplan_core::{
    models::{Artifact, NewArtifact},
    AppError,
};
use sqlx::{PgPool, Postgres};

const ARTIFACT_COLUMNS: &str = "artifact_id, opportunity_id, artifact_name, artifact_type, \
     artifact_url, generated_at, generated_by, status, version, gdrive_file_name, gdrive_web_url";

/// Repository for generated artifacts
#[derive(Clone)]
pub struct ArtifactRepository {
    pool: PgPool,
}

impl ArtifactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Artifacts of an opportunity, highest version first
    #[tracing::instrument(skip(self), fields(db.table = "artifacts", db.operation = "select"))]
    pub async fn list_for_opportunity(
        &self,
        opportunity_id: i32,
    ) -> Result<Vec<Artifact>, AppError> {
        let query = format!(
            "SELECT {} FROM artifacts WHERE opportunity_id = $1 \
             ORDER BY version DESC, generated_at DESC, artifact_id DESC",
            ARTIFACT_COLUMNS
        );
        let artifacts = sqlx::query_as::<Postgres, Artifact>(&query)
            .bind(opportunity_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(artifacts)
    }

    #[tracing::instrument(skip(self), fields(db.table = "artifacts", db.operation = "select", db.record_id = id))]
    pub async fn get_artifact(&self, id: i32) -> Result<Option<Artifact>, AppError> {
        let query = format!("SELECT {} FROM artifacts WHERE artifact_id = $1", ARTIFACT_COLUMNS);
        let artifact = sqlx::query_as::<Postgres, Artifact>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(artifact)
    }

    /// Number of artifacts of one type for an opportunity
    #[tracing::instrument(skip(self), fields(db.table = "artifacts", db.operation = "count"))]
    pub async fn count_for_opportunity(
        &self,
        opportunity_id: i32,
        artifact_type: &str,
    ) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM artifacts WHERE opportunity_id = $1 AND artifact_type = $2",
        )
        .bind(opportunity_id)
        .bind(artifact_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Insert an artifact row. A taken `(opportunity_id, artifact_type, version)`
    /// surfaces as a unique violation (`AppError::is_unique_violation`).
    #[tracing::instrument(skip(self, artifact), fields(db.table = "artifacts", db.operation = "insert", version = artifact.version))]
    pub async fn insert_artifact(&self, artifact: NewArtifact) -> Result<Artifact, AppError> {
        let query = format!(
            r#"
            INSERT INTO artifacts
                (opportunity_id, artifact_name, artifact_type, artifact_url, generated_by, status, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            ARTIFACT_COLUMNS
        );
        let created = sqlx::query_as::<Postgres, Artifact>(&query)
            .bind(artifact.opportunity_id)
            .bind(&artifact.artifact_name)
            .bind(&artifact.artifact_type)
            .bind(&artifact.artifact_url)
            .bind(&artifact.generated_by)
            .bind(&artifact.status)
            .bind(artifact.version)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    /// Record where the document-automation webhook placed the artifact
    #[tracing::instrument(skip(self), fields(db.table = "artifacts", db.operation = "update", db.record_id = id))]
    pub async fn update_gdrive(
        &self,
        id: i32,
        gdrive_file_name: &str,
        gdrive_web_url: &str,
    ) -> Result<Option<Artifact>, AppError> {
        let query = format!(
            r#"
            UPDATE artifacts SET gdrive_file_name = $2, gdrive_web_url = $3
            WHERE artifact_id = $1
            RETURNING {}
            "#,
            ARTIFACT_COLUMNS
        );
        let updated = sqlx::query_as::<Postgres, Artifact>(&query)
            .bind(id)
            .bind(gdrive_file_name)
            .bind(gdrive_web_url)
            .fetch_optional(&self.pool)
            .await?;

        Ok(updated)
    }
}
