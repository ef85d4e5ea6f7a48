use dealplan_core::{
    models::{Input, NewInput},
    AppError,
};
use sqlx::{PgPool, Postgres};

const INPUT_COLUMNS: &str =
    "input_id, opportunity_id, input_name, storage_path, file_size_kb, uploaded_at, uploaded_by";

/// Repository for uploaded input documents
#[derive(Clone)]
pub struct InputRepository {
    pool: PgPool,
}

impl InputRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inputs of an opportunity, newest upload first
    #[tracing::instrument(skip(self), fields(db.table = "inputs", db.operation = "select"))]
    pub async fn list_for_opportunity(&self, opportunity_id: i32) -> Result<Vec<Input>, AppError> {
        let query = format!(
            "SELECT {} FROM inputs WHERE opportunity_id = $1 ORDER BY uploaded_at DESC, input_id DESC",
            INPUT_COLUMNS
        );
        let inputs = sqlx::query_as::<Postgres, Input>(&query)
            .bind(opportunity_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(inputs)
    }

    #[tracing::instrument(skip(self), fields(db.table = "inputs", db.operation = "select", db.record_id = id))]
    pub async fn get_input(&self, id: i32) -> Result<Option<Input>, AppError> {
        let query = format!("SELECT {} FROM inputs WHERE input_id = $1", INPUT_COLUMNS);
        let input = sqlx::query_as::<Postgres, Input>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(input)
    }

    #[tracing::instrument(skip(self, input), fields(db.table = "inputs", db.operation = "insert"))]
    pub async fn create_input(&self, input: NewInput) -> Result<Input, AppError> {
        let query = format!(
            r#"
            INSERT INTO inputs (opportunity_id, input_name, storage_path, file_size_kb, uploaded_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            INPUT_COLUMNS
        );
        let created = sqlx::query_as::<Postgres, Input>(&query)
            .bind(input.opportunity_id)
            .bind(&input.input_name)
            .bind(&input.storage_path)
            .bind(input.file_size_kb)
            .bind(&input.uploaded_by)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    #[tracing::instrument(skip(self), fields(db.table = "inputs", db.operation = "delete", db.record_id = id))]
    pub async fn delete_input(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM inputs WHERE input_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
