use dealplan_core::{
    models::{EntityRef, Responsible},
    AppError,
};
use sqlx::{PgConnection, PgPool, Postgres};

/// Repository for managing responsibles (deal owners)
#[derive(Clone)]
pub struct ResponsibleRepository {
    pool: PgPool,
}

impl ResponsibleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List responsibles by name, optionally filtered on `is_active`
    #[tracing::instrument(skip(self), fields(db.table = "responsibles", db.operation = "select"))]
    pub async fn list_responsibles(
        &self,
        active: Option<bool>,
    ) -> Result<Vec<Responsible>, AppError> {
        let responsibles = sqlx::query_as::<Postgres, Responsible>(
            r#"
            SELECT responsible_id, responsible_name, is_active, created_at
            FROM responsibles
            WHERE ($1::boolean IS NULL OR is_active = $1)
            ORDER BY responsible_name ASC
            "#,
        )
        .bind(active)
        .fetch_all(&self.pool)
        .await?;

        Ok(responsibles)
    }

    #[tracing::instrument(skip(self), fields(db.table = "responsibles", db.operation = "insert"))]
    pub async fn create_responsible(&self, name: &str) -> Result<Responsible, AppError> {
        sqlx::query_as::<Postgres, Responsible>(
            r#"
            INSERT INTO responsibles (responsible_name, is_active)
            VALUES ($1, TRUE)
            RETURNING responsible_id, responsible_name, is_active, created_at
            "#,
        )
        .bind(name.trim())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| name_conflict(e, name))
    }

    /// Rename and/or toggle `is_active`; absent fields keep their value
    #[tracing::instrument(skip(self), fields(db.table = "responsibles", db.operation = "update", db.record_id = id))]
    pub async fn update_responsible(
        &self,
        id: i32,
        name: Option<&str>,
        is_active: Option<bool>,
    ) -> Result<Option<Responsible>, AppError> {
        sqlx::query_as::<Postgres, Responsible>(
            r#"
            UPDATE responsibles
            SET responsible_name = COALESCE($2, responsible_name),
                is_active = COALESCE($3, is_active)
            WHERE responsible_id = $1
            RETURNING responsible_id, responsible_name, is_active, created_at
            "#,
        )
        .bind(id)
        .bind(name.map(str::trim))
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| name_conflict(e, name.unwrap_or_default()))
    }
}

fn name_conflict(e: sqlx::Error, name: &str) -> AppError {
    let err = AppError::from(e);
    if err.is_unique_violation() {
        AppError::Conflict(format!(
            "A responsible named '{}' already exists",
            name.trim()
        ))
    } else {
        err
    }
}

/// Resolve a responsible reference inside an open transaction.
///
/// A responsible created from a name starts active; an existing one keeps
/// its current state.
pub(crate) async fn resolve_responsible(
    conn: &mut PgConnection,
    reference: &EntityRef,
) -> Result<i32, AppError> {
    match reference {
        EntityRef::Existing { id } => sqlx::query_scalar::<Postgres, i32>(
            "SELECT responsible_id FROM responsibles WHERE responsible_id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Responsible {} not found", id))),
        EntityRef::ByName { name } => {
            let id = sqlx::query_scalar::<Postgres, i32>(
                r#"
                INSERT INTO responsibles (responsible_name, is_active)
                VALUES ($1, TRUE)
                ON CONFLICT ((lower(btrim(responsible_name))))
                DO UPDATE SET responsible_name = responsibles.responsible_name
                RETURNING responsible_id
                "#,
            )
            .bind(name.trim())
            .fetch_one(&mut *conn)
            .await?;
            Ok(id)
        }
    }
}
