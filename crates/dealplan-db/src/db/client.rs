use dealplan_core::{
    models::{Client, EntityRef},
    AppError,
};
use sqlx::{PgConnection, PgPool, Postgres};

/// Repository for managing clients
#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all clients ordered by name
    #[tracing::instrument(skip(self), fields(db.table = "clients", db.operation = "select"))]
    pub async fn list_clients(&self) -> Result<Vec<Client>, AppError> {
        let clients = sqlx::query_as::<Postgres, Client>(
            "SELECT client_id, client_name, created_at FROM clients ORDER BY client_name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }

    #[tracing::instrument(skip(self), fields(db.table = "clients", db.operation = "select", db.record_id = id))]
    pub async fn get_client(&self, id: i32) -> Result<Option<Client>, AppError> {
        let client = sqlx::query_as::<Postgres, Client>(
            "SELECT client_id, client_name, created_at FROM clients WHERE client_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(client)
    }

    /// Create a client. A name already taken (case-insensitive) is a conflict.
    #[tracing::instrument(skip(self), fields(db.table = "clients", db.operation = "insert"))]
    pub async fn create_client(&self, client_name: &str) -> Result<Client, AppError> {
        sqlx::query_as::<Postgres, Client>(
            r#"
            INSERT INTO clients (client_name)
            VALUES ($1)
            RETURNING client_id, client_name, created_at
            "#,
        )
        .bind(client_name.trim())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| name_conflict(e, client_name))
    }

    #[tracing::instrument(skip(self), fields(db.table = "clients", db.operation = "update", db.record_id = id))]
    pub async fn update_client(
        &self,
        id: i32,
        client_name: &str,
    ) -> Result<Option<Client>, AppError> {
        sqlx::query_as::<Postgres, Client>(
            r#"
            UPDATE clients SET client_name = $2
            WHERE client_id = $1
            RETURNING client_id, client_name, created_at
            "#,
        )
        .bind(id)
        .bind(client_name.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| name_conflict(e, client_name))
    }

    /// Hard delete. Fails with `Conflict` while opportunities still reference the client.
    #[tracing::instrument(skip(self), fields(db.table = "clients", db.operation = "delete", db.record_id = id))]
    pub async fn delete_client(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM clients WHERE client_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::from(e);
                if err.is_foreign_key_violation() {
                    AppError::Conflict(
                        "Client is still referenced by one or more opportunities".to_string(),
                    )
                } else {
                    err
                }
            })?;

        Ok(result.rows_affected() > 0)
    }
}

fn name_conflict(e: sqlx::Error, client_name: &str) -> AppError {
    let err = AppError::from(e);
    if err.is_unique_violation() {
        AppError::Conflict(format!(
            "A client named '{}' already exists",
            client_name.trim()
        ))
    } else {
        err
    }
}

/// Resolve a client reference to an id inside an open transaction.
///
/// `{id}` must exist. `{name}` reuses the row with the same case-insensitive
/// trimmed name or creates it; the unique index makes this race-free.
pub(crate) async fn resolve_client(
    conn: &mut PgConnection,
    reference: &EntityRef,
) -> Result<i32, AppError> {
    match reference {
        EntityRef::Existing { id } => {
            sqlx::query_scalar::<Postgres, i32>("SELECT client_id FROM clients WHERE client_id = $1")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Client {} not found", id)))
        }
        EntityRef::ByName { name } => {
            let id = sqlx::query_scalar::<Postgres, i32>(
                r#"
                INSERT INTO clients (client_name)
                VALUES ($1)
                ON CONFLICT ((lower(btrim(client_name))))
                DO UPDATE SET client_name = clients.client_name
                RETURNING client_id
                "#,
            )
            .bind(name.trim())
            .fetch_one(&mut *conn)
            .await?;
            Ok(id)
        }
    }
}
