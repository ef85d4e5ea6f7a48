use dealplan_core::{
    models::{
        CreateOpportunityRequest, Opportunity, OpportunityChanges, OpportunityOverview,
        OpportunityOverviewRow, UpdateOpportunityRequest, DEFAULT_OPPORTUNITY_STATUS,
    },
    AppError,
};
use sqlx::{PgPool, Postgres};

use super::client::resolve_client;
use super::responsible::resolve_responsible;
use super::transaction::TransactionGuard;

const OVERVIEW_SELECT: &str = r#"
    SELECT o.opportunity_id, o.opportunity_name, o.description, o.status,
           o.generated_at, o.generated_by,
           c.client_id, c.client_name,
           r.responsible_id, r.responsible_name, r.is_active AS responsible_is_active,
           (SELECT COUNT(*) FROM inputs i WHERE i.opportunity_id = o.opportunity_id) AS input_count,
           (SELECT COUNT(*) FROM artifacts a WHERE a.opportunity_id = o.opportunity_id) AS artifact_count
    FROM opportunities o
    JOIN clients c ON c.client_id = o.client_id
    JOIN responsibles r ON r.responsible_id = o.responsible_id
"#;

/// `%term%` for ILIKE with the wildcard characters of `term` escaped
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Repository for opportunities and their client/responsible links
#[derive(Clone)]
pub struct OpportunityRepository {
    pool: PgPool,
}

impl OpportunityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List opportunities newest first, with embedded client/responsible and
    /// document counts. `search` matches name, client name or status.
    #[tracing::instrument(skip(self), fields(db.table = "opportunities", db.operation = "select"))]
    pub async fn list_opportunities(
        &self,
        search: Option<&str>,
    ) -> Result<Vec<OpportunityOverview>, AppError> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);

        let query = format!(
            r#"{}
            WHERE ($1::text IS NULL
                   OR o.opportunity_name ILIKE $1
                   OR c.client_name ILIKE $1
                   OR o.status ILIKE $1)
            ORDER BY o.generated_at DESC, o.opportunity_id DESC
            "#,
            OVERVIEW_SELECT
        );

        let rows = sqlx::query_as::<Postgres, OpportunityOverviewRow>(&query)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(OpportunityOverview::from).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "opportunities", db.operation = "select", db.record_id = id))]
    pub async fn get_overview(&self, id: i32) -> Result<Option<OpportunityOverview>, AppError> {
        let query = format!("{} WHERE o.opportunity_id = $1", OVERVIEW_SELECT);

        let row = sqlx::query_as::<Postgres, OpportunityOverviewRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(OpportunityOverview::from))
    }

    #[tracing::instrument(skip(self), fields(db.table = "opportunities", db.operation = "select", db.record_id = id))]
    pub async fn get_opportunity(&self, id: i32) -> Result<Option<Opportunity>, AppError> {
        let opportunity = sqlx::query_as::<Postgres, Opportunity>(
            r#"
            SELECT opportunity_id, opportunity_name, description, client_id, responsible_id,
                   status, generated_at, generated_by
            FROM opportunities
            WHERE opportunity_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(opportunity)
    }

    /// Create an opportunity, resolving (and creating if needed) its client and
    /// responsible in the same transaction.
    #[tracing::instrument(skip(self, request), fields(db.table = "opportunities", db.operation = "insert"))]
    pub async fn create_opportunity(
        &self,
        request: &CreateOpportunityRequest,
        generated_by: &str,
    ) -> Result<OpportunityOverview, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let client_id = resolve_client(&mut tx, &request.client).await?;
        let responsible_id = resolve_responsible(&mut tx, &request.responsible).await?;

        let status = request
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_OPPORTUNITY_STATUS);

        let id = sqlx::query_scalar::<Postgres, i32>(
            r#"
            INSERT INTO opportunities
                (opportunity_name, description, client_id, responsible_id, status, generated_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING opportunity_id
            "#,
        )
        .bind(request.opportunity_name.trim())
        .bind(normalize_description(request.description.as_deref()))
        .bind(client_id)
        .bind(responsible_id)
        .bind(status)
        .bind(generated_by)
        .fetch_one(&mut **tx)
        .await?;

        tx.commit().await?;

        tracing::info!(opportunity_id = id, client_id, responsible_id, "Opportunity created");

        self.get_overview(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Opportunity {} vanished after insert", id)))
    }

    /// Apply a partial update. Returns `None` when the opportunity does not exist.
    #[tracing::instrument(skip(self, request), fields(db.table = "opportunities", db.operation = "update", db.record_id = id))]
    pub async fn update_opportunity(
        &self,
        id: i32,
        request: &UpdateOpportunityRequest,
    ) -> Result<Option<OpportunityOverview>, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let current = sqlx::query_as::<Postgres, Opportunity>(
            r#"
            SELECT opportunity_id, opportunity_name, description, client_id, responsible_id,
                   status, generated_at, generated_by
            FROM opportunities
            WHERE opportunity_id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        let Some(current) = current else {
            tx.rollback().await?;
            return Ok(None);
        };

        let client_id = match &request.client {
            Some(reference) => resolve_client(&mut tx, reference).await?,
            None => current.client_id,
        };
        let responsible_id = match &request.responsible {
            Some(reference) => resolve_responsible(&mut tx, reference).await?,
            None => current.responsible_id,
        };

        let changes = OpportunityChanges {
            opportunity_name: request
                .opportunity_name
                .as_deref()
                .map(|name| name.trim().to_string())
                .unwrap_or(current.opportunity_name),
            description: match request.description.as_deref() {
                Some(description) => normalize_description(Some(description)),
                None => current.description,
            },
            client_id,
            responsible_id,
            status: request
                .status
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .unwrap_or(current.status),
        };

        sqlx::query(
            r#"
            UPDATE opportunities
            SET opportunity_name = $2, description = $3, client_id = $4,
                responsible_id = $5, status = $6
            WHERE opportunity_id = $1
            "#,
        )
        .bind(id)
        .bind(&changes.opportunity_name)
        .bind(&changes.description)
        .bind(changes.client_id)
        .bind(changes.responsible_id)
        .bind(&changes.status)
        .execute(&mut **tx)
        .await?;

        tx.commit().await?;

        self.get_overview(id).await
    }

    /// Delete an opportunity; inputs and artifacts rows cascade
    #[tracing::instrument(skip(self), fields(db.table = "opportunities", db.operation = "delete", db.record_id = id))]
    pub async fn delete_opportunity(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM opportunities WHERE opportunity_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Blank descriptions are stored as NULL
fn normalize_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("acme"), "%acme%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_normalize_description() {
        assert_eq!(normalize_description(None), None);
        assert_eq!(normalize_description(Some("  ")), None);
        assert_eq!(
            normalize_description(Some(" Renewal of the 2024 contract ")),
            Some("Renewal of the 2024 contract".to_string())
        );
    }
}
