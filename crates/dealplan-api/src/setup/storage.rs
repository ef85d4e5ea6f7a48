//! Storage setup and initialization

use anyhow::{Context, Result};
use dealplan_core::Config;
use dealplan_storage::{create_storage, Storage, ARTIFACTS_BUCKET, INPUTS_BUCKET};
use std::sync::Arc;

/// Build the configured backend and make sure both buckets exist
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing storage...");
    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage backend")?;

    for bucket in [INPUTS_BUCKET, ARTIFACTS_BUCKET] {
        storage
            .ensure_bucket(bucket)
            .await
            .with_context(|| format!("Failed to prepare bucket {}", bucket))?;
    }

    tracing::info!(
        backend = %storage.backend_type(),
        "Storage initialized successfully"
    );
    Ok(storage)
}
