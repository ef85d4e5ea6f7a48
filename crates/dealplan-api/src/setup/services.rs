//! Builds the application state from configuration and connected resources

use crate::services::{DspGenerator, GenerationSettings, WebhookClient};
use crate::state::{AppState, DbState, FileState};
use anyhow::{Context, Result};
use dealplan_ai::{AiGatewayClient, AiGatewayConfig, PdfTextExtractor};
use dealplan_core::Config;
use dealplan_db::PgGenerationStore;
use dealplan_storage::{Storage, UrlSigner};
use sqlx::PgPool;
use std::sync::Arc;

/// Wire repositories, the DSP generator and the webhook client together
pub fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn Storage>,
) -> Result<Arc<AppState>> {
    let gateway_config =
        AiGatewayConfig::from_config(config).context("Invalid AI gateway configuration")?;
    tracing::info!(
        model = %gateway_config.model,
        timeout_secs = gateway_config.timeout.as_secs(),
        "AI gateway client configured"
    );
    let gateway = AiGatewayClient::new(gateway_config)?;

    let dsp = DspGenerator::new(
        Arc::new(PgGenerationStore::new(pool.clone())),
        storage.clone(),
        Arc::new(gateway),
        Arc::new(PdfTextExtractor::new()),
        GenerationSettings {
            min_corpus_chars: config.min_corpus_chars(),
            default_format: config.dsp_default_format(),
        },
    );

    let webhooks = WebhookClient::from_config(config)?;
    if config.upload_webhook_url().is_none() || config.artifact_webhook_url().is_none() {
        tracing::warn!("Webhook URLs not fully configured; proxy endpoints will return 500");
    }

    let state = AppState {
        db: DbState::new(pool),
        files: FileState {
            storage,
            url_signer: UrlSigner::new(config.storage_signing_secret()),
            max_input_size_bytes: config.max_input_size_bytes(),
        },
        dsp,
        webhooks,
        config: config.clone(),
    };

    Ok(Arc::new(state))
}
