//! End-to-end DSP generation for one opportunity

use bytes::Bytes;
use chrono::Utc;
use dealplan_ai::{ChatGateway, TextExtractor};
use dealplan_core::models::{
    Artifact, DspFormat, NewArtifact, ARTIFACT_STATUS_GENERATED, DSP_ARTIFACT_NAME,
    DSP_ARTIFACT_TYPE,
};
use dealplan_core::AppError;
use dealplan_db::GenerationStore;
use dealplan_storage::keys::dsp_artifact_key;
use dealplan_storage::{Storage, StorageError, ARTIFACTS_BUCKET};
use std::sync::Arc;
use std::time::Duration;

use super::attempts::{run_generation, GeneratedContent};
use super::corpus::build_corpus;
use super::prompt;
use super::render::{render_html, render_markdown, RenderContext};
use crate::constants::ARTIFACT_URL_TTL_SECS;
use crate::error::storage_to_app_error;

/// Upper bound on version numbers tried when a key or row is already taken
pub const MAX_VERSION_ATTEMPTS: i32 = 5;

#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub min_corpus_chars: usize,
    pub default_format: DspFormat,
}

/// A stored and registered plan
#[derive(Debug, Clone)]
pub struct GeneratedDsp {
    pub artifact: Artifact,
    pub storage_path: String,
    pub format: DspFormat,
    pub attempts: u32,
}

#[derive(Clone)]
pub struct DspGenerator {
    store: Arc<dyn GenerationStore>,
    storage: Arc<dyn Storage>,
    gateway: Arc<dyn ChatGateway>,
    extractor: Arc<dyn TextExtractor>,
    settings: GenerationSettings,
}

impl DspGenerator {
    pub fn new(
        store: Arc<dyn GenerationStore>,
        storage: Arc<dyn Storage>,
        gateway: Arc<dyn ChatGateway>,
        extractor: Arc<dyn TextExtractor>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            store,
            storage,
            gateway,
            extractor,
            settings,
        }
    }

    /// Generate, store and register a new DSP version.
    ///
    /// Fails before calling the generation service when the opportunity has
    /// no inputs or too little extractable text.
    #[tracing::instrument(skip(self, generated_by), fields(format))]
    pub async fn generate(
        &self,
        opportunity_id: i32,
        format: Option<DspFormat>,
        generated_by: &str,
    ) -> Result<GeneratedDsp, AppError> {
        let format = format.unwrap_or(self.settings.default_format);
        tracing::Span::current().record("format", tracing::field::display(format));

        let opportunity = self
            .store
            .get_opportunity(opportunity_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Opportunity {} not found", opportunity_id))
            })?;

        let inputs = self.store.list_inputs(opportunity_id).await?;
        if inputs.is_empty() {
            return Err(AppError::NoInputs(format!(
                "Opportunity {} has no input documents",
                opportunity_id
            )));
        }

        let corpus = build_corpus(&inputs, self.storage.as_ref(), self.extractor.as_ref()).await;
        corpus.ensure_minimum(self.settings.min_corpus_chars)?;
        tracing::info!(
            inputs = inputs.len(),
            used_inputs = corpus.input_names.len(),
            corpus_chars = corpus.trimmed_len(),
            "Corpus assembled"
        );

        let messages = prompt::initial_messages(format, &opportunity, &corpus);
        let (content, attempts) =
            run_generation(self.gateway.as_ref(), format, messages).await?;

        let ctx = RenderContext {
            opportunity_id,
            opportunity_name: &opportunity.opportunity_name,
            generated_at: Utc::now(),
            source_inputs: &corpus.input_names,
        };
        let document = match content {
            GeneratedContent::Markdown(body) => render_markdown(&ctx, &body),
            GeneratedContent::Structured(doc) => render_html(&doc, &ctx),
        };

        let (artifact, storage_path) = self
            .persist(opportunity_id, format, Bytes::from(document), generated_by)
            .await?;

        tracing::info!(
            artifact_id = artifact.artifact_id,
            version = artifact.version,
            storage_path = %storage_path,
            attempts,
            "Deal Strategy Plan generated"
        );

        Ok(GeneratedDsp {
            artifact,
            storage_path,
            format,
            attempts,
        })
    }

    /// Upload and insert under the next free version. A taken key or a
    /// unique violation moves on to the following version.
    async fn persist(
        &self,
        opportunity_id: i32,
        format: DspFormat,
        document: Bytes,
        generated_by: &str,
    ) -> Result<(Artifact, String), AppError> {
        self.storage
            .ensure_bucket(ARTIFACTS_BUCKET)
            .await
            .map_err(storage_to_app_error)?;

        let existing = self
            .store
            .count_artifacts(opportunity_id, DSP_ARTIFACT_TYPE)
            .await?;
        let first_version = i32::try_from(existing + 1)
            .map_err(|_| AppError::Internal("artifact version overflow".to_string()))?;

        for version in first_version..first_version + MAX_VERSION_ATTEMPTS {
            let key = dsp_artifact_key(opportunity_id, version, format.extension());

            match self
                .storage
                .upload(ARTIFACTS_BUCKET, &key, format.content_type(), document.clone())
                .await
            {
                Ok(()) => {}
                Err(StorageError::AlreadyExists(_)) => {
                    tracing::warn!(version, key = %key, "DSP key already taken, trying next version");
                    continue;
                }
                Err(e) => return Err(AppError::Storage(e.to_string())),
            }

            let url = match self
                .storage
                .signed_url(
                    ARTIFACTS_BUCKET,
                    &key,
                    Duration::from_secs(ARTIFACT_URL_TTL_SECS),
                )
                .await
            {
                Ok(url) => url,
                Err(e) => {
                    self.discard(&key).await;
                    return Err(storage_to_app_error(e));
                }
            };

            let new_artifact = NewArtifact {
                opportunity_id,
                artifact_name: DSP_ARTIFACT_NAME.to_string(),
                artifact_type: DSP_ARTIFACT_TYPE.to_string(),
                artifact_url: url,
                generated_by: generated_by.to_string(),
                status: ARTIFACT_STATUS_GENERATED.to_string(),
                version,
            };

            match self.store.insert_artifact(new_artifact).await {
                Ok(artifact) => return Ok((artifact, key)),
                Err(e) if e.is_unique_violation() => {
                    tracing::warn!(version, "DSP version already registered, trying next version");
                    self.discard(&key).await;
                }
                Err(e) => {
                    self.discard(&key).await;
                    return Err(e);
                }
            }
        }

        Err(AppError::Conflict(format!(
            "No free DSP version for opportunity {} after {} attempts",
            opportunity_id, MAX_VERSION_ATTEMPTS
        )))
    }

    /// Best-effort removal of an uploaded object that will not be registered
    async fn discard(&self, key: &str) {
        if let Err(e) = self.storage.delete(ARTIFACTS_BUCKET, key).await {
            tracing::warn!(key = %key, error = %e, "Failed to remove orphaned DSP object");
        }
    }
}
