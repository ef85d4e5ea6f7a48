//! Outbound calls to the document-automation webhooks.
//!
//! Both webhooks reply with the Drive location of the file they produced.
//! The client's timeout covers the whole exchange; an expired request is
//! dropped and reported as a gateway timeout.

use anyhow::{Context, Result};
use bytes::Bytes;
use dealplan_core::models::{ArtifactWebhookReply, GdriveFile, UploadWebhookReply};
use dealplan_core::{AppError, Config, UpstreamKind};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use std::time::Duration;
use validator::Validate;

/// Longest slice of a webhook error body relayed to the caller
const MAX_WEBHOOK_DETAIL_CHARS: usize = 200;

/// Fields forwarded to the upload webhook alongside the file
#[derive(Debug, Clone)]
pub struct UploadForward {
    pub file: Bytes,
    pub content_type: String,
    pub file_name: String,
    pub input_id: String,
    pub opportunity_id: String,
    pub uploaded_by: String,
}

/// Reply of the artifact webhook
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactReply {
    Valid(GdriveFile),
    /// Not JSON, or JSON that failed the reply checks
    Invalid(String),
}

#[derive(Clone)]
pub struct WebhookClient {
    http_client: Client,
    upload_url: Option<String>,
    artifact_url: Option<String>,
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

fn transport_error(webhook: &str, err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        tracing::warn!(webhook, "Webhook request timed out");
        AppError::GatewayTimeout(format!("{} webhook did not answer in time", webhook))
    } else {
        tracing::error!(webhook, error = %err, "Webhook request failed");
        AppError::Upstream {
            kind: UpstreamKind::Gateway,
            message: format!("{} webhook unreachable: {}", webhook, err),
        }
    }
}

/// Read the body of a reply, relaying non-2xx statuses
async fn read_reply(webhook: &str, response: Response) -> Result<String, AppError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(webhook, e))?;

    if !status.is_success() {
        tracing::warn!(webhook, status = status.as_u16(), "Webhook returned an error status");
        return Err(AppError::Upstream {
            kind: UpstreamKind::Webhook(status.as_u16()),
            message: truncate(&body, MAX_WEBHOOK_DETAIL_CHARS),
        });
    }
    Ok(body)
}

impl WebhookClient {
    pub fn new(
        upload_url: Option<String>,
        artifact_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .build()
            .context("Failed to create HTTP client for webhooks")?;

        Ok(Self {
            http_client,
            upload_url,
            artifact_url,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.upload_webhook_url().map(String::from),
            config.artifact_webhook_url().map(String::from),
            Duration::from_secs(config.webhook_timeout_seconds()),
        )
    }

    /// Forward an input file and return where the webhook stored it
    #[tracing::instrument(skip(self, upload), fields(file_name = %upload.file_name, size = upload.file.len()))]
    pub async fn forward_upload(&self, upload: UploadForward) -> Result<GdriveFile, AppError> {
        let url = self.upload_url.as_deref().ok_or_else(|| {
            AppError::Configuration("UPLOAD_WEBHOOK_URL is not configured".to_string())
        })?;

        let file_part = Part::bytes(upload.file.to_vec())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.content_type)
            .map_err(|e| AppError::InvalidInput(format!("Invalid content type: {}", e)))?;

        let form = Form::new()
            .part("file", file_part)
            .text("input_id", upload.input_id)
            .text("id_opp", upload.opportunity_id)
            .text("file_name", upload.file_name)
            .text("uploaded_by", upload.uploaded_by);

        let response = self
            .http_client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error("upload", e))?;

        let body = read_reply("upload", response).await?;

        let reply: UploadWebhookReply = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, "Upload webhook returned invalid JSON");
            AppError::Upstream {
                kind: UpstreamKind::Gateway,
                message: "Upload webhook returned invalid JSON".to_string(),
            }
        })?;

        reply.validate().map_err(|errors| {
            tracing::error!(errors = %errors, "Upload webhook reply failed validation");
            AppError::Upstream {
                kind: UpstreamKind::Gateway,
                message: format!("Invalid upload webhook reply: {}", errors),
            }
        })?;

        Ok(reply.into())
    }

    /// Ask the artifact webhook to publish an artifact
    #[tracing::instrument(skip(self))]
    pub async fn request_artifact(
        &self,
        opportunity_id: i32,
        artifact_id: i32,
    ) -> Result<ArtifactReply, AppError> {
        let url = self.artifact_url.as_deref().ok_or_else(|| {
            AppError::Configuration("ARTIFACT_WEBHOOK_URL is not configured".to_string())
        })?;

        let response = self
            .http_client
            .post(url)
            .json(&serde_json::json!({
                "opportunity_id": opportunity_id,
                "artifact_id": artifact_id,
            }))
            .send()
            .await
            .map_err(|e| transport_error("artifact", e))?;

        let body = read_reply("artifact", response).await?;

        let reply = match serde_json::from_str::<ArtifactWebhookReply>(&body) {
            Ok(reply) => reply,
            Err(e) => return Ok(ArtifactReply::Invalid(format!("invalid JSON: {}", e))),
        };

        Ok(match reply.validate() {
            Ok(()) => ArtifactReply::Valid(reply.into()),
            Err(errors) => ArtifactReply::Invalid(errors.to_string()),
        })
    }
}
