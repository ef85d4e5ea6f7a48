//! Client for an OpenAI-compatible `chat/completions` gateway

use async_trait::async_trait;
use dealplan_core::{AppError, UpstreamKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest slice of an upstream error body kept in messages and logs
const MAX_ERROR_BODY_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Failures talking to the gateway. None of these are retried by callers.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Payment required: {0}")]
    PaymentRequired(String),

    #[error("Gateway returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Gateway request timed out")]
    Timeout,

    #[error("Gateway unreachable: {0}")]
    Transport(String),

    #[error("Malformed gateway response: {0}")]
    MalformedResponse(String),
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        let message = err.to_string();
        match err {
            GatewayError::RateLimited(_) => AppError::Upstream {
                kind: UpstreamKind::RateLimited,
                message,
            },
            GatewayError::PaymentRequired(_) => AppError::Upstream {
                kind: UpstreamKind::PaymentRequired,
                message,
            },
            GatewayError::Timeout => AppError::GatewayTimeout(message),
            GatewayError::Status { .. }
            | GatewayError::Transport(_)
            | GatewayError::MalformedResponse(_) => AppError::Upstream {
                kind: UpstreamKind::Gateway,
                message,
            },
        }
    }
}

/// A chat completion backend
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Send the conversation and return the content of the first choice
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, GatewayError>;
}

/// Remove a leading ```` ```json ```` / ```` ``` ```` fence and a trailing ```` ``` ````
pub fn strip_code_fences(content: &str) -> String {
    let mut text = content.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    text = text.trim_end();
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim().to_string()
}

fn truncate(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(feature = "gateway-http")]
pub use http_client::{AiGatewayClient, AiGatewayConfig};

#[cfg(feature = "gateway-http")]
mod http_client {
    use super::*;
    use anyhow::{Context, Result};
    use std::fmt::{Debug, Formatter, Result as FmtResult};
    use std::time::Duration;

    /// Settings of [`AiGatewayClient`]
    #[derive(Clone)]
    pub struct AiGatewayConfig {
        pub url: String,
        pub api_key: String,
        pub model: String,
        pub temperature: f32,
        pub timeout: Duration,
    }

    impl Debug for AiGatewayConfig {
        fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
            f.debug_struct("AiGatewayConfig")
                .field("url", &self.url)
                .field("model", &self.model)
                .field("temperature", &self.temperature)
                .field("timeout", &self.timeout)
                .finish_non_exhaustive()
        }
    }

    impl AiGatewayConfig {
        pub fn from_config(config: &dealplan_core::Config) -> Result<Self> {
            let api_key = config
                .ai_gateway_api_key()
                .context("AI_GATEWAY_API_KEY is not configured")?;
            Ok(Self {
                url: config.ai_gateway_url().to_string(),
                api_key: api_key.to_string(),
                model: config.ai_model().to_string(),
                temperature: config.ai_temperature(),
                timeout: Duration::from_secs(config.ai_gateway_timeout_seconds()),
            })
        }
    }

    #[derive(Debug, Serialize)]
    struct ChatCompletionRequest<'a> {
        model: &'a str,
        messages: &'a [ChatMessage],
        temperature: f32,
    }

    #[derive(Debug, Deserialize)]
    struct ChatCompletionResponse {
        #[serde(default)]
        choices: Vec<Choice>,
    }

    #[derive(Debug, Deserialize)]
    struct Choice {
        message: ChoiceMessage,
    }

    #[derive(Debug, Deserialize)]
    struct ChoiceMessage {
        #[serde(default)]
        content: Option<String>,
    }

    /// HTTP implementation of [`ChatGateway`]
    pub struct AiGatewayClient {
        http_client: reqwest::Client,
        config: AiGatewayConfig,
    }

    impl Debug for AiGatewayClient {
        fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
            f.debug_struct("AiGatewayClient")
                .field("config", &self.config)
                .finish()
        }
    }

    impl AiGatewayClient {
        pub fn new(config: AiGatewayConfig) -> Result<Self> {
            let http_client = reqwest::Client::builder()
                .timeout(config.timeout)
                .build()
                .context("Failed to create HTTP client for AI gateway")?;

            Ok(Self {
                http_client,
                config,
            })
        }

        pub fn model(&self) -> &str {
            &self.config.model
        }
    }

    #[async_trait]
    impl ChatGateway for AiGatewayClient {
        #[tracing::instrument(skip(self, messages), fields(model = %self.config.model, messages = messages.len()))]
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String, GatewayError> {
            let body = ChatCompletionRequest {
                model: &self.config.model,
                messages,
                temperature: self.config.temperature,
            };

            let start = std::time::Instant::now();
            let response = self
                .http_client
                .post(&self.config.url)
                .bearer_auth(&self.config.api_key)
                .json(&body)
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        GatewayError::Timeout
                    } else {
                        GatewayError::Transport(e.to_string())
                    }
                })?;

            let status = response.status();
            if !status.is_success() {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                let error_text = truncate(&error_text, MAX_ERROR_BODY_CHARS);
                tracing::warn!(
                    status = status.as_u16(),
                    body = %error_text,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "AI gateway request failed"
                );
                return Err(match status.as_u16() {
                    429 => GatewayError::RateLimited(error_text),
                    402 => GatewayError::PaymentRequired(error_text),
                    code => GatewayError::Status {
                        status: code,
                        body: error_text,
                    },
                });
            }

            let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout
                } else {
                    GatewayError::MalformedResponse(e.to_string())
                }
            })?;

            let content = parsed
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| GatewayError::MalformedResponse("no choices returned".to_string()))?
                .message
                .content
                .unwrap_or_default();

            tracing::info!(
                content_chars = content.chars().count(),
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "AI gateway completion received"
            );

            Ok(content)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn client_for(url: String) -> AiGatewayClient {
            AiGatewayClient::new(AiGatewayConfig {
                url,
                api_key: "test-key".to_string(),
                model: "google/gemini-2.5-flash".to_string(),
                temperature: 0.3,
                timeout: Duration::from_secs(5),
            })
            .unwrap()
        }

        fn conversation() -> Vec<ChatMessage> {
            vec![
                ChatMessage::system("You are a sales strategist."),
                ChatMessage::user("Summarize the inputs."),
            ]
        }

        #[tokio::test]
        async fn test_complete_returns_first_choice() {
            let mut server = mockito::Server::new_async().await;
            let mock = server
                .mock("POST", "/v1/chat/completions")
                .match_header("authorization", "Bearer test-key")
                .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                    "model": "google/gemini-2.5-flash",
                    "messages": [
                        {"role": "system", "content": "You are a sales strategist."},
                        {"role": "user", "content": "Summarize the inputs."}
                    ]
                })))
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(
                    r##"{"choices":[{"message":{"role":"assistant","content":"# Plan\nBody"}}]}"##,
                )
                .create_async()
                .await;

            let client = client_for(format!("{}/v1/chat/completions", server.url()));
            let content = client.complete(&conversation()).await.unwrap();

            assert_eq!(content, "# Plan\nBody");
            mock.assert_async().await;
        }

        #[tokio::test]
        async fn test_status_codes_map_to_errors() {
            let mut server = mockito::Server::new_async().await;
            let url = format!("{}/v1/chat/completions", server.url());

            let rate_limited = server
                .mock("POST", "/v1/chat/completions")
                .with_status(429)
                .with_body("slow down")
                .create_async()
                .await;
            let err = client_for(url.clone())
                .complete(&conversation())
                .await
                .unwrap_err();
            assert!(matches!(err, GatewayError::RateLimited(_)));
            assert_eq!(
                dealplan_core::ErrorMetadata::http_status_code(&AppError::from(err)),
                429
            );
            rate_limited.remove_async().await;

            let payment = server
                .mock("POST", "/v1/chat/completions")
                .with_status(402)
                .create_async()
                .await;
            let err = client_for(url.clone())
                .complete(&conversation())
                .await
                .unwrap_err();
            assert!(matches!(err, GatewayError::PaymentRequired(_)));
            payment.remove_async().await;

            server
                .mock("POST", "/v1/chat/completions")
                .with_status(503)
                .with_body("upstream down")
                .create_async()
                .await;
            let err = client_for(url).complete(&conversation()).await.unwrap_err();
            assert!(matches!(err, GatewayError::Status { status: 503, .. }));
            assert_eq!(
                dealplan_core::ErrorMetadata::http_status_code(&AppError::from(err)),
                502
            );
        }

        #[tokio::test]
        async fn test_missing_choices_is_malformed() {
            let mut server = mockito::Server::new_async().await;
            server
                .mock("POST", "/v1/chat/completions")
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(r#"{"choices":[]}"#)
                .create_async()
                .await;

            let err = client_for(format!("{}/v1/chat/completions", server.url()))
                .complete(&conversation())
                .await
                .unwrap_err();
            assert!(matches!(err, GatewayError::MalformedResponse(_)));
        }

        #[tokio::test]
        async fn test_null_content_is_empty_string() {
            let mut server = mockito::Server::new_async().await;
            server
                .mock("POST", "/v1/chat/completions")
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(r#"{"choices":[{"message":{"content":null}}]}"#)
                .create_async()
                .await;

            let content = client_for(format!("{}/v1/chat/completions", server.url()))
                .complete(&conversation())
                .await
                .unwrap();
            assert!(content.is_empty());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dealplan_core::ErrorMetadata;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n# Title\n```\n"), "# Title");
        assert_eq!(strip_code_fences("  # Title\nText  "), "# Title\nText");
        assert_eq!(strip_code_fences("{\"a\":1}```"), "{\"a\":1}");
    }

    #[test]
    fn test_timeout_maps_to_gateway_timeout() {
        let err = AppError::from(GatewayError::Timeout);
        assert!(matches!(err, AppError::GatewayTimeout(_)));
        assert_eq!(err.http_status_code(), 504);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("ñandú", 2), "ña...");
    }
}
