//! Bounded generate-validate loop.
//!
//! At most [`MAX_ATTEMPTS`] completions are requested. A rejected answer is
//! appended to the conversation together with a corrective instruction that
//! names the [`RejectionReason`], and the whole conversation is resent.
//! Gateway errors end the loop immediately.

use dealplan_ai::{strip_code_fences, ChatGateway, ChatMessage};
use dealplan_core::models::{DspDocument, DspFormat};
use dealplan_core::AppError;
use std::fmt::{Display, Formatter, Result as FmtResult};

use super::prompt;

pub const MAX_ATTEMPTS: u32 = 2;

/// Why a completion was not accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    EmptyResponse,
    MissingHeading,
    InvalidJson(String),
    SchemaViolation(String),
}

impl Display for RejectionReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            RejectionReason::EmptyResponse => write!(f, "EmptyResponse"),
            RejectionReason::MissingHeading => write!(f, "MissingHeading"),
            RejectionReason::InvalidJson(msg) => write!(f, "InvalidJson({})", msg),
            RejectionReason::SchemaViolation(msg) => write!(f, "SchemaViolation({})", msg),
        }
    }
}

/// An accepted completion
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedContent {
    Markdown(String),
    Structured(Box<DspDocument>),
}

/// Markdown must be non-empty and contain at least one heading line
pub fn validate_markdown(content: &str) -> Result<String, RejectionReason> {
    let content = content.trim();
    if content.is_empty() {
        return Err(RejectionReason::EmptyResponse);
    }
    if !content
        .lines()
        .any(|line| line.trim_start().starts_with('#'))
    {
        return Err(RejectionReason::MissingHeading);
    }
    Ok(content.to_string())
}

/// Structured output must be JSON that deserializes into the full DSP schema
pub fn validate_structured(content: &str) -> Result<DspDocument, RejectionReason> {
    if content.trim().is_empty() {
        return Err(RejectionReason::EmptyResponse);
    }
    let value: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| RejectionReason::InvalidJson(e.to_string()))?;
    serde_json::from_value(value).map_err(|e| RejectionReason::SchemaViolation(e.to_string()))
}

/// Strip code fences, then validate according to the output format
pub fn validate(format: DspFormat, raw: &str) -> Result<GeneratedContent, RejectionReason> {
    let content = strip_code_fences(raw);
    match format {
        DspFormat::Markdown => validate_markdown(&content).map(GeneratedContent::Markdown),
        DspFormat::Html => {
            validate_structured(&content).map(|doc| GeneratedContent::Structured(Box::new(doc)))
        }
    }
}

/// Result of feeding one completion into [`GenerationAttempts`]
#[derive(Debug)]
pub enum AttemptOutcome {
    Accepted(GeneratedContent),
    Retry(RejectionReason),
    Exhausted(RejectionReason),
}

/// Attempt counter plus the conversation sent on the next attempt
#[derive(Debug)]
pub struct GenerationAttempts {
    format: DspFormat,
    attempt: u32,
    messages: Vec<ChatMessage>,
}

impl GenerationAttempts {
    pub fn new(format: DspFormat, messages: Vec<ChatMessage>) -> Self {
        Self {
            format,
            attempt: 0,
            messages,
        }
    }

    /// Completions received so far
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Validate a completion and advance the state machine
    pub fn record(&mut self, raw: String) -> AttemptOutcome {
        self.attempt += 1;
        match validate(self.format, &raw) {
            Ok(content) => AttemptOutcome::Accepted(content),
            Err(reason) if self.attempt >= MAX_ATTEMPTS => AttemptOutcome::Exhausted(reason),
            Err(reason) => {
                self.messages.push(ChatMessage::assistant(raw));
                self.messages
                    .push(ChatMessage::user(prompt::corrective_prompt(self.format, &reason)));
                AttemptOutcome::Retry(reason)
            }
        }
    }
}

/// Drive the loop against a gateway. Returns the content and the number of calls made.
pub async fn run_generation(
    gateway: &dyn ChatGateway,
    format: DspFormat,
    messages: Vec<ChatMessage>,
) -> Result<(GeneratedContent, u32), AppError> {
    let mut attempts = GenerationAttempts::new(format, messages);

    loop {
        let raw = gateway.complete(attempts.messages()).await?;

        match attempts.record(raw) {
            AttemptOutcome::Accepted(content) => return Ok((content, attempts.attempt())),
            AttemptOutcome::Retry(reason) => {
                tracing::warn!(
                    attempt = attempts.attempt(),
                    reason = %reason,
                    format = %format,
                    "Generated content rejected, retrying with corrective prompt"
                );
            }
            AttemptOutcome::Exhausted(reason) => {
                tracing::error!(
                    attempts = attempts.attempt(),
                    reason = %reason,
                    format = %format,
                    "Generated content rejected, giving up"
                );
                return Err(AppError::GenerationFailed {
                    attempts: attempts.attempt(),
                    reason: reason.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::test_support::{sample_document_json, ScriptedGateway};
    use dealplan_ai::{ChatRole, GatewayError};

    #[test]
    fn test_markdown_requires_heading() {
        assert_eq!(validate_markdown("   "), Err(RejectionReason::EmptyResponse));
        assert_eq!(
            validate_markdown("just a paragraph"),
            Err(RejectionReason::MissingHeading)
        );
        assert_eq!(
            validate_markdown("intro\n## Objetivo\ntexto").unwrap(),
            "intro\n## Objetivo\ntexto"
        );
    }

    #[test]
    fn test_structured_distinguishes_json_and_schema_errors() {
        assert!(matches!(
            validate_structured("{not json"),
            Err(RejectionReason::InvalidJson(_))
        ));
        assert!(matches!(
            validate_structured(r#"{"deal_strategy_plan": {}}"#),
            Err(RejectionReason::SchemaViolation(_))
        ));
        assert!(validate_structured(&sample_document_json()).is_ok());
    }

    #[test]
    fn test_wrong_leaf_type_is_schema_violation() {
        let mut value: serde_json::Value = serde_json::from_str(&sample_document_json()).unwrap();
        value["deal_strategy_plan"]["preliminary_solution_approach"]["assumptions"] =
            serde_json::json!("not a list");
        assert!(matches!(
            validate_structured(&value.to_string()),
            Err(RejectionReason::SchemaViolation(_))
        ));
    }

    #[test]
    fn test_validate_strips_fences() {
        let fenced = format!("```json\n{}\n```", sample_document_json());
        assert!(matches!(
            validate(DspFormat::Html, &fenced),
            Ok(GeneratedContent::Structured(_))
        ));
        assert!(matches!(
            validate(DspFormat::Markdown, "```\n# Plan\n```"),
            Ok(GeneratedContent::Markdown(_))
        ));
    }

    #[test]
    fn test_state_machine_appends_corrective_turns() {
        let mut attempts = GenerationAttempts::new(
            DspFormat::Markdown,
            vec![ChatMessage::system("sys"), ChatMessage::user("corpus")],
        );

        match attempts.record("no heading here".to_string()) {
            AttemptOutcome::Retry(RejectionReason::MissingHeading) => {}
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(attempts.attempt(), 1);
        assert_eq!(attempts.messages().len(), 4);
        assert_eq!(attempts.messages()[2].role, ChatRole::Assistant);
        assert!(attempts.messages()[3].content.contains("MissingHeading"));

        match attempts.record(String::new()) {
            AttemptOutcome::Exhausted(RejectionReason::EmptyResponse) => {}
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(attempts.attempt(), MAX_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_invalid_then_valid_takes_two_calls() {
        let gateway = ScriptedGateway::new(vec![
            Ok("not json".to_string()),
            Ok(sample_document_json()),
        ]);

        let (content, calls) = run_generation(&gateway, DspFormat::Html, vec![])
            .await
            .unwrap();
        assert!(matches!(content, GeneratedContent::Structured(_)));
        assert_eq!(calls, 2);
        assert_eq!(gateway.calls(), 2);
    }

    #[tokio::test]
    async fn test_invalid_twice_fails() {
        let gateway = ScriptedGateway::new(vec![
            Ok("nope".to_string()),
            Ok("still nope".to_string()),
        ]);

        let err = run_generation(&gateway, DspFormat::Markdown, vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::GenerationFailed { attempts: 2, .. }));
        assert_eq!(gateway.calls(), 2);
    }

    #[tokio::test]
    async fn test_gateway_errors_are_not_retried() {
        let gateway = ScriptedGateway::new(vec![
            Err(GatewayError::RateLimited("slow down".into())),
            Ok("# never reached".to_string()),
        ]);

        let err = run_generation(&gateway, DspFormat::Markdown, vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Upstream { .. }));
        assert_eq!(gateway.calls(), 1);
    }
}
