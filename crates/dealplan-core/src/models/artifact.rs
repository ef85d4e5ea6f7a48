use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use validator::Validate;

pub const DSP_ARTIFACT_TYPE: &str = "DSP";
pub const DSP_ARTIFACT_NAME: &str = "Deal Strategy Plan";
pub const ARTIFACT_STATUS_GENERATED: &str = "generated";

/// A generated output document. Created only by the generation flow.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Artifact {
    pub artifact_id: i32,
    pub opportunity_id: i32,
    pub artifact_name: String,
    pub artifact_type: String,
    pub artifact_url: String,
    pub generated_at: DateTime<Utc>,
    pub generated_by: Option<String>,
    pub status: String,
    pub version: i32,
    pub gdrive_file_name: Option<String>,
    pub gdrive_web_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewArtifact {
    pub opportunity_id: i32,
    pub artifact_name: String,
    pub artifact_type: String,
    pub artifact_url: String,
    pub generated_by: String,
    pub status: String,
    pub version: i32,
}

/// Output format of a generated DSP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DspFormat {
    /// Free-form consultant Markdown, wrapped in the Markdown template
    Markdown,
    /// Schema-validated JSON rendered through the HTML template
    Html,
}

impl DspFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            DspFormat::Markdown => "md",
            DspFormat::Html => "html",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            DspFormat::Markdown => "text/markdown; charset=utf-8",
            DspFormat::Html => "text/html; charset=utf-8",
        }
    }
}

impl Display for DspFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DspFormat::Markdown => write!(f, "markdown"),
            DspFormat::Html => write!(f, "html"),
        }
    }
}

impl FromStr for DspFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "markdown" | "md" => Ok(DspFormat::Markdown),
            "html" => Ok(DspFormat::Html),
            _ => Err(anyhow::anyhow!("Invalid DSP format: {}", s)),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct GenerateDspRequest {
    #[validate(range(min = 1, message = "opportunity_id must be a positive integer"))]
    pub opportunity_id: i32,
    #[serde(default)]
    pub format: Option<DspFormat>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateDspResponse {
    pub success: bool,
    pub artifact_id: i32,
    pub artifact_url: String,
    pub version: i32,
    pub storage_path: String,
    pub format: DspFormat,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dsp_format_file_properties() {
        assert_eq!(DspFormat::Markdown.extension(), "md");
        assert_eq!(DspFormat::Html.extension(), "html");
        assert!(DspFormat::Html.content_type().starts_with("text/html"));
        assert_eq!("MD".parse::<DspFormat>().unwrap(), DspFormat::Markdown);
        assert!("pdf".parse::<DspFormat>().is_err());
    }

    #[test]
    fn test_generate_request_validation() {
        let req: GenerateDspRequest = serde_json::from_str(r#"{"opportunity_id": 0}"#).unwrap();
        assert!(req.validate().is_err());

        let req: GenerateDspRequest =
            serde_json::from_str(r#"{"opportunity_id": 7, "format": "html"}"#).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.format, Some(DspFormat::Html));

        assert!(serde_json::from_str::<GenerateDspRequest>(r#"{"opportunity_id": "7"}"#).is_err());
    }
}
