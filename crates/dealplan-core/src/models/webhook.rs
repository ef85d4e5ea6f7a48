use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

const GDRIVE_URL_PREFIX: &str = "https://drive.google.com/";
const FORBIDDEN_FILE_NAME_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*', '\\'];

/// Where the document-automation webhooks stored a file in Drive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GdriveFile {
    pub gdrive_file_name: String,
    pub gdrive_web_url: String,
}

fn drive_file_name(name: &str) -> Result<(), ValidationError> {
    if name.contains(FORBIDDEN_FILE_NAME_CHARS) {
        let mut err = ValidationError::new("invalid_characters");
        err.message = Some("Invalid characters in file name".into());
        return Err(err);
    }
    Ok(())
}

fn drive_url(url: &str) -> Result<(), ValidationError> {
    if !url.starts_with(GDRIVE_URL_PREFIX) {
        let mut err = ValidationError::new("not_google_drive");
        err.message = Some("Must be a Google Drive URL".into());
        return Err(err);
    }
    Ok(())
}

fn http_url(url: &str) -> Result<(), ValidationError> {
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        let mut err = ValidationError::new("not_http");
        err.message = Some("Must be an http(s) URL".into());
        return Err(err);
    }
    Ok(())
}

/// Upload webhook reply, checked strictly
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UploadWebhookReply {
    #[validate(
        length(min = 1, max = 255, message = "File name must be between 1 and 255 characters"),
        custom(function = "drive_file_name")
    )]
    pub gdrive_file_name: String,
    #[validate(
        length(max = 500, message = "URL too long"),
        custom(function = "drive_url")
    )]
    pub gdrive_web_url: String,
}

/// Artifact webhook reply: any named file behind an http(s) link
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ArtifactWebhookReply {
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub gdrive_file_name: String,
    #[validate(custom(function = "http_url"))]
    pub gdrive_web_url: String,
}

impl From<UploadWebhookReply> for GdriveFile {
    fn from(reply: UploadWebhookReply) -> Self {
        Self {
            gdrive_file_name: reply.gdrive_file_name,
            gdrive_web_url: reply.gdrive_web_url,
        }
    }
}

impl From<ArtifactWebhookReply> for GdriveFile {
    fn from(reply: ArtifactWebhookReply) -> Self {
        Self {
            gdrive_file_name: reply.gdrive_file_name,
            gdrive_web_url: reply.gdrive_web_url,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadProxyResponse {
    pub success: bool,
    pub gdrive_file_name: String,
    pub gdrive_web_url: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct GenerateArtifactRequest {
    #[validate(range(min = 1, message = "opportunity_id must be positive"))]
    pub opportunity_id: i32,
    #[validate(range(min = 1, message = "artifact_id must be positive"))]
    pub artifact_id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateArtifactResponse {
    pub success: bool,
    pub artifact_id: i32,
    pub gdrive_file_name: String,
    pub gdrive_web_url: String,
}
