//! Bucket names and object key layout shared by every backend.
//!
//! - Inputs: `inputs-files/{opportunity_id}/inputs/{sanitized_file_name}`
//! - DSP artifacts: `artifacts-files/opportunities/{opportunity_id}/dsp-v{version}.{ext}`

use crate::{StorageError, StorageResult};

pub const INPUTS_BUCKET: &str = "inputs-files";
pub const ARTIFACTS_BUCKET: &str = "artifacts-files";

/// Key of an uploaded input inside [`INPUTS_BUCKET`]
pub fn input_key(opportunity_id: i32, sanitized_file_name: &str) -> String {
    format!("{}/inputs/{}", opportunity_id, sanitized_file_name)
}

/// Key of a versioned DSP document inside [`ARTIFACTS_BUCKET`]
pub fn dsp_artifact_key(opportunity_id: i32, version: i32, extension: &str) -> String {
    format!(
        "opportunities/{}/dsp-v{}.{}",
        opportunity_id, version, extension
    )
}

/// Bucket names are a single lowercase segment: `[a-z0-9-]+`
pub fn validate_bucket(bucket: &str) -> StorageResult<()> {
    let valid = !bucket.is_empty()
        && bucket
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(format!(
            "Invalid bucket name: {}",
            bucket
        )))
    }
}

/// Keys must be relative, without `..` segments, empty segments or backslashes
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|segment| segment.is_empty() || segment == "..")
    {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(input_key(12, "brief.pdf"), "12/inputs/brief.pdf");
        assert_eq!(
            dsp_artifact_key(12, 3, "md"),
            "opportunities/12/dsp-v3.md"
        );
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("12/inputs/brief.pdf").is_ok());
        assert!(validate_key("12/inputs/..hidden.pdf").is_ok());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key("/abs").is_err());
        assert!(validate_key("a//b").is_err());
        assert!(validate_key("a\\b").is_err());
        assert!(validate_key("").is_err());
    }

    #[test]
    fn test_validate_bucket() {
        assert!(validate_bucket(INPUTS_BUCKET).is_ok());
        assert!(validate_bucket(ARTIFACTS_BUCKET).is_ok());
        assert!(validate_bucket("../x").is_err());
        assert!(validate_bucket("Upper").is_err());
    }
}
