//! Ingestion payload and its validation

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::FieldLimits;
use crate::store::FlagShards;

/// Rejection of an ingestion payload
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("field '{field}' must be at least {min} characters (got {actual})")]
    TooShort {
        field: &'static str,
        min: usize,
        actual: usize,
    },

    #[error("field '{field}' must be at most {max} characters (got {actual})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

/// Body of `POST /set-config`
#[derive(Debug, Clone, Deserialize)]
pub struct IngestRequest {
    #[serde(alias = "zip_flag")]
    pub zip: String,

    #[serde(alias = "web_flag")]
    pub web: String,

    #[serde(alias = "curl_flag")]
    pub curl: String,
}

/// Body returned by `POST /set-config`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestResponse {
    pub zip_password: String,
}

impl IngestRequest {
    /// Trim every field and check it against `limits`
    pub fn validate(self, limits: &FieldLimits) -> Result<FlagShards, ValidationError> {
        let zip = self.zip.trim().to_string();
        let web = self.web.trim().to_string();
        let curl = self.curl.trim().to_string();

        check("zip", &zip, limits.zip_min, limits.zip_max)?;
        check("web", &web, 0, limits.web_max)?;
        check("curl", &curl, 0, limits.curl_max)?;

        Ok(FlagShards { zip, web, curl })
    }
}

fn check(field: &'static str, value: &str, min: usize, max: usize) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual < min {
        return Err(ValidationError::TooShort { field, min, actual });
    }
    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(zip: &str, web: &str, curl: &str) -> IngestRequest {
        IngestRequest {
            zip: zip.to_string(),
            web: web.to_string(),
            curl: curl.to_string(),
        }
    }

    #[test]
    fn test_fields_are_trimmed() {
        let shards = request("  ab \n", "\tcd", "ef  ")
            .validate(&FieldLimits::default())
            .unwrap();
        assert_eq!(shards.zip, "ab");
        assert_eq!(shards.web, "cd");
        assert_eq!(shards.curl, "ef");
    }

    #[test]
    fn test_empty_zip_rejected() {
        let err = request("   ", "w", "c")
            .validate(&FieldLimits::default())
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooShort {
                field: "zip",
                min: 1,
                actual: 0
            }
        );
    }

    #[test]
    fn test_empty_web_and_curl_allowed() {
        assert!(request("z", "", "").validate(&FieldLimits::default()).is_ok());
    }

    #[test]
    fn test_oversized_field_rejected() {
        let limits = FieldLimits {
            web_max: 4,
            ..FieldLimits::default()
        };
        let err = request("z", "12345", "c").validate(&limits).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { field: "web", .. }));
    }

    #[test]
    fn test_limits_count_characters_not_bytes() {
        let limits = FieldLimits {
            curl_max: 3,
            ..FieldLimits::default()
        };
        assert!(request("z", "", "жжж").validate(&limits).is_ok());
    }

    #[test]
    fn test_deserialize_with_aliases() {
        let req: IngestRequest = serde_json::from_str(
            r#"{"zip_flag": "a", "web_flag": "b", "curl_flag": "c"}"#,
        )
        .unwrap();
        assert_eq!(req.zip, "a");
        assert_eq!(req.curl, "c");
    }

    #[test]
    fn test_missing_field_fails_to_deserialize() {
        let result: Result<IngestRequest, _> = serde_json::from_str(r#"{"zip": "a", "web": "b"}"#);
        assert!(result.is_err());
    }
}
