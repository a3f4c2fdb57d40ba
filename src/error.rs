// src/error.rs
//! Errors raised while talking to Notion or mapping pages onto models.
//!
//! Each variant says what went wrong and where: the Notion API
//! refused a request, a payload did not have the expected shape, or a model
//! was used in a way its schema does not allow.

use crate::properties::PropertyKind;
use std::fmt;
use thiserror::Error;

/// The `code` field of a Notion error body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotionErrorCode {
    RateLimited,
    ObjectNotFound,
    Unauthorized,
    /// The integration has not been shared with the page or database
    RestrictedResource,
    InvalidJson,
    ValidationFailed,
    Conflict,
    InternalError,
    ServiceUnavailable,
    /// No parseable error body; only the status is known
    HttpStatus(u16),
    Unknown(String),
}

const KNOWN_CODES: [(&str, NotionErrorCode); 9] = [
    ("rate_limited", NotionErrorCode::RateLimited),
    ("object_not_found", NotionErrorCode::ObjectNotFound),
    ("unauthorized", NotionErrorCode::Unauthorized),
    ("restricted_resource", NotionErrorCode::RestrictedResource),
    ("invalid_json", NotionErrorCode::InvalidJson),
    ("validation_error", NotionErrorCode::ValidationFailed),
    ("conflict_error", NotionErrorCode::Conflict),
    ("internal_server_error", NotionErrorCode::InternalError),
    ("service_unavailable", NotionErrorCode::ServiceUnavailable),
];

impl NotionErrorCode {
    pub fn from_api_response(code: &str) -> Self {
        KNOWN_CODES
            .iter()
            .find(|(name, _)| *name == code)
            .map(|(_, known)| known.clone())
            .unwrap_or_else(|| Self::Unknown(code.to_string()))
    }

    pub fn from_http_status(status: u16) -> Self {
        Self::HttpStatus(status)
    }

    /// Rate limits and server-side failures; the request itself was fine.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited | Self::ServiceUnavailable | Self::InternalError => true,
            Self::HttpStatus(status) => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ObjectNotFound | Self::HttpStatus(404))
    }
}

impl fmt::Display for NotionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpStatus(status) => write!(f, "http_{}", status),
            Self::Unknown(code) => f.write_str(code),
            known => {
                let name = KNOWN_CODES
                    .iter()
                    .find(|(_, code)| code == known)
                    .map_or("unknown", |(name, _)| *name);
                f.write_str(name)
            }
        }
    }
}

/// Every failure surfaced by the library.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    MissingConfiguration(String),

    #[error("Request to Notion failed: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    #[error("Notion rejected the request with {status} ({code}): {message}")]
    NotionService {
        code: NotionErrorCode,
        message: String,
        status: reqwest::StatusCode,
    },

    #[error("Unexpected response from Notion: {0}")]
    MalformedResponse(String),

    #[error("Model has no database id; set one on the schema before querying or creating pages")]
    MissingDatabaseId,

    #[error("Record has no page id; only pages fetched from or created in Notion can be updated")]
    MissingPageId,

    #[error("Model has no property named '{0}'")]
    UnknownField(String),

    #[error("Property '{property}' is declared as {expected} but holds {found}")]
    PropertyTypeMismatch {
        property: String,
        expected: PropertyKind,
        found: String,
    },

    #[error("Property type '{0}' is computed by Notion and cannot be written")]
    ReadOnlyProperty(String),

    #[error("Notion has no '{condition}' filter for {kind} property '{property}'")]
    UnsupportedFilter {
        property: String,
        condition: &'static str,
        kind: PropertyKind,
    },

    #[error("No codec registered for property type '{0}'")]
    MissingCodec(PropertyKind),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON in {path}: {source}")]
    JsonParseError {
        path: std::path::PathBuf,
        source: serde_json::Error,
    },

    #[error("{message}")]
    InternalError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error(transparent)]
    ValidationError(#[from] crate::types::ValidationError),
}

impl AppError {
    /// Whether retrying the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::NotionService { code, .. } => code.is_retryable(),
            AppError::NetworkFailure(err) => err.is_timeout() || err.is_connect(),
            _ => false,
        }
    }

    /// Whether the failed request certainly had no effect, so that even a
    /// page create may be sent again. A 5xx or a timeout may follow a write
    /// that went through.
    pub fn is_safe_to_resend(&self) -> bool {
        match self {
            AppError::NotionService { code, .. } => matches!(
                code,
                NotionErrorCode::RateLimited | NotionErrorCode::HttpStatus(429)
            ),
            AppError::NetworkFailure(err) => err.is_connect(),
            _ => false,
        }
    }

    /// The typed Notion error code, when the API reported one.
    pub fn notion_code(&self) -> Option<&NotionErrorCode> {
        match self {
            AppError::NotionService { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedResponse(err.to_string())
    }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_vocabulary() {
        assert_eq!(
            NotionErrorCode::from_api_response("rate_limited"),
            NotionErrorCode::RateLimited
        );
        assert_eq!(
            NotionErrorCode::from_api_response("brand_new_code"),
            NotionErrorCode::Unknown("brand_new_code".to_string())
        );
        assert_eq!(NotionErrorCode::ValidationFailed.to_string(), "validation_error");
        assert_eq!(NotionErrorCode::HttpStatus(502).to_string(), "http_502");
    }

    #[test]
    fn test_retryable_codes() {
        assert!(NotionErrorCode::RateLimited.is_retryable());
        assert!(NotionErrorCode::HttpStatus(503).is_retryable());
        assert!(NotionErrorCode::HttpStatus(429).is_retryable());
        assert!(!NotionErrorCode::ValidationFailed.is_retryable());
        assert!(!NotionErrorCode::HttpStatus(400).is_retryable());
    }

    #[test]
    fn test_app_error_retryability() {
        let err = AppError::NotionService {
            code: NotionErrorCode::ObjectNotFound,
            message: "gone".to_string(),
            status: reqwest::StatusCode::NOT_FOUND,
        };
        assert!(!err.is_retryable());
        assert!(err.notion_code().is_some_and(NotionErrorCode::is_not_found));
        assert!(!AppError::MissingPageId.is_retryable());
    }

    #[test]
    fn test_only_rate_limits_are_safe_to_resend() {
        let service = |code: NotionErrorCode, status: reqwest::StatusCode| AppError::NotionService {
            code,
            message: String::new(),
            status,
        };
        assert!(service(NotionErrorCode::RateLimited, reqwest::StatusCode::TOO_MANY_REQUESTS)
            .is_safe_to_resend());
        assert!(service(NotionErrorCode::HttpStatus(429), reqwest::StatusCode::TOO_MANY_REQUESTS)
            .is_safe_to_resend());

        let server_error = service(
            NotionErrorCode::InternalError,
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        );
        assert!(server_error.is_retryable());
        assert!(!server_error.is_safe_to_resend());
        assert!(!service(NotionErrorCode::HttpStatus(503), reqwest::StatusCode::SERVICE_UNAVAILABLE)
            .is_safe_to_resend());
    }

    #[test]
    fn test_type_mismatch_message() {
        let err = AppError::PropertyTypeMismatch {
            property: "Done".to_string(),
            expected: PropertyKind::Checkbox,
            found: "rich_text".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Property 'Done' is declared as checkbox but holds rich_text"
        );
    }
}
