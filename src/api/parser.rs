// src/api/parser.rs
//! Turns raw HTTP responses into typed values or typed errors.
//!
//! Success bodies are decoded into the requested type; error bodies are
//! decoded with notion-client's error envelope and mapped onto
//! [`NotionErrorCode`].

use super::client::ApiResponse;
use super::responses::NotionError;
use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use crate::error::{AppError, NotionErrorCode};
use reqwest::StatusCode;

/// Parse any Notion API response.
pub fn parse_api_response<T>(result: ApiResponse<String>) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
{
    if result.status.is_success() {
        parse_success(&result.data, &result.url)
    } else {
        Err(parse_error(&result.data, result.status, &result.url))
    }
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(ERROR_BODY_PREVIEW_LENGTH) {
        Some((end, _)) => &body[..end],
        None => body,
    }
}

fn parse_success<T>(body: &str, url: &str) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(body).map_err(|e| {
        log::error!("Failed to parse response from {}: {}", url, e);
        AppError::MalformedResponse(format!("{} (body: {})", e, preview(body)))
    })
}

/// Maps an error response onto [`AppError::NotionService`].
fn parse_error(body: &str, status: StatusCode, url: &str) -> AppError {
    match serde_json::from_str::<NotionError>(body) {
        Ok(error) => {
            log::debug!(
                "Notion error {} from {} (request id: {})",
                error.code,
                url,
                error.request_id.as_deref().unwrap_or("none")
            );
            AppError::NotionService {
                code: NotionErrorCode::from_api_response(&error.code),
                message: error.message,
                status,
            }
        }
        // Fallback to generic error with HTTP status code
        Err(_) => AppError::NotionService {
            code: NotionErrorCode::from_http_status(status.as_u16()),
            message: format!("HTTP {} from {}: {}", status, url, preview(body)),
            status,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageObject;

    fn response(status: StatusCode, body: &str) -> ApiResponse<String> {
        ApiResponse {
            data: body.to_string(),
            status,
            url: "https://api.notion.com/v1/pages/abc".to_string(),
        }
    }

    #[test]
    fn test_error_envelope_becomes_typed_code() {
        let body = r#"{
            "object": "error",
            "status": 404,
            "code": "object_not_found",
            "message": "Could not find page with ID: abc123",
            "request_id": "req_123"
        }"#;

        let err =
            parse_api_response::<PageObject>(response(StatusCode::NOT_FOUND, body)).unwrap_err();
        match err {
            AppError::NotionService {
                code,
                message,
                status,
            } => {
                assert_eq!(code, NotionErrorCode::ObjectNotFound);
                assert_eq!(message, "Could not find page with ID: abc123");
                assert_eq!(status, StatusCode::NOT_FOUND);
            }
            other => panic!("Expected NotionService, got {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_error_falls_back_to_status() {
        let body = "<html>oops</html>";
        let err =
            parse_api_response::<PageObject>(response(StatusCode::BAD_GATEWAY, body)).unwrap_err();
        assert_eq!(err.notion_code(), Some(&NotionErrorCode::HttpStatus(502)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_bad_success_body_is_malformed() {
        let body = r#"{"object": "page"}"#;
        let err = parse_api_response::<PageObject>(response(StatusCode::OK, body)).unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(ERROR_BODY_PREVIEW_LENGTH + 10);
        assert_eq!(preview(&long).chars().count(), ERROR_BODY_PREVIEW_LENGTH);
        assert_eq!(preview("short"), "short");
    }
}
