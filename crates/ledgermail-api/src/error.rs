use ledgermail_core::ServiceError;
use thiserror::Error;

use crate::types::ApiErrorBody;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api {
        status: u16,
        code: Option<u16>,
        message: String,
    },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Build an API error from a non-success response body.
    ///
    /// Uses the `{ "code", "message" }` body when present, otherwise the raw
    /// text with the HTTP status as code.
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(parsed) => ApiError::Api {
                status,
                code: parsed.code.or(Some(status)),
                message: parsed.message,
            },
            Err(_) => ApiError::Api {
                status,
                code: Some(status),
                message: if body.trim().is_empty() {
                    format!("request failed with status {}", status)
                } else {
                    body.trim().to_string()
                },
            },
        }
    }
}

impl From<url::ParseError> for ApiError {
    fn from(e: url::ParseError) -> Self {
        ApiError::InvalidUrl(e.to_string())
    }
}

impl From<ApiError> for ServiceError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Api { code, message, .. } => ServiceError::new(code, message),
            ApiError::RequestFailed(e) => {
                ServiceError::new(e.status().map(|s| s.as_u16()), e.to_string())
            }
            other => ServiceError::new(None, other.to_string()),
        }
    }
}
