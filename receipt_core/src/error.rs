//! Application error types and handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Failures raised by the search, sort and aggregation engines.
///
/// Per-record coercion failures and invalid search patterns are not errors:
/// the engines skip or degrade instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Unsupported search strategy: {0}")]
    UnsupportedStrategy(String),

    #[error("Unsupported sort algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Unsupported aggregation function: {0}")]
    UnsupportedFunction(String),

    #[error("Cannot compare {left} with {right} values in field '{field}'")]
    ComparisonTypeMismatch {
        field: String,
        left: &'static str,
        right: &'static str,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Export error: {0}")]
    Export(String),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Export(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Engine(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::IoError(err) => {
                tracing::error!("IO error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::JsonError(err) => {
                tracing::error!("JSON error: {:?}", err);
                (StatusCode::BAD_REQUEST, "Invalid JSON data".to_string())
            }
            AppError::Export(msg) => {
                tracing::error!("Export error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Export failed".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_messages() {
        let err = EngineError::UnsupportedStrategy("semantic".to_string());
        assert_eq!(err.to_string(), "Unsupported search strategy: semantic");

        let err = EngineError::ComparisonTypeMismatch {
            field: "amount".to_string(),
            left: "number",
            right: "text",
        };
        assert_eq!(err.to_string(), "Cannot compare number with text values in field 'amount'");
    }

    #[test]
    fn test_engine_errors_map_to_bad_request() {
        let response = AppError::from(EngineError::UnsupportedFunction("p99".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AppError::NotFound("Receipt with id 9 not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
