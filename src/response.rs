use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Failure taxonomy of the word service: validation (400), not-found (404)
/// and store failures (500, driver message passed through).
#[derive(Debug, Clone)]
pub struct AppError {
    status: StatusCode,
    error: String,
    message: Option<String>,
}

impl AppError {
    pub fn validation(error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: error.into(),
            message: None,
        }
    }

    pub fn not_found(error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error: error.into(),
            message: None,
        }
    }

    pub fn store(error: impl Into<String>, source: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: error.into(),
            message: Some(source.to_string()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: "Database unavailable".to_string(),
            message: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: self.error,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}
