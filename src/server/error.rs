use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::documents::DocumentError;
use crate::generation::GenerationError;

/// Everything a handler can fail with; each renders as `{"error", "details"}`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{details}")]
    Rejected { status: StatusCode, details: String },
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(details: impl Into<String>) -> Self {
        Self::BadRequest(details.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Document(DocumentError::Unsupported) => {
                StatusCode::BAD_REQUEST
            }
            Self::Rejected { status, .. } => *status,
            Self::Generation(_) | Self::Document(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn label(&self) -> &str {
        match self {
            Self::BadRequest(_) | Self::Rejected { .. } => "Invalid request",
            Self::Generation(e) => &e.error,
            Self::Document(DocumentError::Unsupported) => "Unsupported file type",
            Self::Document(_) => "Failed to process uploaded file",
            Self::Internal(_) => "Internal server error",
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            details: rejection.body_text(),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(error: MultipartError) -> Self {
        Self::Rejected {
            status: error.status(),
            details: error.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let details = match &self {
            Self::Generation(e) => e.details.clone(),
            other => other.to_string(),
        };
        let body = json!({ "error": self.label(), "details": details });
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Document(DocumentError::Unsupported).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Generation(GenerationError::new("Failed to analyze outcome", "timeout"))
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Rejected {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                details: "missing field `title`".to_string(),
            }
            .status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_generation_error_keeps_its_label() {
        let err = ApiError::from(GenerationError::new("Failed to analyze syllabus", "boom"));
        assert_eq!(err.label(), "Failed to analyze syllabus");
    }
}
