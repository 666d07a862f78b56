//! HTTP error mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use inference_engine::ClassifyError;
use reference_lookup::LookupError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Request-scoped failures; never fatal to the process
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed upload
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Status code and client-facing message; internals stay in the logs
    fn public_parts(&self) -> (StatusCode, String) {
        match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ApiError::Classify(ClassifyError::InvalidImage(_)) => (
                StatusCode::BAD_REQUEST,
                "Uploaded file is not a supported image".to_string(),
            ),
            ApiError::Classify(ClassifyError::Inference(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Classification failed".to_string(),
            ),
            ApiError::Lookup(LookupError::NotFound(term)) => (
                StatusCode::NOT_FOUND,
                format!("No reference page found for {}", term),
            ),
            ApiError::Lookup(LookupError::Ambiguous(term)) => (
                StatusCode::CONFLICT,
                format!("Reference for {} is ambiguous", term),
            ),
            ApiError::Lookup(LookupError::Unavailable(_)) => (
                StatusCode::BAD_GATEWAY,
                "Reference source unavailable".to_string(),
            ),
            ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.public_parts();
        if status.is_server_error() {
            error!("Request failed with {}: {}", status, self);
        } else {
            warn!("Request rejected with {}: {}", status, self);
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inference_engine::InferenceError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::BadRequest("missing field".into()), StatusCode::BAD_REQUEST),
            (ClassifyError::InvalidImage("bad magic".into()).into(), StatusCode::BAD_REQUEST),
            (
                ClassifyError::from(InferenceError::InferenceFailed("nan".into())).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (LookupError::NotFound("X".into()).into(), StatusCode::NOT_FOUND),
            (LookupError::Ambiguous("X".into()).into(), StatusCode::CONFLICT),
            (LookupError::Unavailable("timeout".into()).into(), StatusCode::BAD_GATEWAY),
            (ApiError::Internal("join".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_internal_details_not_exposed() {
        let error: ApiError = LookupError::Unavailable("dns error: api.internal:443".into()).into();
        let (_, message) = error.public_parts();
        assert!(!message.contains("api.internal"));

        let error: ApiError = ClassifyError::from(InferenceError::InferenceFailed("tensor #3".into())).into();
        let (_, message) = error.public_parts();
        assert!(!message.contains("tensor"));
    }
}
