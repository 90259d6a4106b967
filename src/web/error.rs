use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::{domain::ClassificationResult, normalizer::UnparsableResponse};

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("Message cannot be empty")]
    EmptyInput,
    #[error("Invalid request body")]
    InvalidBody,
    #[error("upstream classifier unavailable: {0:#}")]
    UpstreamUnavailable(anyhow::Error),
    #[error(transparent)]
    UnparsableUpstreamResponse(#[from] UnparsableResponse),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fallback: Option<ClassificationResult>,
}

impl IntoResponse for DetectError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            DetectError::EmptyInput => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "Message cannot be empty",
                    fallback: None,
                },
            ),
            DetectError::InvalidBody => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "Invalid request body",
                    fallback: None,
                },
            ),
            DetectError::UpstreamUnavailable(_) | DetectError::UnparsableUpstreamResponse(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "Analysis failed",
                    fallback: Some(ClassificationResult::fallback()),
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}
