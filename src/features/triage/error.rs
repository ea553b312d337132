use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::features::triage::dtos::TriageErrorDto;

/// Permissive CORS headers carried by every invocation response
pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

pub fn cors_headers() -> [(header::HeaderName, HeaderValue); 2] {
    [
        (
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(CORS_ALLOW_ORIGIN),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(CORS_ALLOW_HEADERS),
        ),
    ]
}

#[derive(Debug, Error)]
pub enum TriageError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("{0}")]
    InvalidBody(String),

    #[error("Failed to store prediction: {0}")]
    Persistence(String),

    #[error("Categorization service error: {0}")]
    Remote(String),
}

impl TriageError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            TriageError::MissingFields => StatusCode::BAD_REQUEST,
            TriageError::InvalidBody(_) | TriageError::Persistence(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            TriageError::Remote(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for TriageError {
    fn into_response(self) -> Response {
        if let TriageError::Persistence(ref msg) | TriageError::InvalidBody(ref msg) = self {
            tracing::error!("Categorization failed: {}", msg);
        }

        let body = TriageErrorDto {
            error: self.to_string(),
        };
        (self.status_code(), cors_headers(), Json(body)).into_response()
    }
}
