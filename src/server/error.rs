use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use crate::convert::ConversionError;
use crate::template::RenderError;

/// Failures of a render endpoint. All of them are reported as 500.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Template file not found.")]
    TemplateNotFound,

    #[error("{0}")]
    Conversion(ConversionError),

    #[error("{0}")]
    Render(RenderError),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Stable machine-readable kind, the `error` field of the body.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::TemplateNotFound => "template_not_found",
            ApiError::Conversion(_) => "conversion_failed",
            ApiError::Render(_) | ApiError::Internal(_) => "render_failed",
        }
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::TemplateNotFound(_) => ApiError::TemplateNotFound,
            RenderError::Conversion(e) => ApiError::Conversion(e),
            other => ApiError::Render(other),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("render task failed: {}", err))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.kind().to_string(),
            detail: self.to_string(),
        };
        match &self {
            ApiError::Conversion(_) => warn!(error = %body.detail, "conversion failed"),
            _ => error!(kind = self.kind(), error = %body.detail, "request failed"),
        }
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
