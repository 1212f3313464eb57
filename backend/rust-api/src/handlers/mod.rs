use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::errors::{CapabilitiesError, HistoryError, ScoringSessionError};
use crate::extractors::error_response;
use crate::metrics;
use crate::services::AppState;

pub mod audit;
pub mod capabilities;
pub mod history;
pub mod mastery;
pub mod scoring;

/// Handler error rendered as `{message, status}` JSON.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error_response(self.status, self.message)
    }
}

impl From<ScoringSessionError> for ApiError {
    fn from(err: ScoringSessionError) -> Self {
        Self {
            status: err.status_code(),
            message: err.to_string(),
        }
    }
}

impl From<HistoryError> for ApiError {
    fn from(err: HistoryError) -> Self {
        if err.status_code().is_server_error() {
            tracing::error!("History operation failed: {}", err);
        }
        Self {
            status: err.status_code(),
            message: err.to_string(),
        }
    }
}

impl From<CapabilitiesError> for ApiError {
    fn from(err: CapabilitiesError) -> Self {
        Self {
            status: err.status_code(),
            message: err.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::bad_request(format!("Validation error: {}", err))
    }
}

/// Liveness plus a summary of the in-process components.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let capabilities = if state.config.capabilities.function_url.is_some() {
        "configured"
    } else {
        "not_configured"
    };
    let history = if state.config.history.storage_dir.is_some() {
        "json_files"
    } else {
        "memory"
    };
    let scoring_sessions = state.scoring_sessions.len().await;

    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "ailms-api",
            "version": env!("CARGO_PKG_VERSION"),
            "components": {
                "scoring_sessions": scoring_sessions,
                "capabilities": capabilities,
                "history": history
            }
        })),
    )
}

pub async fn metrics_handler() -> impl IntoResponse {
    match metrics::render_metrics() {
        Ok(metrics_text) => (StatusCode::OK, metrics_text),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to render metrics: {}", e),
        ),
    }
}
