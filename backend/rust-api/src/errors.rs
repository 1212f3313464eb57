use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoringSessionError {
    #[error("Scoring session {0} not found")]
    NotFound(String),

    #[error("Scoring session {0} was already submitted")]
    AlreadySubmitted(String),
}

impl ScoringSessionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ScoringSessionError::NotFound(_) => StatusCode::NOT_FOUND,
            ScoringSessionError::AlreadySubmitted(_) => StatusCode::CONFLICT,
        }
    }
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Nothing to undo for course {0}")]
    NothingToUndo(String),

    #[error("Nothing to redo for course {0}")]
    NothingToRedo(String),

    #[error("Invalid course id: {0}")]
    InvalidCourseId(String),

    #[error("History storage failed: {0}")]
    Storage(#[from] std::io::Error),

    #[error("History data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl HistoryError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            HistoryError::NothingToUndo(_) | HistoryError::NothingToRedo(_) => StatusCode::CONFLICT,
            HistoryError::InvalidCourseId(_) => StatusCode::BAD_REQUEST,
            HistoryError::Storage(_) | HistoryError::Corrupt(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum CapabilitiesError {
    #[error("Capabilities function URL is not configured")]
    NotConfigured,

    #[error("Capabilities request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Capabilities function returned status {0}")]
    Status(u16),
}

impl CapabilitiesError {
    pub fn is_retryable(&self) -> bool {
        match self {
            CapabilitiesError::NotConfigured => false,
            CapabilitiesError::Request(e) => e.is_timeout() || e.is_connect(),
            CapabilitiesError::Status(code) => *code >= 500 || *code == 429,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            CapabilitiesError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            CapabilitiesError::Request(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            CapabilitiesError::Request(_) | CapabilitiesError::Status(_) => StatusCode::BAD_GATEWAY,
        }
    }
}
