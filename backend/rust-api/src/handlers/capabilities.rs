use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use crate::{handlers::ApiError, models::capabilities::CapabilitiesResponse, services::AppState};

pub async fn get_capabilities(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let (capabilities, cached) = state.capabilities.get().await?;
    Ok(Json(CapabilitiesResponse {
        capabilities,
        cached,
    }))
}

pub async fn invalidate(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.capabilities.invalidate();
    StatusCode::NO_CONTENT
}
