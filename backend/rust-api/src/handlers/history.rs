use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::{
    extractors::AppJson, handlers::ApiError, models::history::PushVersionRequest,
    services::AppState,
};

pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.history.view(&course_id).await?))
}

pub async fn push_version(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<String>,
    AppJson(req): AppJson<PushVersionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!("Recording course version: {}", course_id);

    let view = state.history.push(&course_id, req.state).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn undo(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.history.undo(&course_id).await?))
}

pub async fn redo(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.history.redo(&course_id).await?))
}
