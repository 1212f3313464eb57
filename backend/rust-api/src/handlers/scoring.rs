use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::{
    extractors::AppJson,
    handlers::ApiError,
    models::scoring::{ResetScoringRequest, StartScoringRequest, SubmitScoreRequest},
    services::AppState,
};

pub async fn start_session(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<StartScoringRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;
    tracing::info!("Starting scoring session for question_id={}", req.question_id);

    let view = state.scoring_sessions.start_session(req).await;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.scoring_sessions.get_session(&session_id).await?;
    Ok(Json(view))
}

pub async fn request_hint(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!("Requesting hint for scoring session: {}", session_id);

    let response = state.scoring_sessions.request_hint(&session_id).await?;
    Ok(Json(response))
}

pub async fn record_attempt(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.scoring_sessions.record_attempt(&session_id).await?;
    Ok(Json(view))
}

pub async fn submit(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    AppJson(req): AppJson<SubmitScoreRequest>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!(
        "Submitting scoring session: {}, is_correct={}",
        session_id,
        req.is_correct
    );

    let result = state
        .scoring_sessions
        .submit(&session_id, req.is_correct)
        .await?;
    Ok(Json(result))
}

pub async fn reset(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    body: Option<AppJson<ResetScoringRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let req = body.map(|AppJson(req)| req).unwrap_or_default();
    req.validate()?;

    let view = state
        .scoring_sessions
        .reset(&session_id, req.question_id)
        .await?;
    Ok(Json(view))
}
