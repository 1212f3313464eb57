use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

use crate::{
    extractors::AppJson,
    handlers::ApiError,
    models::mastery::{StudentAnalytics, VariantRequest, VariantResponse},
    services::AppState,
};

pub async fn build_report(
    State(state): State<Arc<AppState>>,
    AppJson(analytics): AppJson<StudentAnalytics>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.mastery.build_report(&analytics)))
}

pub async fn select_variant(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<VariantRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !req.mastery.is_finite() {
        return Err(ApiError::bad_request("mastery must be a finite number"));
    }

    Ok(Json(VariantResponse {
        variant: state.mastery.select_variant(req.mastery),
        tier: state.mastery.mastery_tier(req.mastery),
    }))
}
