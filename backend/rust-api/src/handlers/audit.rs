use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

use crate::{
    extractors::AppJson,
    handlers::ApiError,
    models::audit::{AuditBlockRequest, AuditCourseRequest},
    services::AppState,
};

pub async fn audit_block(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<AuditBlockRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .auditor
        .validate_block(&req.block, req.mode, req.block_index);
    Ok(Json(result))
}

pub async fn audit_course(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<AuditCourseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!(
        "Auditing course: {} blocks, mode={:?}",
        req.blocks.len(),
        req.mode
    );

    let report = state.auditor.audit_course(&req.blocks, req.mode);
    if !report.blocking_issues.is_empty() {
        tracing::warn!(
            "Course audit found {} blocking issues",
            report.blocking_issues.len()
        );
    }
    Ok(Json(report))
}
