use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod errors;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use services::AppState;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_origin(tower_http::cors::Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .nest("/api/v1/scoring/sessions", scoring_routes())
        .nest("/api/v1/audit", audit_routes())
        .nest("/api/v1/mastery", mastery_routes())
        .nest("/api/v1/capabilities", capabilities_routes())
        .nest("/api/v1/courses", history_routes())
        .with_state(app_state)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(
            middlewares::metrics::metrics_middleware,
        ))
        .layer(middleware::from_fn(
            middlewares::trace::trace_context_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}

fn scoring_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(handlers::scoring::start_session))
        .route("/{id}", get(handlers::scoring::get_session))
        .route("/{id}/hints", post(handlers::scoring::request_hint))
        .route("/{id}/attempts", post(handlers::scoring::record_attempt))
        .route("/{id}/submit", post(handlers::scoring::submit))
        .route("/{id}/reset", post(handlers::scoring::reset))
}

fn audit_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/block", post(handlers::audit::audit_block))
        .route("/course", post(handlers::audit::audit_course))
}

fn mastery_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/report", post(handlers::mastery::build_report))
        .route("/variant", post(handlers::mastery::select_variant))
}

fn capabilities_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::capabilities::get_capabilities))
        .route("/invalidate", post(handlers::capabilities::invalidate))
}

fn history_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/{id}/history",
            get(handlers::history::get_history).post(handlers::history::push_version),
        )
        .route("/{id}/history/undo", post(handlers::history::undo))
        .route("/{id}/history/redo", post(handlers::history::redo))
}
