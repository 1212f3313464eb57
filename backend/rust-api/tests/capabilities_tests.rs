mod common;

use axum::http::StatusCode;
use std::sync::Arc;

use ailms_api::services::history_service::MemoryPersister;

#[tokio::test]
async fn test_capabilities_are_cached() {
    let provider = Arc::new(common::FakeCapabilities::default());
    let app = common::create_test_app_with(provider.clone(), Arc::new(MemoryPersister::new()));

    let (status, body) = common::send(&app, "GET", "/api/v1/capabilities", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cached"], false);
    assert_eq!(body["capabilities"]["textGeneration"], true);

    let (_, body) = common::send(&app, "GET", "/api/v1/capabilities", None).await;
    assert_eq!(body["cached"], true);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_invalidate_forces_refetch() {
    let provider = Arc::new(common::FakeCapabilities::default());
    let app = common::create_test_app_with(provider.clone(), Arc::new(MemoryPersister::new()));

    common::send(&app, "GET", "/api/v1/capabilities", None).await;
    let (status, _) = common::send(&app, "POST", "/api/v1/capabilities/invalidate", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = common::send(&app, "GET", "/api/v1/capabilities", None).await;
    assert_eq!(body["cached"], false);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let provider = Arc::new(common::FakeCapabilities {
        unavailable: true,
        ..Default::default()
    });
    let app = common::create_test_app_with(provider.clone(), Arc::new(MemoryPersister::new()));

    let (status, body) = common::send(&app, "GET", "/api/v1/capabilities", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"], 502);
}
