mod common;

use axum::http::StatusCode;
use serde_json::json;
use std::sync::Arc;

use ailms_api::services::history_service::JsonFilePersister;

#[tokio::test]
async fn test_push_undo_redo_via_api() {
    let app = common::create_test_app();
    let base = "/api/v1/courses/course-bio/history";

    for title in ["draft", "outline", "final"] {
        let (status, _) =
            common::send(&app, "POST", base, Some(json!({ "state": { "title": title } }))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, view) = common::send(&app, "POST", &format!("{}/undo", base), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["current"]["title"], "outline");
    assert_eq!(view["can_redo"], true);

    let (status, view) = common::send(&app, "POST", &format!("{}/redo", base), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["current"]["title"], "final");
    assert_eq!(view["can_redo"], false);
}

#[tokio::test]
async fn test_undo_depth_is_capped() {
    let app = common::create_test_app();
    let base = "/api/v1/courses/course-capped/history";

    for rev in 0..9 {
        common::send(&app, "POST", base, Some(json!({ "state": { "rev": rev } }))).await;
    }

    let (_, view) = common::send(&app, "GET", base, None).await;
    assert_eq!(view["undo_depth"], 5);

    let mut undone = 0;
    loop {
        let (status, _) = common::send(&app, "POST", &format!("{}/undo", base), None).await;
        if status != StatusCode::OK {
            assert_eq!(status, StatusCode::CONFLICT);
            break;
        }
        undone += 1;
    }
    assert_eq!(undone, 5);

    let (_, view) = common::send(&app, "GET", base, None).await;
    assert_eq!(view["current"]["rev"], 3);
}

#[tokio::test]
async fn test_empty_history_and_bad_ids() {
    let app = common::create_test_app();

    let (status, view) = common::send(&app, "GET", "/api/v1/courses/new-course/history", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(view["current"].is_null());
    assert_eq!(view["can_undo"], false);

    let (status, body) =
        common::send(&app, "POST", "/api/v1/courses/new-course/history/redo", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], 409);

    let (status, _) =
        common::send(&app, "GET", "/api/v1/courses/bad.id/history", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_history_persists_across_app_instances() {
    let dir = tempfile::tempdir().unwrap();
    let base = "/api/v1/courses/course-1/history";

    let app = common::create_test_app_with(
        Arc::new(common::FakeCapabilities::default()),
        Arc::new(JsonFilePersister::new(dir.path())),
    );
    common::send(&app, "POST", base, Some(json!({ "state": { "v": 1 } }))).await;
    common::send(&app, "POST", base, Some(json!({ "state": { "v": 2 } }))).await;

    let restarted = common::create_test_app_with(
        Arc::new(common::FakeCapabilities::default()),
        Arc::new(JsonFilePersister::new(dir.path())),
    );
    let (status, view) = common::send(&restarted, "POST", &format!("{}/undo", base), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["current"]["v"], 1);
}
