mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

fn rule<'a>(result: &'a Value, id: &str) -> &'a Value {
    result["rules"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["id"] == id)
        .unwrap_or_else(|| panic!("rule {} missing in {}", id, result))
}

fn compliant_mc_block() -> Value {
    json!({
        "id": "mc-1",
        "type": "multiple-choice",
        "content": {
            "question": "איזה איבר בצמח אחראי על פוטוסינתזה? [1]",
            "options": ["עלה", "שורש", "גבעול"],
            "correctAnswer": "עלה"
        },
        "metadata": {
            "progressiveHints": ["חשבו על הצבע הירוק", "היכן נמצאת הכלורופיל?"],
            "feedbackCorrect": "נכון מאוד, העלה מכיל כלורופיל שקולט אור",
            "feedbackIncorrect": "לא בדיוק, נסו לחשוב איפה קולטים אור",
            "bloomLevel": "analyze",
            "aiValidation": { "tone": "encouraging", "cefrLevel": "B1" }
        }
    })
}

#[tokio::test]
async fn test_compliant_block_scores_full() {
    let app = common::create_test_app();
    let (status, result) = common::send(
        &app,
        "POST",
        "/api/v1/audit/block",
        Some(json!({ "block": compliant_mc_block(), "mode": "learning", "blockIndex": 1 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["blockId"], "mc-1");
    assert_eq!(result["score"], 100);
    assert!(result["rules"]
        .as_array()
        .unwrap()
        .iter()
        .all(|r| r["status"] == "PASS"));
}

#[tokio::test]
async fn test_missing_content_scores_zero() {
    let app = common::create_test_app();
    let (status, result) = common::send(
        &app,
        "POST",
        "/api/v1/audit/block",
        Some(json!({ "block": { "id": "empty", "type": "text" } })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["score"], 0);
    assert_eq!(rule(&result, "content-presence")["status"], "FAIL");
}

#[tokio::test]
async fn test_empty_text_content_scores_zero() {
    let app = common::create_test_app();
    let (_, result) = common::send(
        &app,
        "POST",
        "/api/v1/audit/block",
        Some(json!({ "block": { "id": "blank", "type": "text", "content": "" } })),
    )
    .await;

    assert_eq!(result["score"], 0);
    assert_eq!(rule(&result, "content-presence")["status"], "FAIL");
}

#[tokio::test]
async fn test_exam_block_with_hints_is_security_violation() {
    let app = common::create_test_app();
    let (_, result) = common::send(
        &app,
        "POST",
        "/api/v1/audit/block",
        Some(json!({ "block": compliant_mc_block(), "mode": "exam", "blockIndex": 2 })),
    )
    .await;

    let hints = rule(&result, "hints");
    assert_eq!(hints["status"], "FAIL");
    assert_eq!(hints["scoreImpact"], 30);
    assert!(result["score"].as_u64().unwrap() <= 70);
}

#[tokio::test]
async fn test_course_audit_reports_blocking_issues() {
    let app = common::create_test_app();
    let blocks = json!([
        { "id": "intro", "type": "text", "content": "ברוכים הבאים למבחן" },
        { "id": "teach", "type": "text", "content": "הסבר על תאים" },
        compliant_mc_block()
    ]);

    let (status, report) = common::send(
        &app,
        "POST",
        "/api/v1/audit/course",
        Some(json!({ "blocks": blocks, "mode": "exam" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let results = report["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(rule(&results[0], "exam-introduction")["status"], "PASS");
    assert_eq!(rule(&results[1], "exam-teaching-content")["status"], "FAIL");
    assert!(!report["blockingIssues"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_audit_request_is_json_error() {
    let app = common::create_test_app();
    let (status, body) = common::send(&app, "POST", "/api/v1/audit/block", Some(json!({}))).await;
    assert!(status.is_client_error());
    assert!(body["status"].is_number());
}
