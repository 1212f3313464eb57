mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_report_from_analytics_document() {
    let app = common::create_test_app();
    let analytics = json!({
        "student_id": "student-7",
        "behavioral": { "hint_dependency_score": 0.72, "retry_persistence": 0.3 },
        "engagement": { "media_preference": { "video": 12, "text": 4, "image": 1 } },
        "proficiency_vector": {
            "fractions": 0.91,
            "decimals": 0.42,
            "geometry": 0.65,
            "algebra": 0.2,
            "bloom_analyze": 0.55,
            "general": 0.61
        }
    });

    let (status, report) =
        common::send(&app, "POST", "/api/v1/mastery/report", Some(analytics)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["student_id"], "student-7");
    assert_eq!(report["hint_dependency"], "high_dependency");
    assert_eq!(report["persistence"], "gives_up_quickly");
    assert_eq!(report["learning_style"]["kind"], "dominant");
    assert_eq!(report["learning_style"]["media"], "video");

    let strongest = report["strongest"].as_array().unwrap();
    assert_eq!(strongest.len(), 3);
    assert_eq!(strongest[0]["topic"], "fractions");
    assert_eq!(strongest[0]["tier"], "green");

    let weakest = report["weakest"].as_array().unwrap();
    assert_eq!(weakest[0]["topic"], "algebra");
    assert_eq!(weakest[0]["tier"], "red");

    assert_eq!(report["bloom_profile"][0]["topic"], "analyze");
    assert_eq!(report["general_tier"], "yellow");
}

#[tokio::test]
async fn test_empty_analytics_is_balanced_without_banners() {
    let app = common::create_test_app();
    let (status, report) =
        common::send(&app, "POST", "/api/v1/mastery/report", Some(json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(report["hint_dependency"].is_null());
    assert!(report["persistence"].is_null());
    assert_eq!(report["learning_style"]["kind"], "balanced");
    assert!(report["strongest"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_variant_follows_mastery_bands() {
    let app = common::create_test_app();

    for (mastery, variant, tier) in [
        (0.3, "remedial", "red"),
        (0.5, "standard", "yellow"),
        (0.79, "standard", "yellow"),
        (0.8, "challenge", "green"),
    ] {
        let (status, body) = common::send(
            &app,
            "POST",
            "/api/v1/mastery/variant",
            Some(json!({ "mastery": mastery })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["variant"], variant, "mastery {}", mastery);
        assert_eq!(body["tier"], tier, "mastery {}", mastery);
    }
}
