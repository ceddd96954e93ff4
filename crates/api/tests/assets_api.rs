//! Integration tests for the `/api/v1/assets` endpoints.

mod common;

use axum::http::StatusCode;

use adlens_events::EventKind;

use common::{body_json, build_test_app, get, good_response, image_asset_body, post_json, TestProvider};

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submit_asset_returns_201_pending() {
    let t = build_test_app(TestProvider::hanging()).await;

    let response = post_json(&t.app, "/api/v1/assets", image_asset_body("Banner A")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Banner A");
    assert_eq!(json["data"]["status"], "pending_analysis");
    assert!(json["data"]["overall_score"].is_null());
}

#[tokio::test]
async fn submit_invalid_asset_returns_400() {
    let t = build_test_app(TestProvider::hanging()).await;

    let mut body = image_asset_body("Banner A");
    body.as_object_mut().unwrap().remove("url");
    let response = post_json(&t.app, "/api/v1/assets", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Retrieval and listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_asset_round_trips() {
    let t = build_test_app(TestProvider::hanging()).await;

    let created = body_json(
        post_json(&t.app, "/api/v1/assets", image_asset_body("Banner A")).await,
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let response = get(&t.app, &format!("/api/v1/assets/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], id.as_str());
}

#[tokio::test]
async fn get_unknown_asset_returns_404() {
    let t = build_test_app(TestProvider::hanging()).await;
    let response = get(
        &t.app,
        "/api/v1/assets/00000000-0000-4000-8000-000000000000",
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn list_assets_filters_and_sorts() {
    let t = build_test_app(TestProvider::hanging()).await;
    for name in ["cherry", "apple", "banana"] {
        post_json(&t.app, "/api/v1/assets", image_asset_body(name)).await;
    }

    let response = get(&t.app, "/api/v1/assets?sort_by=name&order=desc").await;
    let json = body_json(response).await;
    let names: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["cherry", "banana", "apple"]);

    let response = get(&t.app, "/api/v1/assets?name_contains=AN").await;
    let json = body_json(response).await;
    let names: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["banana"]);
}

// ---------------------------------------------------------------------------
// Analysis lifecycle over HTTP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn analyzed_asset_carries_score_and_status() {
    let t = build_test_app(TestProvider::scripted(vec![Ok(good_response())])).await;
    let mut rx = t.bus.subscribe();

    let created = body_json(
        post_json(&t.app, "/api/v1/assets", image_asset_body("Banner A")).await,
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    // Wait for the out-of-band analysis to complete.
    loop {
        let event = tokio::time::timeout(std::time::Duration::from_secs(2), rx.recv())
            .await
            .expect("analysis should complete")
            .expect("bus open");
        if event.kind == EventKind::AssetAnalyzed {
            break;
        }
    }

    let json = body_json(get(&t.app, &format!("/api/v1/assets/{id}")).await).await;
    assert_eq!(json["data"]["overall_score"], 8.7);
    assert_eq!(json["data"]["status"], "active");
    assert_eq!(json["data"]["score_breakdown"]["relevance"], 9.2);
}

#[tokio::test]
async fn reanalyze_pending_asset_returns_409() {
    let t = build_test_app(TestProvider::hanging()).await;

    let created = body_json(
        post_json(&t.app, "/api/v1/assets", image_asset_body("Banner A")).await,
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let response = post_json(
        &t.app,
        &format!("/api/v1/assets/{id}/reanalyze"),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn cancel_inflight_analysis_returns_ok() {
    let t = build_test_app(TestProvider::hanging()).await;

    let created = body_json(
        post_json(&t.app, "/api/v1/assets", image_asset_body("Banner A")).await,
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let response = post_json(
        &t.app,
        &format!("/api/v1/assets/{id}/cancel"),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["cancelled"], true);
}
