mod common;
mod support;

use actix_web::test;
use serde_json::json;
use support::create_test_app;
use tempfile::TempDir;
use time::OffsetDateTime;
use toolgate::domain::Profile;
use toolgate::services::profiles;

#[actix_web::test]
async fn test_comments_listing_requires_a_parameter() {
    let dir = TempDir::new().unwrap();
    let state = support::build_test_state(dir.path()).await;
    let security = state.security.clone();
    let app = create_test_app(state).build().await;

    let cookie = support::session_for(&security, "pat@example.com", Some(true));
    let req = test::TestRequest::get()
        .uri("/api/comments")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;

    common::assert_problem_details(resp, 400, "BAD_REQUEST", "Missing tool parameter").await;
}

#[actix_web::test]
async fn test_comments_start_empty() {
    let dir = TempDir::new().unwrap();
    let state = support::build_test_state(dir.path()).await;
    let security = state.security.clone();
    let app = create_test_app(state).build().await;

    let cookie = support::session_for(&security, "pat@example.com", Some(true));
    let req = test::TestRequest::get()
        .uri("/api/comments?tool=tie-out-helper")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body = common::read_json(resp).await;
    assert_eq!(body["comments"].as_array().map(Vec::len), Some(0));
}

#[actix_web::test]
async fn test_posting_requires_tool_slug() {
    let dir = TempDir::new().unwrap();
    let state = support::build_test_state(dir.path()).await;
    let security = state.security.clone();
    let app = create_test_app(state).build().await;

    let cookie = support::session_for(&security, "pat@example.com", Some(true));
    let req = test::TestRequest::post()
        .uri("/api/comments")
        .cookie(cookie)
        .set_json(json!({ "content": "Great tool" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    common::assert_problem_details(resp, 400, "VALIDATION_ERROR", "Missing tool slug").await;
}

#[actix_web::test]
async fn test_posting_rejects_unknown_tool() {
    let dir = TempDir::new().unwrap();
    let state = support::build_test_state(dir.path()).await;
    let security = state.security.clone();
    let app = create_test_app(state).build().await;

    let cookie = support::session_for(&security, "pat@example.com", Some(true));
    let req = test::TestRequest::post()
        .uri("/api/comments")
        .cookie(cookie)
        .set_json(json!({ "toolSlug": "no-such-tool", "content": "Great tool" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    common::assert_problem_details(resp, 400, "TOOL_NOT_FOUND", "Tool not found").await;
}

#[actix_web::test]
async fn test_posting_requires_content() {
    let dir = TempDir::new().unwrap();
    let state = support::build_test_state(dir.path()).await;
    let security = state.security.clone();
    let app = create_test_app(state).build().await;

    let cookie = support::session_for(&security, "pat@example.com", Some(true));
    let req = test::TestRequest::post()
        .uri("/api/comments")
        .cookie(cookie)
        .set_json(json!({ "toolSlug": "tie-out-helper" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    common::assert_problem_details(resp, 400, "VALIDATION_ERROR", "Comment content is required")
        .await;
}

#[actix_web::test]
async fn test_markup_only_content_is_rejected() {
    let dir = TempDir::new().unwrap();
    let state = support::build_test_state(dir.path()).await;
    let security = state.security.clone();
    let app = create_test_app(state).build().await;

    let cookie = support::session_for(&security, "pat@example.com", Some(true));
    let req = test::TestRequest::post()
        .uri("/api/comments")
        .cookie(cookie)
        .set_json(json!({ "toolSlug": "tie-out-helper", "content": "<b></b>" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    common::assert_problem_details(
        resp,
        400,
        "VALIDATION_ERROR",
        "Comment must be between 1 and 2000 characters",
    )
    .await;
}

#[actix_web::test]
async fn test_oversized_content_is_rejected() {
    let dir = TempDir::new().unwrap();
    let state = support::build_test_state(dir.path()).await;
    let security = state.security.clone();
    let app = create_test_app(state).build().await;

    let cookie = support::session_for(&security, "pat@example.com", Some(true));
    let req = test::TestRequest::post()
        .uri("/api/comments")
        .cookie(cookie)
        .set_json(json!({ "toolSlug": "tie-out-helper", "content": "x".repeat(2001) }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    common::assert_problem_details(
        resp,
        400,
        "VALIDATION_ERROR",
        "Comment must be between 1 and 2000 characters",
    )
    .await;
}

#[actix_web::test]
async fn test_posting_strips_markup_and_falls_back_to_email_author() {
    let dir = TempDir::new().unwrap();
    let state = support::build_test_state(dir.path()).await;
    let security = state.security.clone();
    let app = create_test_app(state).build().await;

    let cookie = support::session_for(&security, "pat@example.com", Some(true));
    let req = test::TestRequest::post()
        .uri("/api/comments")
        .cookie(cookie.clone())
        .set_json(json!({ "toolSlug": "tie-out-helper", "content": "<b>Nice</b> tool" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body = common::read_json(resp).await;
    assert_eq!(body["comment"]["content"], "Nice tool");
    assert_eq!(body["comment"]["authorName"], "pat@example.com");
    assert_eq!(body["comment"]["authorCompany"], "");
    assert!(body["comment"]["id"].as_str().is_some());

    let req = test::TestRequest::get()
        .uri("/api/comments?tool=tie-out-helper")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body = common::read_json(resp).await;
    let comments = body["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["content"], "Nice tool");
}

#[actix_web::test]
async fn test_author_fields_come_from_the_profile() {
    let dir = TempDir::new().unwrap();
    let state = support::build_test_state(dir.path()).await;
    let security = state.security.clone();
    let kv = state.kv.clone();
    let app = create_test_app(state).build().await;

    let now = OffsetDateTime::now_utc();
    profiles::save(
        &kv,
        &Profile {
            email: "pat@example.com".to_string(),
            full_name: "Pat Example".to_string(),
            company: "Example LLP".to_string(),
            role: "CPA".to_string(),
            firm_size: "2-5".to_string(),
            city: String::new(),
            state: String::new(),
            industries: vec![],
            engagement_types: vec![],
            biggest_pain_point: String::new(),
            referral_source: String::new(),
            tool_interests: String::new(),
            completed_at: now,
            updated_at: now,
        },
    )
    .await
    .unwrap();

    let cookie = support::session_for(&security, "pat@example.com", Some(true));
    let req = test::TestRequest::post()
        .uri("/api/comments")
        .cookie(cookie)
        .set_json(json!({ "toolSlug": "tie-out-helper", "content": "Works well" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    let body = common::read_json(resp).await;
    assert_eq!(body["comment"]["authorName"], "Pat Example");
    assert_eq!(body["comment"]["authorCompany"], "Example LLP");
    assert_eq!(body["comment"]["authorRole"], "CPA");
}

#[actix_web::test]
async fn test_counts_cover_every_requested_slug() {
    let dir = TempDir::new().unwrap();
    let state = support::build_test_state(dir.path()).await;
    let security = state.security.clone();
    let app = create_test_app(state).build().await;

    let cookie = support::session_for(&security, "pat@example.com", Some(true));
    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/comments")
            .cookie(cookie.clone())
            .set_json(json!({ "toolSlug": "tie-out-helper", "content": "Great" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 200);
    }

    let req = test::TestRequest::get()
        .uri("/api/comments?slugs=tie-out-helper,depreciation-calc,")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body = common::read_json(resp).await;
    assert_eq!(body["counts"]["tie-out-helper"], 2);
    assert_eq!(body["counts"]["depreciation-calc"], 0);
}

#[actix_web::test]
async fn test_recent_feed_spans_tools() {
    let dir = TempDir::new().unwrap();
    let state = support::build_test_state(dir.path()).await;
    let security = state.security.clone();
    let app = create_test_app(state).build().await;

    let cookie = support::session_for(&security, "pat@example.com", Some(true));
    for slug in ["tie-out-helper", "depreciation-calc"] {
        let req = test::TestRequest::post()
            .uri("/api/comments")
            .cookie(cookie.clone())
            .set_json(json!({ "toolSlug": slug, "content": format!("About {slug}") }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 200);
    }

    let req = test::TestRequest::get()
        .uri("/api/comments?recent=10")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body = common::read_json(resp).await;
    let feed = body["comments"].as_array().unwrap();
    assert_eq!(feed.len(), 2);
    assert_eq!(feed[0]["toolSlug"], "tie-out-helper");
    assert_eq!(feed[1]["toolSlug"], "depreciation-calc");
}

#[actix_web::test]
async fn test_comment_rate_limit_waits_for_durable_storage() {
    let dir = TempDir::new().unwrap();
    let state = support::build_test_state(dir.path()).await;
    let security = state.security.clone();
    let app = create_test_app(state).build().await;

    // The comment limit only runs against the durable backend; the file
    // store never throttles, so a burst past the limit still lands.
    let cookie = support::session_for(&security, "pat@example.com", Some(true));
    for i in 0..12 {
        let req = test::TestRequest::post()
            .uri("/api/comments")
            .cookie(cookie.clone())
            .set_json(json!({ "toolSlug": "tie-out-helper", "content": format!("Comment {i}") }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 200);
    }
}
