//! HTTP-level integration tests for the `/wizard/sessions` endpoints.
//!
//! Pages are seeded straight into the in-memory store; the test then walks
//! the wizard the way a browser client would.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::Router;
use common::{body_json, build_test_app, delete, get, post, put_json};
use onboard_core::gateway::memory::InMemoryGateway;
use onboard_core::gateway::{PageStore, SubmissionStore};
use onboard_core::page::{FieldType, InputFieldSpec, PageContent};
use onboard_core::session::SessionId;
use onboard_core::submission::{StepKey, Submission, EMAIL_FIELD, PASSWORD_FIELD};
use onboard_core::types::FieldId;
use serde_json::{json, Value};

async fn seed_page(store: &InMemoryGateway, heading: &str, input_id: &str) {
    let content = PageContent {
        heading: heading.to_string(),
        inputs: vec![InputFieldSpec {
            input_id: FieldId::from(input_id),
            field_type: Some(FieldType::Text),
            placeholder: heading.to_string(),
        }],
    };
    store.create_page(&content).await.unwrap();
}

/// A store with two single-field pages: `name`, then `city`.
async fn two_page_store() -> Arc<InMemoryGateway> {
    let store = Arc::new(InMemoryGateway::new());
    seed_page(&store, "Name", "name").await;
    seed_page(&store, "City", "city").await;
    store
}

async fn open(app: &Router) -> (String, Value) {
    let response = post(app.clone(), "/api/v1/wizard/sessions").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let sid = json["data"]["sessionId"].as_str().unwrap().to_string();
    (sid, json["data"].clone())
}

async fn answer(app: Router, sid: &str, input_id: &str, value: &str) -> (StatusCode, Value) {
    let response = put_json(
        app,
        &format!("/api/v1/wizard/sessions/{sid}/answers"),
        json!({"inputId": input_id, "value": value}),
    )
    .await;
    let status = response.status();
    (status, body_json(response).await)
}

async fn action(app: Router, sid: &str, action: &str) -> (StatusCode, Value) {
    let response = post(app, &format!("/api/v1/wizard/sessions/{sid}/{action}")).await;
    let status = response.status();
    (status, body_json(response).await)
}

// ---------------------------------------------------------------------------
// Test: a fresh session starts logged out on step 0
// ---------------------------------------------------------------------------

#[tokio::test]
async fn open_session_starts_logged_out() {
    let store = two_page_store().await;
    let router = build_test_app(store.clone());
    let (_, view) = open(&router).await;

    assert_eq!(view["phase"], json!({"state": "logged_out"}));
    assert_eq!(view["activeStep"], 0);
    assert_eq!(view["stepCount"], 3);
    assert_eq!(view["primaryAction"], "Next");
    assert_eq!(view["canAdvance"], false);
    assert_eq!(view["canGoBack"], false);
    assert!(view["currentPage"].is_null());
}

// ---------------------------------------------------------------------------
// Test: full walk through two pages ends in Completed
// ---------------------------------------------------------------------------

#[tokio::test]
async fn two_page_walk_saves_draft_then_submits() {
    let store = two_page_store().await;
    let router = build_test_app(store.clone());
    let (sid, _) = open(&router).await;

    answer(router.clone(), &sid, EMAIL_FIELD, "ada@example.com").await;
    let (_, view) = answer(router.clone(), &sid, PASSWORD_FIELD, "secret").await;
    assert_eq!(view["data"]["canAdvance"], true);

    let (status, view) = action(router.clone(), &sid, "next").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["data"]["phase"], json!({"state": "step", "step": 1}));
    assert_eq!(view["data"]["currentPage"]["heading"], "Name");
    assert_eq!(store.submission_write_count(), 0);

    answer(router.clone(), &sid, "name", "Ada").await;
    let (status, view) = action(router.clone(), &sid, "next").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["data"]["activeStep"], 2);
    assert_eq!(view["data"]["primaryAction"], "Submit");

    let session = SessionId::from_email("ada@example.com");
    let draft = store.get_submission(&session).await.unwrap().unwrap();
    assert_eq!(draft.last_saved, Some(1));
    assert!(!draft.has_submitted);

    answer(router.clone(), &sid, "city", "Paris").await;
    let (status, view) = action(router.clone(), &sid, "submit").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["data"]["phase"], json!({"state": "completed"}));
    assert_eq!(view["data"]["activeStep"], 3);
    assert_eq!(view["data"]["inputsEnabled"], false);

    let stored = store.get_submission(&session).await.unwrap().unwrap();
    assert!(stored.has_submitted);
    assert_eq!(stored.last_saved, Some(2));
    assert_eq!(stored.find_value(&FieldId::from("city")), Some("Paris"));
    let login = stored.answers.get(&StepKey::Login).unwrap();
    assert!(login.get(&FieldId::from(PASSWORD_FIELD)).is_none());
}

// ---------------------------------------------------------------------------
// Test: gates reject out-of-order actions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn next_without_credentials_is_rejected() {
    let store = two_page_store().await;
    let router = build_test_app(store.clone());
    let (sid, _) = open(&router).await;

    let (status, body) = action(router.clone(), &sid, "next").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn back_from_login_step_is_rejected() {
    let store = two_page_store().await;
    let router = build_test_app(store.clone());
    let (sid, _) = open(&router).await;

    let (status, _) = action(router.clone(), &sid, "back").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn answer_for_field_not_on_step_is_rejected() {
    let store = two_page_store().await;
    let router = build_test_app(store.clone());
    let (sid, _) = open(&router).await;

    let (status, _) = answer(router.clone(), &sid, "city", "Paris").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: a returning user who already submitted lands on AlreadySubmitted
// ---------------------------------------------------------------------------

#[tokio::test]
async fn returning_submitted_user_is_locked_out() {
    let store = two_page_store().await;
    let router = build_test_app(store.clone());

    let (sid, _) = open(&router).await;
    answer(router.clone(), &sid, EMAIL_FIELD, "ada@example.com").await;
    answer(router.clone(), &sid, PASSWORD_FIELD, "secret").await;
    action(router.clone(), &sid, "next").await;
    answer(router.clone(), &sid, "name", "Ada").await;
    action(router.clone(), &sid, "next").await;
    answer(router.clone(), &sid, "city", "Paris").await;
    action(router.clone(), &sid, "submit").await;
    let writes = store.submission_write_count();

    let (sid, _) = open(&router).await;
    answer(router.clone(), &sid, EMAIL_FIELD, "ada@example.com").await;
    answer(router.clone(), &sid, PASSWORD_FIELD, "other").await;
    let (status, view) = action(router.clone(), &sid, "next").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["data"]["phase"], json!({"state": "already_submitted"}));
    assert_eq!(view["data"]["canGoBack"], false);
    assert_eq!(view["data"]["inputsEnabled"], false);

    let (status, _) = action(router.clone(), &sid, "submit").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.submission_write_count(), writes);
}

// ---------------------------------------------------------------------------
// Test: session lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_returns_current_view() {
    let store = two_page_store().await;
    let router = build_test_app(store.clone());
    let (sid, _) = open(&router).await;
    answer(router.clone(), &sid, EMAIL_FIELD, "ada@example.com").await;

    let response = get(
        router.clone(),
        &format!("/api/v1/wizard/sessions/{sid}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["sessionId"], sid.as_str());
    assert_eq!(json["data"]["email"], "ada@example.com");
}

#[tokio::test]
async fn closed_session_is_gone() {
    let store = two_page_store().await;
    let router = build_test_app(store.clone());
    let (sid, _) = open(&router).await;
    let uri = format!("/api/v1/wizard/sessions/{sid}");

    let response = delete(router.clone(), &uri).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(router.clone(), &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_with_offline_store_returns_503_and_stays_on_step_0() {
    let store = two_page_store().await;
    let router = build_test_app(store.clone());
    let (sid, _) = open(&router).await;

    answer(router.clone(), &sid, EMAIL_FIELD, "ada@example.com").await;
    answer(router.clone(), &sid, PASSWORD_FIELD, "secret").await;

    store.set_offline(true);
    let (status, body) = action(router.clone(), &sid, "next").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "STORE_UNAVAILABLE");

    store.set_offline(false);
    let response = get(router.clone(), &format!("/api/v1/wizard/sessions/{sid}")).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["activeStep"], 0);
}

// ---------------------------------------------------------------------------
// Test: with no pages, a failed final write undoes the login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_submit_without_pages_keeps_session_logged_out() {
    let store = Arc::new(InMemoryGateway::new());
    let session = SessionId::from_email("ada@example.com");
    let draft = Submission {
        last_saved: Some(0),
        ..Default::default()
    };
    store.set_submission(&session, &draft).await.unwrap();

    let router = build_test_app(store.clone());
    let (sid, view) = open(&router).await;
    assert_eq!(view["primaryAction"], "Submit");
    answer(router.clone(), &sid, EMAIL_FIELD, "ada@example.com").await;
    answer(router.clone(), &sid, PASSWORD_FIELD, "secret").await;

    store.set_read_only(true);
    let (status, body) = action(router.clone(), &sid, "submit").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "STORE_UNAVAILABLE");

    let (status, view) = answer(router.clone(), &sid, EMAIL_FIELD, "ada@example.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["data"]["phase"], json!({"state": "logged_out"}));
    assert_eq!(view["data"]["activeStep"], 0);

    store.set_read_only(false);
    let (status, view) = action(router.clone(), &sid, "submit").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["data"]["phase"], json!({"state": "completed"}));
}
