//! services/api/tests/rest_tests.rs
//!
//! Endpoint tests that drive the axum router directly, covering the JSON
//! wire shapes and the 400 mappings for missing bodies and unknown sessions.

mod common;

use api_lib::web::rest;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use common::{app_state, ScriptedModel, STRUCTURED_REPLY};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

async fn body_string(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

fn ask_request(chat_id: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/chat/{chat_id}/ask"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .unwrap()
}

#[tokio::test]
async fn start_endpoint_returns_a_session_id() {
    let router = rest::api_router(Arc::new(app_state(ScriptedModel::new(vec![], vec![]), false)));

    let response = router
        .oneshot(Request::get("/chat/start").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let chat_id = body["ChatId"].as_str().unwrap();
    assert_eq!(chat_id.len(), 7);
    assert!(chat_id.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[tokio::test]
async fn ask_without_a_body_is_a_bad_request() {
    let router = rest::api_router(Arc::new(app_state(ScriptedModel::new(vec![], vec![]), false)));

    let response = router
        .oneshot(ask_request("abcdefg", Body::empty()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_string(response).await,
        "Invalid request, missing ask object"
    );
}

#[tokio::test]
async fn ask_for_an_unknown_session_is_a_bad_request() {
    let router = rest::api_router(Arc::new(app_state(ScriptedModel::new(vec![], vec![]), false)));

    let response = router
        .oneshot(ask_request("zzzzzzz", Body::from(r#"{"Input":"hello"}"#)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(response).await.contains("not found"));
}

#[tokio::test]
async fn full_turn_over_the_router_returns_enriched_messages() {
    let state = app_state(
        ScriptedModel::new(
            vec![Ok("NONE".to_string())],
            vec![Ok(STRUCTURED_REPLY.to_string())],
        ),
        false,
    );
    let router = rest::api_router(Arc::new(state));

    let started = router
        .clone()
        .oneshot(Request::get("/chat/start").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let chat_id = body_json(started).await["ChatId"].as_str().unwrap().to_string();

    let response = router
        .oneshot(ask_request(
            &chat_id,
            Body::from(r#"{"Input":"find inception"}"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["FunnyFact"].is_null());

    let messages = body["Messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[0]["text"], "find inception");
    assert_eq!(messages[1]["role"], "assistant");
    assert_eq!(messages[1]["text"], "Here you go");
    assert_eq!(messages[1]["movieList"][0]["Id"], "27205");
    assert_eq!(messages[1]["movieList"][0]["ImdbId"], "tt1375666");
}
