#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use survey_api::{config::Config, create_router, services::AppState, store::InMemoryStore};
use tower::ServiceExt;

pub async fn create_test_app() -> Router {
    // Initialize tracing for tests
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let app_state = Arc::new(AppState::with_store(
        Config::in_memory(),
        Arc::new(InMemoryStore::new()),
    ));

    create_router(app_state)
}

/// Sends a request and returns the status with the decoded JSON body
/// (`Value::Null` for empty bodies)
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

pub async fn create_survey(app: &Router, title: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/surveys",
        Some(json!({ "title": title, "description": "Desc" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

/// Creates a question and returns it as JSON
pub async fn create_question(
    app: &Router,
    survey_id: i64,
    text: &str,
    question_type: u8,
    answers: &[(&str, f64)],
) -> Value {
    let answers: Vec<Value> = answers
        .iter()
        .map(|(text, weight)| json!({ "text": text, "weight": weight }))
        .collect();

    let (status, body) = send(
        app,
        "POST",
        "/api/questions",
        Some(json!({
            "surveyId": survey_id,
            "text": text,
            "type": question_type,
            "answers": answers
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

pub fn answer_ids(question: &Value) -> Vec<i64> {
    question["answers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_i64().unwrap())
        .collect()
}
