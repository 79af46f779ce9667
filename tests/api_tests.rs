//! End-to-end tests for the HTTP API, driven through the router without
//! binding a socket.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tokio::sync::{Notify, Semaphore};
use tower::ServiceExt;

use zeyu_folio::api::routes::create_router;
use zeyu_folio::config::Config;
use zeyu_folio::error::{FALLBACK_MESSAGE, GenerationError};
use zeyu_folio::llm::TextGenerator;
use zeyu_folio::AppState;

struct FixedGenerator {
    reply: Result<String, GenerationError>,
    calls: AtomicUsize,
}

impl FixedGenerator {
    fn new(reply: Result<String, GenerationError>) -> Arc<Self> {
        Arc::new(Self { reply, calls: AtomicUsize::new(0) })
    }
}

#[async_trait]
impl TextGenerator for FixedGenerator {
    async fn generate(&self, _prompt: &str, _system: Option<&str>) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone()
    }
}

struct GatedGenerator {
    started: Notify,
    gate: Semaphore,
}

#[async_trait]
impl TextGenerator for GatedGenerator {
    async fn generate(&self, _prompt: &str, _system: Option<&str>) -> Result<String, GenerationError> {
        self.started.notify_one();
        self.gate.acquire().await.unwrap().forget();
        Ok("slow answer".to_string())
    }
}

fn test_config(api_key: Option<&str>) -> Config {
    Config::from_lookup(|key| match key {
        "GEMINI_API_KEY" => api_key.map(str::to_string),
        _ => None,
    })
    .unwrap()
}

fn app_with(generator: Arc<dyn TextGenerator>) -> Router {
    create_router(AppState::new(test_config(Some("test-key")), generator))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let (status, raw) = send_raw(app, request).await;
    let json = serde_json::from_str(&raw).unwrap_or(Value::Null);
    (status, json)
}

async fn send_raw(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn new_session(app: &Router) -> String {
    let (status, body) = send(app, "POST", "/api/chat/sessions", None).await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["session_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn site_profile_reports_ai_availability() {
    let generator = FixedGenerator::new(Ok("x".into()));
    let app = create_router(AppState::new(test_config(None), generator));

    let (status, body) = send(&app, "GET", "/api/site", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["status"], "success");
    assert_eq!(body["data"]["brand"], "ZEYU.DESIGN");
    assert_eq!(body["data"]["ai_enabled"], false);
    assert_eq!(body["data"]["navigation"][0]["anchor"], "articles");
}

#[tokio::test]
async fn projects_are_listed() {
    let app = app_with(FixedGenerator::new(Ok("x".into())));

    let (status, body) = send(&app, "GET", "/api/projects", None).await;

    assert_eq!(status, StatusCode::OK);
    let titles: Vec<_> = body["data"].as_array().unwrap().iter().map(|p| p["title"].clone()).collect();
    assert_eq!(titles, [json!("Aurora UI"), json!("ZenTask"), json!("MonoFont")]);
    assert_eq!(body["data"][0]["type"], "开源设计系统");
}

#[tokio::test]
async fn articles_show_static_excerpts_until_summarised() {
    let app = app_with(FixedGenerator::new(Ok("X".into())));

    let (status, body) = send(&app, "GET", "/api/articles", None).await;
    assert_eq!(status, StatusCode::OK);
    let first = &body["data"][0];
    assert_eq!(first["id"], 1);
    assert_eq!(first["display"]["body"]["kind"], "excerpt");
    assert_eq!(first["display"]["body"]["max_lines"], 3);
    assert_eq!(first["display"]["action"], "AI 摘要");

    let (status, body) = send(&app, "POST", "/api/articles/1/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "generated");
    assert_eq!(body["data"]["summary"], "X");

    let (_, body) = send(&app, "GET", "/api/articles/1", None).await;
    assert_eq!(body["data"]["display"]["body"]["kind"], "generated");
    assert_eq!(body["data"]["display"]["body"]["text"], "X");
    assert_eq!(body["data"]["display"]["body"]["badge"], "GEMINI AI");
    assert_eq!(body["data"]["display"]["action"], "重新生成");
}

#[tokio::test]
async fn article_json_has_a_single_excerpt_key() {
    let app = app_with(FixedGenerator::new(Ok("X".into())));
    send(&app, "POST", "/api/articles/1/summary", None).await;

    for uri in ["/api/articles", "/api/articles/1"] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, raw) = send_raw(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        let cards = if uri == "/api/articles" { 3 } else { 1 };
        assert_eq!(raw.matches("\"excerpt\":").count(), cards, "{uri}: {raw}");
    }

    let (_, body) = send(&app, "GET", "/api/articles/1", None).await;
    assert!(body["data"]["excerpt"].is_string());
    assert_eq!(body["data"]["display"]["body"]["kind"], "generated");
}

#[tokio::test]
async fn malformed_summary_body_is_rejected() {
    let generator = FixedGenerator::new(Ok("X".into()));
    let app = app_with(generator.clone());

    let request = Request::builder()
        .method("POST")
        .uri("/api/articles/1/summary")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"regenerate": "yes""#))
        .unwrap();
    let (status, raw) = send_raw(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(body["meta"]["status"], "error");

    let request = Request::builder()
        .method("POST")
        .uri("/api/articles/1/summary")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"regenerate": "yes"}"#))
        .unwrap();
    let (status, _) = send_raw(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn repeated_summary_request_is_served_from_cache() {
    let generator = FixedGenerator::new(Ok("X".into()));
    let app = app_with(generator.clone());

    send(&app, "POST", "/api/articles/2/summary", Some(json!({}))).await;
    let (_, body) = send(&app, "POST", "/api/articles/2/summary", Some(json!({}))).await;
    assert_eq!(body["data"]["status"], "cached");
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);

    let (_, body) = send(&app, "POST", "/api/articles/2/summary", Some(json!({ "regenerate": true }))).await;
    assert_eq!(body["data"]["status"], "generated");
    assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn unknown_article_is_not_found() {
    let app = app_with(FixedGenerator::new(Ok("x".into())));

    let (status, body) = send(&app, "POST", "/api/articles/42/summary", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["meta"]["status"], "error");
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn chat_round_trip_appends_user_then_assistant() {
    let app = app_with(FixedGenerator::new(Ok("极简是一种克制。".into())));
    let id = new_session(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/chat/sessions/{id}/messages"),
        Some(json!({ "text": "什么是极简？" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let transcript = body["data"]["chat"]["transcript"].as_array().unwrap();
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript[1], json!({ "role": "user", "text": "什么是极简？" }));
    assert_eq!(transcript[2], json!({ "role": "assistant", "text": "极简是一种克制。" }));
    assert_eq!(body["data"]["chat"]["scroll_to"], 2);
    assert_eq!(body["data"]["chat"]["input_enabled"], true);
}

#[tokio::test]
async fn chat_failure_shows_fallback() {
    let app = app_with(FixedGenerator::new(Err(GenerationError::Transport("down".into()))));
    let id = new_session(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/chat/sessions/{id}/messages"),
        Some(json!({ "text": "你好" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let transcript = body["data"]["chat"]["transcript"].as_array().unwrap();
    assert_eq!(
        transcript.last().unwrap(),
        &json!({ "role": "assistant", "text": FALLBACK_MESSAGE })
    );
}

#[tokio::test]
async fn blank_chat_message_is_rejected() {
    let generator = FixedGenerator::new(Ok("x".into()));
    let app = app_with(generator.clone());
    let id = new_session(&app).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/chat/sessions/{id}/messages"),
        Some(json!({ "text": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);

    let (_, body) = send(&app, "GET", &format!("/api/chat/sessions/{id}"), None).await;
    assert_eq!(body["data"]["chat"]["transcript"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn chat_message_while_awaiting_is_a_conflict() {
    let generator = Arc::new(GatedGenerator {
        started: Notify::new(),
        gate: Semaphore::new(0),
    });
    let app = app_with(generator.clone());
    let id = new_session(&app).await;
    let uri = format!("/api/chat/sessions/{id}/messages");

    let first = {
        let app = app.clone();
        let uri = uri.clone();
        tokio::spawn(async move { send(&app, "POST", &uri, Some(json!({ "text": "one" }))).await })
    };
    generator.started.notified().await;

    let (status, body) = send(&app, "POST", &uri, Some(json!({ "text": "two" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["meta"]["status_code"], 409);

    let (_, body) = send(&app, "GET", &format!("/api/chat/sessions/{id}"), None).await;
    assert_eq!(body["data"]["chat"]["awaiting_response"], true);
    assert_eq!(body["data"]["chat"]["input_enabled"], false);

    generator.gate.add_permits(1);
    let (status, body) = first.await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["chat"]["transcript"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let app = app_with(FixedGenerator::new(Ok("x".into())));

    let (status, _) = send(
        &app,
        "GET",
        "/api/chat/sessions/00000000-0000-0000-0000-000000000000",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn panel_toggles_and_scrolls_to_latest() {
    let app = app_with(FixedGenerator::new(Ok("x".into())));
    let id = new_session(&app).await;
    let uri = format!("/api/chat/sessions/{id}/panel");

    let (_, body) = send(&app, "POST", &uri, Some(json!({}))).await;
    assert_eq!(body["data"]["chat"]["panel_open"], true);
    assert_eq!(body["data"]["chat"]["scroll_to"], 0);

    let (_, body) = send(&app, "POST", &uri, Some(json!({ "open": false }))).await;
    assert_eq!(body["data"]["chat"]["panel_open"], false);
}

#[tokio::test]
async fn newsletter_is_accepted_but_not_stored() {
    let app = app_with(FixedGenerator::new(Ok("x".into())));

    let (status, body) = send(
        &app,
        "POST",
        "/api/newsletter",
        Some(json!({ "email": "your@email.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["data"]["subscribed"], false);
    assert_eq!(body["data"]["email"], "your@email.com");
}
