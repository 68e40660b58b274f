//! End-to-end tests for the /chat pipeline
//!
//! Uses an in-memory store and a counting mock assistant so the full
//! gate → filter → analytics → cache → assistant → post-process sequence is
//! exercised hermetically.

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use talentgate::assistant::{AssistantSession, RunOutcome, RunStatus};
use talentgate::config::Config;
use talentgate::error::AppResult;
use talentgate::handlers::{self, AppState};
use talentgate::store::MemoryStore;
use tower::ServiceExt;

/// Mock assistant that counts run invocations and returns a canned reply
struct MockAssistant {
    reply: String,
    outcome_status: RunStatus,
    runs: AtomicUsize,
}

impl MockAssistant {
    fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            outcome_status: RunStatus::Completed,
            runs: AtomicUsize::new(0),
        })
    }

    fn failing(status: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: String::new(),
            outcome_status: RunStatus::Failed(status.to_string()),
            runs: AtomicUsize::new(0),
        })
    }

    fn run_count(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssistantSession for MockAssistant {
    async fn get_or_create_assistant_id(&self) -> AppResult<String> {
        Ok("asst_mock".to_string())
    }

    async fn create_session(&self) -> AppResult<String> {
        Ok("thread_mock".to_string())
    }

    async fn post_user_turn(&self, _session_id: &str, _text: &str) -> AppResult<()> {
        Ok(())
    }

    async fn run_to_completion(
        &self,
        _session_id: &str,
        _assistant_id: &str,
    ) -> AppResult<RunOutcome> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(RunOutcome {
            status: self.outcome_status.clone(),
            reply_text: self.reply.clone(),
        })
    }
}

fn app_with(assistant: Arc<MockAssistant>) -> Router {
    let state = AppState::new(Config::default(), Arc::new(MemoryStore::new()), assistant);
    handlers::router(state)
}

async fn post_chat(app: &Router, message: &str) -> (StatusCode, serde_json::Value) {
    let body = serde_json::json!({ "message": message }).to_string();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/chat")
                .header("content-type", "application/json")
                .header("x-forwarded-for", "203.0.113.7")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_cache_miss_then_hit_invokes_assistant_once() {
    let assistant = MockAssistant::replying("We place engineers and designers.");
    let app = app_with(assistant.clone());

    let (status, first) = post_chat(&app, "What roles do you place?").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["cached"], false);
    assert_eq!(first["success"], true);
    assert_eq!(first["threadId"], "thread_mock");
    assert_eq!(assistant.run_count(), 1);

    let (status, second) = post_chat(&app, "What roles do you place?").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["cached"], true);
    assert_eq!(second["reply"], first["reply"]);
    assert_eq!(assistant.run_count(), 1, "cache hit must skip the assistant");
}

#[tokio::test]
async fn test_normalization_differences_still_hit_cache() {
    let assistant = MockAssistant::replying("Our fee is 20% of first-year salary.");
    let app = app_with(assistant.clone());

    post_chat(&app, "What are your fees?").await;
    let (_, reuse) = post_chat(&app, "  what are your FEES  ").await;
    assert_eq!(reuse["cached"], true);
    assert_eq!(assistant.run_count(), 1);
}

#[tokio::test]
async fn test_reply_is_cleaned_before_caching_and_return() {
    let raw = "Get started【1:0†faq】: - tell us your needs - meet candidates - hire [SCROLL_TO_FORM]";
    let assistant = MockAssistant::replying(raw);
    let app = app_with(assistant);

    let (status, body) = post_chat(&app, "How do I get started with you?").await;
    assert_eq!(status, StatusCode::OK);
    let reply = body["reply"].as_str().unwrap();
    assert!(!reply.contains('【'), "citation markers must be stripped");
    assert!(!reply.contains("[SCROLL_TO_FORM]"), "marker must be stripped");
    assert!(reply.contains("\n- "), "dash list must be reflowed");
    assert_eq!(body["scrollToForm"], true);

    // Cached copy carries the cleaned text and the flag
    let (_, cached) = post_chat(&app, "How do I get started with you?").await;
    assert_eq!(cached["cached"], true);
    assert_eq!(cached["reply"].as_str().unwrap(), reply);
    assert_eq!(cached["scrollToForm"], true);
}

#[tokio::test]
async fn test_failed_run_surfaces_as_generic_500() {
    let assistant = MockAssistant::failing("expired");
    let app = app_with(assistant);

    let (status, body) = post_chat(&app, "What services do you offer?").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    let error = body["error"].as_str().unwrap();
    assert!(
        !error.contains("expired"),
        "upstream detail must not leak: {}",
        error
    );
}

#[tokio::test]
async fn test_provided_thread_id_is_reused() {
    let assistant = MockAssistant::replying("Continuing our chat.");
    let app = app_with(assistant);

    let body = serde_json::json!({
        "message": "What industries do you cover?",
        "threadId": "thread_existing"
    })
    .to_string();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/chat")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["threadId"], "thread_existing");
}

#[tokio::test]
async fn test_response_carries_request_id_header() {
    let assistant = MockAssistant::replying("Hello!");
    let app = app_with(assistant);

    let body = serde_json::json!({ "message": "What do you do?" }).to_string();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/chat")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}
