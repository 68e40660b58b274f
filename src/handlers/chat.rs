//! Chat endpoint: the request-gating and response-reuse pipeline
//!
//! Sequence per request: IP gate, content filter, analytics recording
//! (best-effort), cache lookup, and only on a miss the assistant round trip
//! followed by reply cleanup and a cache store. Security and validation
//! failures short-circuit before any analytics write or assistant call.

use crate::assistant::RunStatus;
use crate::error::{AppError, AppResult};
use crate::filter::{self, ValidationResult};
use crate::gate::client_key;
use crate::handlers::AppState;
use crate::middleware::RequestId;
use crate::postprocess;
use axum::{
    Extension, Json,
    extract::{FromRequestParts, State, connect_info::ConnectInfo},
    http::{HeaderMap, request::Parts},
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::net::SocketAddr;

/// Chat request from client
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    /// Existing conversation to continue; a fresh session is opened when absent
    #[serde(default)]
    pub thread_id: Option<String>,
}

/// Chat response to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub reply: String,
    pub thread_id: String,
    pub scroll_to_form: bool,
    /// Whether the reply was served from the response cache
    pub cached: bool,
    pub success: bool,
}

/// Remote peer address, when the server was started with connect info
///
/// Unlike `ConnectInfo` this extractor never rejects, so handlers stay
/// testable through `oneshot` without socket plumbing.
#[derive(Debug, Clone, Copy)]
pub struct ClientAddr(pub Option<SocketAddr>);

impl<S> FromRequestParts<S> for ClientAddr
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| ci.0),
        ))
    }
}

/// POST /chat handler
pub async fn handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    addr: ClientAddr,
    headers: HeaderMap,
    Json(request): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    let forwarded_for = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok());
    let client = client_key(forwarded_for, addr.0);

    let admission = state.gate().check(&client);
    if !admission.allowed {
        tracing::info!(
            request_id = %request_id,
            client = %client,
            banned = admission.banned,
            "Request rejected by IP gate"
        );
        return Err(if admission.banned {
            AppError::Banned
        } else {
            AppError::RateLimited
        });
    }

    let max_chars = state.config().limits.max_message_chars;
    match filter::validate(&request.message, max_chars) {
        ValidationResult::Ok => {}
        ValidationResult::Malformed => {
            return Err(AppError::Validation("message is required".to_string()));
        }
        ValidationResult::TooLong => {
            return Err(AppError::Validation(format!(
                "message exceeds maximum length of {} characters",
                max_chars
            )));
        }
        ValidationResult::InjectionSuspected => return Err(AppError::InjectionSuspected),
    }

    // Best-effort; logs and swallows storage failures internally
    state.recorder().record(&request.message).await;

    if let Some(hit) = state.cache().lookup(&request.message) {
        tracing::info!(
            request_id = %request_id,
            thread_id = %hit.session_id,
            "Serving cached reply"
        );
        return Ok(Json(ChatResponse {
            reply: hit.reply,
            thread_id: hit.session_id,
            scroll_to_form: hit.scroll_to_form,
            cached: true,
            success: true,
        }));
    }

    let assistant_id = state.assistant().get_or_create_assistant_id().await?;
    let session_id = match request.thread_id.as_deref() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => state.assistant().create_session().await?,
    };

    state
        .assistant()
        .post_user_turn(&session_id, &request.message)
        .await?;
    let outcome = state
        .assistant()
        .run_to_completion(&session_id, &assistant_id)
        .await?;

    let reply_text = match outcome.status {
        RunStatus::Completed => outcome.reply_text,
        RunStatus::Failed(status) => {
            return Err(AppError::Upstream(format!(
                "assistant run ended with status {}",
                status
            )));
        }
    };

    let cleaned = postprocess::clean_reply(&reply_text);
    state.cache().store(
        &request.message,
        cleaned.text.clone(),
        session_id.clone(),
        cleaned.scroll_to_form,
    );

    tracing::info!(
        request_id = %request_id,
        thread_id = %session_id,
        reply_length = cleaned.text.len(),
        "Assistant reply delivered"
    );

    Ok(Json(ChatResponse {
        reply: cleaned.text,
        thread_id: session_id,
        scroll_to_form: cleaned.scroll_to_form,
        cached: false,
        success: true,
    }))
}
