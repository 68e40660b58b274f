//! OpenAI Assistants implementation of the session port
//!
//! Speaks the threads/runs API over reqwest: create a thread, append the user
//! message, start a run, poll it to a terminal state, then read the newest
//! message back. The base URL is configurable so tests can point at a mock
//! server.

use super::{AssistantSession, RunOutcome, RunStatus};
use crate::config::AssistantConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Environment variable holding the API credential
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Header required by the Assistants API
const BETA_HEADER: (&str, &str) = ("OpenAI-Beta", "assistants=v2");

/// Model used when provisioning a new assistant
const ASSISTANT_MODEL: &str = "gpt-4o-mini";

/// Instructions given to a freshly provisioned assistant
const ASSISTANT_INSTRUCTIONS: &str = "You are a helpful assistant for a recruiting \
services company. Answer questions about services, pricing, industries served, \
and the hiring process concisely and professionally. When a visitor wants to get \
started or leave their contact details, end your reply with the exact token \
[SCROLL_TO_FORM].";

#[derive(Debug, Deserialize)]
struct ApiObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RunObject {
    id: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    data: Vec<MessageObject>,
}

#[derive(Debug, Deserialize)]
struct MessageObject {
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(default)]
    text: Option<TextPart>,
}

#[derive(Debug, Deserialize)]
struct TextPart {
    value: String,
}

/// Assistants-API-backed session collaborator
pub struct OpenAiAssistant {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    configured_assistant_id: Option<String>,
    provisioned_assistant_id: tokio::sync::Mutex<Option<String>>,
    poll_interval: Duration,
    poll_max_attempts: u32,
}

impl OpenAiAssistant {
    /// Build from configuration, reading the API key from the environment
    ///
    /// # Errors
    /// Returns a configuration error when the credential is missing.
    pub fn from_env(config: &AssistantConfig) -> AppResult<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::Config(format!("{} is not set", API_KEY_ENV)))?;
        Ok(Self::new(
            config.base_url.clone(),
            api_key,
            config.assistant_id_override(),
            Duration::from_millis(config.poll_interval_ms),
            config.poll_max_attempts,
        ))
    }

    pub fn new(
        base_url: String,
        api_key: String,
        assistant_id: Option<String>,
        poll_interval: Duration,
        poll_max_attempts: u32,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            configured_assistant_id: assistant_id,
            provisioned_assistant_id: tokio::sync::Mutex::new(None),
            poll_interval,
            poll_max_attempts,
        }
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .header(BETA_HEADER.0, BETA_HEADER.1)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .header(BETA_HEADER.0, BETA_HEADER.1)
    }

    async fn send<T: for<'de> Deserialize<'de>>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> AppResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("{} request failed: {}", what, e)))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(what = what, status = %status, body = %body, "Assistant API error");
            return Err(AppError::Upstream(format!(
                "{} returned status {}",
                what, status
            )));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| AppError::Upstream(format!("{} response parse failed: {}", what, e)))
    }

    async fn provision_assistant(&self) -> AppResult<String> {
        let created: ApiObject = self
            .send(
                self.post("/assistants").json(&json!({
                    "name": "Recruiting Chat Assistant",
                    "model": ASSISTANT_MODEL,
                    "instructions": ASSISTANT_INSTRUCTIONS,
                })),
                "assistant creation",
            )
            .await?;
        tracing::info!(assistant_id = %created.id, "Provisioned assistant");
        Ok(created.id)
    }
}

#[async_trait]
impl AssistantSession for OpenAiAssistant {
    async fn get_or_create_assistant_id(&self) -> AppResult<String> {
        if let Some(id) = &self.configured_assistant_id {
            return Ok(id.clone());
        }
        // Hold the lock across provisioning so concurrent first requests
        // create at most one assistant
        let mut cached = self.provisioned_assistant_id.lock().await;
        if let Some(id) = cached.as_ref() {
            return Ok(id.clone());
        }
        let id = self.provision_assistant().await?;
        *cached = Some(id.clone());
        Ok(id)
    }

    async fn create_session(&self) -> AppResult<String> {
        let thread: ApiObject = self
            .send(self.post("/threads").json(&json!({})), "thread creation")
            .await?;
        Ok(thread.id)
    }

    async fn post_user_turn(&self, session_id: &str, text: &str) -> AppResult<()> {
        let _: serde_json::Value = self
            .send(
                self.post(&format!("/threads/{}/messages", session_id))
                    .json(&json!({"role": "user", "content": text})),
                "message creation",
            )
            .await?;
        Ok(())
    }

    async fn run_to_completion(
        &self,
        session_id: &str,
        assistant_id: &str,
    ) -> AppResult<RunOutcome> {
        let mut run: RunObject = self
            .send(
                self.post(&format!("/threads/{}/runs", session_id))
                    .json(&json!({"assistant_id": assistant_id})),
                "run creation",
            )
            .await?;

        let mut attempts = 0;
        while matches!(run.status.as_str(), "queued" | "in_progress" | "cancelling") {
            attempts += 1;
            if attempts > self.poll_max_attempts {
                return Err(AppError::Upstream(format!(
                    "run {} still {} after {} polls",
                    run.id, run.status, self.poll_max_attempts
                )));
            }
            tokio::time::sleep(self.poll_interval).await;
            run = self
                .send(
                    self.get(&format!("/threads/{}/runs/{}", session_id, run.id)),
                    "run status",
                )
                .await?;
        }

        if run.status != "completed" {
            tracing::warn!(run_id = %run.id, status = %run.status, "Run did not complete");
            return Ok(RunOutcome {
                status: RunStatus::Failed(run.status),
                reply_text: String::new(),
            });
        }

        let messages: MessageList = self
            .send(
                self.get(&format!(
                    "/threads/{}/messages?limit=1&order=desc",
                    session_id
                )),
                "message listing",
            )
            .await?;

        let reply_text = messages
            .data
            .first()
            .and_then(|m| m.content.iter().find_map(|part| part.text.as_ref()))
            .map(|t| t.value.clone())
            .ok_or_else(|| AppError::Upstream("run completed without a text reply".to_string()))?;

        Ok(RunOutcome {
            status: RunStatus::Completed,
            reply_text,
        })
    }
}
