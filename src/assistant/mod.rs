//! Assistant-session port
//!
//! The gateway's only contract with the conversation backend is this
//! four-call interface: ensure an assistant exists, open a session, post the
//! user's turn, and run the session to completion. Retry policy belongs to
//! the implementation, not to callers.

use crate::error::AppResult;
use async_trait::async_trait;

mod openai;

pub use openai::OpenAiAssistant;

/// Terminal state of an assistant run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    /// Any non-completed terminal status, carrying the backend's status name
    Failed(String),
}

/// Result of running a session to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub status: RunStatus,
    /// Reply text; empty unless `status` is `Completed`
    pub reply_text: String,
}

/// Conversation backend as seen by the request orchestrator
#[async_trait]
pub trait AssistantSession: Send + Sync {
    /// Return the assistant identifier, provisioning one if needed
    async fn get_or_create_assistant_id(&self) -> AppResult<String>;

    /// Open a fresh conversation session and return its identifier
    async fn create_session(&self) -> AppResult<String>;

    /// Append the user's message to a session
    async fn post_user_turn(&self, session_id: &str, text: &str) -> AppResult<()>;

    /// Start a run and poll it until it reaches a terminal state
    async fn run_to_completion(
        &self,
        session_id: &str,
        assistant_id: &str,
    ) -> AppResult<RunOutcome>;
}
