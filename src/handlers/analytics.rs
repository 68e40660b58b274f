//! Analytics listing endpoint
//!
//! Read-only, best-effort view over the stored question events. Discovery is
//! a bounded prefix scan, not an indexed query; the `note` field reports
//! truncation. Store failures degrade to an empty listing instead of an
//! error, matching the rule that storage never fails a request.

use crate::analytics::AnalyticsEvent;
use crate::cache::normalize;
use crate::handlers::AppState;
use axum::{Json, extract::State};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub success: bool,
    pub total_questions: usize,
    pub unique_questions: usize,
    pub questions: Vec<AnalyticsEvent>,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// GET /analytics handler
pub async fn handler(State(state): State<AppState>) -> Json<AnalyticsResponse> {
    let prefix = format!("{}:question:", state.config().analytics.key_prefix);
    let limit = state.config().analytics.scan_limit;

    let (entries, truncated) = match state.store().scan_prefix(&prefix, limit).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "Analytics scan failed, returning empty listing");
            return Json(AnalyticsResponse {
                success: true,
                total_questions: 0,
                unique_questions: 0,
                questions: Vec::new(),
                timestamp: Utc::now().to_rfc3339(),
                note: Some("analytics temporarily unavailable".to_string()),
            });
        }
    };

    let questions: Vec<AnalyticsEvent> = entries
        .into_iter()
        .filter_map(|(key, value)| match serde_json::from_value(value) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Skipping malformed analytics event");
                None
            }
        })
        .collect();

    let unique_questions = questions
        .iter()
        .map(|event| normalize(&event.question))
        .collect::<HashSet<_>>()
        .len();

    Json(AnalyticsResponse {
        success: true,
        total_questions: questions.len(),
        unique_questions,
        questions,
        timestamp: Utc::now().to_rfc3339(),
        note: truncated.then(|| format!("partial data: scan truncated at {} events", limit)),
    })
}
