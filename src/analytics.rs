//! Analytics recorder: classify accepted questions and persist them
//!
//! Recording is best-effort by contract. A pre-filter drops conversational
//! filler so the stored events are actual questions; storage failures are
//! logged and swallowed so analytics can never fail the parent request.

use crate::classify;
use crate::store::KvStore;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Expiry applied to every stored event (2 years)
const EVENT_TTL: Duration = Duration::from_secs(2 * 365 * 24 * 60 * 60);

/// Inputs shorter than this are never questions
const MIN_QUESTION_CHARS: usize = 5;

/// Conversational filler rejected by exact match
const FILLER: &[&str] = &[
    "thanks",
    "thank you",
    "thx",
    "ok",
    "okay",
    "yes",
    "no",
    "yeah",
    "yep",
    "nope",
    "hi",
    "hello",
    "hey",
    "bye",
    "goodbye",
    "sure",
    "cool",
    "great",
    "nice",
    "good",
    "fine",
    "got it",
    "sounds good",
];

/// Interrogatives matched as whole tokens
const INTERROGATIVES: &[&str] = &[
    "what", "how", "when", "where", "why", "who", "which", "can", "could", "do", "does", "is",
    "are", "will", "would", "should",
];

/// Domain terms matched as substrings
const DOMAIN_KEYWORDS: &[&str] = &[
    "recruit",
    "hire",
    "hiring",
    "job",
    "candidate",
    "staff",
    "salary",
    "position",
    "resume",
    "interview",
    "cost",
    "price",
    "fee",
    "service",
];

/// One persisted question event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub question: String,
    pub category: String,
    pub icon: String,
    pub timestamp: String,
}

/// Decide whether a message is an actual question worth recording
pub fn is_actual_question(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_QUESTION_CHARS {
        return false;
    }

    let lowered = trimmed.to_lowercase();
    if FILLER.contains(&lowered.as_str()) {
        return false;
    }

    // Bare numeric answers ("120000", "2024") are replies, not questions
    if lowered.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    if lowered.contains('?') {
        return true;
    }

    let has_interrogative = lowered
        .split_whitespace()
        .any(|token| INTERROGATIVES.contains(&token));
    has_interrogative || DOMAIN_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

/// Best-effort recorder writing classified events to the external store
pub struct AnalyticsRecorder {
    store: Arc<dyn KvStore>,
    key_prefix: String,
    last_key_millis: std::sync::Mutex<i64>,
}

impl AnalyticsRecorder {
    pub fn new(store: Arc<dyn KvStore>, key_prefix: String) -> Self {
        Self {
            store,
            key_prefix,
            last_key_millis: std::sync::Mutex::new(0),
        }
    }

    /// Millisecond timestamp for the event key, bumped when two events land
    /// in the same millisecond so keys stay unique
    fn next_key_millis(&self, now_millis: i64) -> i64 {
        let mut last = self.last_key_millis.lock().expect("recorder mutex poisoned");
        let millis = now_millis.max(*last + 1);
        *last = millis;
        millis
    }

    /// Record `question` if it passes the pre-filter. Never fails: storage
    /// errors are logged and dropped.
    pub async fn record(&self, question: &str) {
        if !is_actual_question(question) {
            tracing::debug!("Skipping non-question message");
            return;
        }

        let category = classify::classify(question);
        let now = Utc::now();
        let key = format!(
            "{}:question:{}",
            self.key_prefix,
            self.next_key_millis(now.timestamp_millis())
        );
        let event = AnalyticsEvent {
            question: question.to_string(),
            category: category.name.to_string(),
            icon: category.icon.to_string(),
            timestamp: now.to_rfc3339(),
        };

        let value = match serde_json::to_value(&event) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize analytics event (non-fatal)");
                return;
            }
        };

        if let Err(e) = self.store.set(&key, value, EVENT_TTL).await {
            tracing::warn!(
                error = %e,
                category = category.name,
                "Failed to persist analytics event (non-fatal)"
            );
        } else {
            tracing::debug!(category = category.name, "Recorded question");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{KvStore, MemoryStore};

    #[test]
    fn test_short_inputs_are_not_questions() {
        assert!(!is_actual_question("hi"));
        assert!(!is_actual_question("ok"));
        assert!(!is_actual_question("a?"));
    }

    #[test]
    fn test_filler_is_not_a_question() {
        assert!(!is_actual_question("thanks"));
        assert!(!is_actual_question("Thank you"));
        assert!(!is_actual_question("sounds good"));
    }

    #[test]
    fn test_bare_numbers_are_not_questions() {
        assert!(!is_actual_question("120000"));
        assert!(!is_actual_question("20245"));
    }

    #[test]
    fn test_question_mark_accepts() {
        assert!(is_actual_question("pineapple on pizza?"));
    }

    #[test]
    fn test_interrogative_accepts_without_question_mark() {
        assert!(is_actual_question("how does this work"));
        assert!(is_actual_question("what are your fees"));
    }

    #[test]
    fn test_domain_keyword_accepts() {
        assert!(is_actual_question("tell me about your recruiting services"));
    }

    #[test]
    fn test_plain_statement_is_rejected() {
        assert!(!is_actual_question("sounds perfect, talk soon"));
    }

    #[tokio::test]
    async fn test_record_persists_classified_event() {
        let store = Arc::new(MemoryStore::new());
        let recorder = AnalyticsRecorder::new(store.clone(), "test".to_string());

        recorder.record("How much does it cost?").await;

        let (entries, truncated) = store
            .scan_prefix("test:question:", 10)
            .await
            .expect("scan should succeed");
        assert!(!truncated);
        assert_eq!(entries.len(), 1);
        let event: AnalyticsEvent =
            serde_json::from_value(entries[0].1.clone()).expect("event should deserialize");
        assert_eq!(event.question, "How much does it cost?");
        assert_eq!(event.category, "Pricing / Fees");
        assert_eq!(event.icon, "💰");
    }

    #[tokio::test]
    async fn test_record_skips_filler_entirely() {
        let store = Arc::new(MemoryStore::new());
        let recorder = AnalyticsRecorder::new(store.clone(), "test".to_string());

        recorder.record("thanks").await;

        let (entries, _) = store
            .scan_prefix("test:", 10)
            .await
            .expect("scan should succeed");
        assert!(entries.is_empty(), "filler must not be persisted");
    }
}
