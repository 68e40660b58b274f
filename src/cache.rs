//! Response cache: normalized exact lookup plus fuzzy token-overlap reuse
//!
//! Entries live in an insertion-ordered deque. Order matters twice: fuzzy
//! lookups scan oldest-first so ties resolve deterministically to the oldest
//! qualifying match, and size-bound eviction drops the oldest entry.
//!
//! Expired entries are not swept proactively; they are skipped during lookup
//! and fall out through eviction or key replacement.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A cached answer handed back to the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedReply {
    pub reply: String,
    pub session_id: String,
    pub scroll_to_form: bool,
}

#[derive(Debug)]
struct CacheEntry {
    key: String,
    reply: String,
    session_id: String,
    scroll_to_form: bool,
    created_at: Instant,
}

/// Fuzzy-match response cache with TTL and bounded size
#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    max_entries: usize,
    similarity_threshold: f64,
    entries: Mutex<VecDeque<CacheEntry>>,
}

/// Derive the stable cache key from free-form text: lowercase, trim, strip
/// terminal punctuation, collapse internal whitespace runs
pub fn normalize(question: &str) -> String {
    question
        .to_lowercase()
        .trim()
        .trim_end_matches(['?', '!', '.', ','])
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Token-overlap ratio between two normalized keys
///
/// Only tokens longer than 3 characters count toward the overlap; the
/// denominator is the larger of the two full token counts.
fn similarity(query_tokens: &[&str], candidate_tokens: &[&str]) -> f64 {
    let denominator = query_tokens.len().max(candidate_tokens.len());
    if denominator == 0 {
        return 0.0;
    }
    let common = query_tokens
        .iter()
        .filter(|t| t.chars().count() > 3 && candidate_tokens.contains(t))
        .count();
    common as f64 / denominator as f64
}

impl ResponseCache {
    pub fn new(ttl: Duration, max_entries: usize, similarity_threshold: f64) -> Self {
        Self {
            ttl,
            max_entries,
            similarity_threshold,
            entries: Mutex::new(VecDeque::new()),
        }
    }

    /// Look up a cached reply for `question`, exact match first, then fuzzy
    pub fn lookup(&self, question: &str) -> Option<CachedReply> {
        self.lookup_at(question, Instant::now())
    }

    /// Lookup against an explicit clock; tests drive TTL expiry through this
    pub fn lookup_at(&self, question: &str, now: Instant) -> Option<CachedReply> {
        let key = normalize(question);
        let entries = self.entries.lock().expect("cache mutex poisoned");

        let fresh = |entry: &CacheEntry| now.duration_since(entry.created_at) < self.ttl;

        // Exact match on the normalized key
        if let Some(entry) = entries.iter().find(|e| e.key == key && fresh(e)) {
            tracing::debug!(key = %key, "Cache hit (exact)");
            return Some(reply_of(entry));
        }

        // Fuzzy match: oldest qualifying entry wins
        let query_tokens: Vec<&str> = key.split_whitespace().collect();
        for entry in entries.iter().filter(|e| fresh(e)) {
            let candidate_tokens: Vec<&str> = entry.key.split_whitespace().collect();
            let ratio = similarity(&query_tokens, &candidate_tokens);
            if ratio >= self.similarity_threshold {
                tracing::debug!(
                    key = %key,
                    matched = %entry.key,
                    ratio = ratio,
                    "Cache hit (fuzzy)"
                );
                return Some(reply_of(entry));
            }
        }

        None
    }

    /// Store a reply under the normalized form of `question`
    pub fn store(&self, question: &str, reply: String, session_id: String, scroll_to_form: bool) {
        self.store_at(question, reply, session_id, scroll_to_form, Instant::now());
    }

    pub fn store_at(
        &self,
        question: &str,
        reply: String,
        session_id: String,
        scroll_to_form: bool,
        now: Instant,
    ) {
        let key = normalize(question);
        let mut entries = self.entries.lock().expect("cache mutex poisoned");

        // Re-inserting a key replaces the old entry and refreshes its position
        entries.retain(|e| e.key != key);
        entries.push_back(CacheEntry {
            key,
            reply,
            session_id,
            scroll_to_form,
            created_at: now,
        });

        // Synchronous oldest-first eviction keeps the bound exact
        while entries.len() > self.max_entries {
            if let Some(evicted) = entries.pop_front() {
                tracing::debug!(key = %evicted.key, "Evicted oldest cache entry");
            }
        }
    }

    /// Number of entries currently held (including expired, not yet evicted)
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn reply_of(entry: &CacheEntry) -> CachedReply {
    CachedReply {
        reply: entry.reply.clone(),
        session_id: entry.session_id.clone(),
        scroll_to_form: entry.scroll_to_form,
    }
}
