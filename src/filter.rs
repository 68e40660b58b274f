//! Content filter: message shape checks and prompt-injection screening
//!
//! Checks run in a fixed order: shape, length, then an ordered table of
//! case-insensitive injection patterns evaluated first-match-wins. The table
//! order is part of the contract; diagnostics report the rule that fired.

/// Outcome of validating an inbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationResult {
    Ok,
    /// Empty or whitespace-only message
    Malformed,
    /// Message exceeds the configured character limit
    TooLong,
    /// Message matched a prompt-injection pattern
    InjectionSuspected,
}

/// Ordered prompt-injection patterns, matched case-insensitively as
/// substrings. Covers instruction-override phrasing, system-message
/// impersonation, and system-prompt extraction attempts.
const INJECTION_PATTERNS: &[&str] = &[
    "ignore previous instructions",
    "ignore all previous",
    "ignore your instructions",
    "disregard previous",
    "disregard all prior",
    "forget your instructions",
    "forget everything above",
    "new instructions:",
    "you are now",
    "act as if you",
    "pretend to be",
    "pretend you are",
    "system prompt",
    "system message",
    "your instructions are",
    "reveal your prompt",
    "repeat your instructions",
    "repeat the text above",
    "developer mode",
    "jailbreak",
];

/// How many characters of a blocked message appear in diagnostics
const LOG_PREVIEW_CHARS: usize = 100;

/// Validate a chat message against shape, length, and injection rules
pub fn validate(message: &str, max_chars: usize) -> ValidationResult {
    if message.trim().is_empty() {
        return ValidationResult::Malformed;
    }

    // Count Unicode characters, not bytes
    if message.chars().count() > max_chars {
        tracing::info!(
            length = message.chars().count(),
            max = max_chars,
            "Rejected over-length message"
        );
        return ValidationResult::TooLong;
    }

    let lowered = message.to_lowercase();
    for pattern in INJECTION_PATTERNS {
        if lowered.contains(pattern) {
            tracing::warn!(
                pattern = pattern,
                preview = %preview(message),
                "Blocked suspected prompt injection"
            );
            return ValidationResult::InjectionSuspected;
        }
    }

    ValidationResult::Ok
}

/// First ~100 characters of a message, for bounded log volume
fn preview(message: &str) -> String {
    message.chars().take(LOG_PREVIEW_CHARS).collect()
}
