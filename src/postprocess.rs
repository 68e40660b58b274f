//! Reply post-processing: citation stripping, list reformatting, and the
//! scroll-to-form marker
//!
//! Assistant replies arrive with bracketed source citations (`【4:0†source】`)
//! and occasionally a trailing document filename. Both are noise for chat
//! clients and are removed before the reply is cached or returned.

/// Reserved token the assistant emits when the caller should scroll to the
/// lead-capture form. Stripped from the visible text and surfaced as a flag.
pub const SCROLL_MARKER: &str = "[SCROLL_TO_FORM]";

/// Minimum number of inline " - " separators before a reply is reflowed into
/// a bulleted list
const LIST_SEPARATOR_MIN: usize = 2;

/// Document extensions recognized as trailing citation fragments
const DOC_EXTENSIONS: &[&str] = &[".pdf", ".docx", ".doc", ".txt", ".md"];

/// A cleaned reply plus the extracted scroll flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanReply {
    pub text: String,
    pub scroll_to_form: bool,
}

/// Clean a raw assistant reply for presentation and caching
pub fn clean_reply(raw: &str) -> CleanReply {
    let text = strip_citations(raw);
    let (text, scroll_to_form) = extract_scroll_marker(&text);
    let text = reformat_dash_lists(&text);
    CleanReply {
        text: text.trim().to_string(),
        scroll_to_form,
    }
}

/// Remove `【 … 】` citation spans and any trailing document-filename
/// fragment, collapsing the space runs the removal leaves behind
fn strip_citations(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth: usize = 0;
    for ch in text.chars() {
        match ch {
            '【' => depth += 1,
            '】' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(ch),
            _ => {}
        }
    }
    strip_trailing_filenames(&collapse_spaces(&out))
}

/// Drop whitespace-delimited trailing tokens that look like document names
fn strip_trailing_filenames(text: &str) -> String {
    let mut result = text.trim_end();
    loop {
        let Some(last) = result.split_whitespace().next_back() else {
            break;
        };
        let lowered = last.to_lowercase();
        if DOC_EXTENSIONS.iter().any(|ext| lowered.ends_with(ext)) {
            result = result[..result.len() - last.len()].trim_end();
        } else {
            break;
        }
    }
    result.to_string()
}

/// Collapse runs of spaces into one, preserving line breaks
fn collapse_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_space = false;
    for ch in text.chars() {
        if ch == ' ' {
            if !prev_space {
                out.push(ch);
            }
            prev_space = true;
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out
}

/// Detect and remove the scroll marker, reporting whether it was present
fn extract_scroll_marker(text: &str) -> (String, bool) {
    if text.contains(SCROLL_MARKER) {
        (text.replace(SCROLL_MARKER, ""), true)
    } else {
        (text.to_string(), false)
    }
}

/// Reflow an inline dash-separated list into line-broken bullets when the
/// reply carries at least two separators
fn reformat_dash_lists(text: &str) -> String {
    if text.matches(" - ").count() >= LIST_SEPARATOR_MIN {
        text.replace(" - ", "\n- ")
    } else {
        text.to_string()
    }
}
