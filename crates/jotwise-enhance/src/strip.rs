//! Removal of transport framing from an accumulated completion.
//!
//! The data stream interleaves the generated text with framing: a leading
//! `f:{...}` record, one `<index>:"<escaped text>"` part per text segment,
//! and trailing `e:{...}`/`d:{...}` records carrying the finish reason.
//! The rules below run in a fixed order; each later rule assumes the
//! artifacts handled by the earlier ones are already gone.
//!
//! A `3:"<message>"` line reports a generation failure. It is not text:
//! [`stream_error`] finds it so the completion can be rejected before
//! any rule runs.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::rules::{apply_all, TextRule};

/// The stripping rules, in the order they must run.
pub const STRIP_RULES: &[TextRule] = &[
    TextRule {
        name: "leading_metadata",
        apply: strip_leading_metadata,
    },
    TextRule {
        name: "trailing_metadata",
        apply: strip_trailing_metadata,
    },
    TextRule {
        name: "segment_framing",
        apply: unwrap_segments,
    },
    TextRule {
        name: "bare_prefixes",
        apply: strip_bare_prefixes,
    },
    TextRule {
        name: "dangling_quotes",
        apply: strip_dangling_quotes,
    },
];

static LEADING_METADATA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^f:\{.*?\}\s*").expect("valid leading metadata regex"));

static TRAILING_METADATA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\s*[ed]:\{[\s\S]*?"finishReason"[\s\S]*?\}\s*$"#)
        .expect("valid trailing metadata regex")
});

/// Candidate segment openers. The word boundary in front of the index is
/// checked separately so that it follows ASCII word rules.
static SEGMENT_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[0-9]+:""#).expect("valid segment regex"));

static BARE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[0-9]+:"?"#).expect("valid prefix regex"));

static DANGLING_QUOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)"\s*$"#).expect("valid quote regex"));

static ERROR_PART: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^3:("(?:[^"\\]|\\.)*")[ \t\r]*$"#).expect("valid error part regex")
});

/// Message carried by the first `3:` error part on a line of its own.
pub fn stream_error(raw: &str) -> Option<String> {
    ERROR_PART
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .find_map(|m| serde_json::from_str::<String>(m.as_str()).ok())
}

/// Run every rule in order.
pub fn strip_artifacts(raw: &str) -> String {
    apply_all(STRIP_RULES, "strip", raw)
}

/// Rule 1: drop one `f:{...}` record at the very start, plus trailing
/// whitespace.
pub fn strip_leading_metadata(text: &str) -> String {
    LEADING_METADATA.replace(text, "").into_owned()
}

/// Rule 2: drop one `e:{...}`/`d:{...}` run mentioning `"finishReason"`
/// that extends to the end of the text.
pub fn strip_trailing_metadata(text: &str) -> String {
    TRAILING_METADATA.replace(text, "").into_owned()
}

/// Rule 3: replace every `<index>:"<text>"` part with its text and a
/// line break.
///
/// A part's body is the shortest run ending in a `"` that is followed by
/// optional whitespace and then either the next part opener or the end of
/// the text. The whitespace between parts is dropped. No line break is
/// added when the body already ends with one, literal or escaped.
pub fn unwrap_segments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut copied_to = 0;
    let mut search_from = 0;

    while let Some(open) = SEGMENT_OPEN.find_at(text, search_from) {
        if !at_word_boundary(text, open.start()) {
            search_from = open.end();
            continue;
        }

        match find_segment_close(text, open.end()) {
            Some((body_end, next_start)) => {
                let body = &text[open.end()..body_end];
                out.push_str(&text[copied_to..open.start()]);
                out.push_str(body);
                if !ends_with_line_break(body) {
                    out.push('\n');
                }
                copied_to = next_start;
                search_from = next_start;
            }
            // Unterminated part; the bare-prefix rule cleans it up
            None => search_from = open.end(),
        }
    }

    out.push_str(&text[copied_to..]);
    out
}

/// Rule 4: drop any `<index>:` or `<index>:"` left behind by malformed or
/// truncated parts.
pub fn strip_bare_prefixes(text: &str) -> String {
    BARE_PREFIX
        .replace_all(text, |caps: &Captures| match caps.get(0) {
            Some(m) if at_word_boundary(text, m.start()) => String::new(),
            Some(m) => m.as_str().to_string(),
            None => String::new(),
        })
        .into_owned()
}

/// Rule 5: drop a `"` left dangling at the end of a line.
pub fn strip_dangling_quotes(text: &str) -> String {
    DANGLING_QUOTE.replace_all(text, "").into_owned()
}

/// Find the closing quote of a part whose body starts at `body_start`.
/// Returns the body end and the offset where the following part (or the
/// end of the text) begins.
fn find_segment_close(text: &str, body_start: usize) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut pos = body_start;

    while let Some(offset) = text[pos..].find('"') {
        let quote = pos + offset;
        let after_ws = skip_whitespace(text, quote + 1);
        if after_ws == bytes.len() || starts_segment(&text[after_ws..]) {
            return Some((quote, after_ws));
        }
        pos = quote + 1;
    }
    None
}

fn skip_whitespace(text: &str, from: usize) -> usize {
    text[from..]
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map(|(i, _)| from + i)
        .unwrap_or(text.len())
}

/// Whether `rest` begins with `<digits>:"`.
fn starts_segment(rest: &str) -> bool {
    let digits = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    digits > 0 && rest[digits..].starts_with(":\"")
}

/// ASCII word boundary before `pos`, where the char at `pos` is a digit.
fn at_word_boundary(text: &str, pos: usize) -> bool {
    match text[..pos].chars().next_back() {
        Some(c) => !(c.is_ascii_alphanumeric() || c == '_'),
        None => true,
    }
}

fn ends_with_line_break(body: &str) -> bool {
    body.ends_with('\n') || body.ends_with("\\n")
}
