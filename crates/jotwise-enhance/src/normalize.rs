//! Whitespace canonicalization of stripped text.
//!
//! Normalizing an already normalized document changes nothing.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::rules::{apply_all, TextRule};

/// The normalization steps, in the order they must run.
pub const NORMALIZE_STEPS: &[TextRule] = &[
    TextRule {
        name: "unescape_newlines",
        apply: unescape_newlines,
    },
    TextRule {
        name: "unify_line_breaks",
        apply: unify_line_breaks,
    },
    TextRule {
        name: "collapse_blank_lines",
        apply: collapse_blank_lines,
    },
    TextRule {
        name: "trim_before_newline",
        apply: trim_before_newline,
    },
    TextRule {
        name: "trim_after_newline",
        apply: trim_after_newline,
    },
    TextRule {
        name: "collapse_spaces",
        apply: collapse_spaces,
    },
    TextRule {
        name: "strip_line_indent",
        apply: strip_line_indent,
    },
    TextRule {
        name: "trim_document",
        apply: trim_document,
    },
];

static BLANK_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n(?:[^\S\n]*\n){2,}").expect("valid blank run regex"));

static SPACES_BEFORE_NEWLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" +\n").expect("valid trailing space regex"));

static SPACES_AFTER_NEWLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n +").expect("valid leading space regex"));

static SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").expect("valid space regex"));

static LINE_INDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[^\S\n]+").expect("valid indent regex"));

/// Run every step in order.
pub fn normalize(text: &str) -> String {
    apply_all(NORMALIZE_STEPS, "normalize", text)
}

/// Turn the two-character escape `\n` into a real line break.
pub fn unescape_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}

pub fn unify_line_breaks(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Three or more line breaks (blank lines may hold stray spaces or tabs)
/// become exactly one blank line.
pub fn collapse_blank_lines(text: &str) -> String {
    BLANK_RUN.replace_all(text, "\n\n").into_owned()
}

pub fn trim_before_newline(text: &str) -> String {
    SPACES_BEFORE_NEWLINE.replace_all(text, "\n").into_owned()
}

pub fn trim_after_newline(text: &str) -> String {
    SPACES_AFTER_NEWLINE.replace_all(text, "\n").into_owned()
}

pub fn collapse_spaces(text: &str) -> String {
    SPACE_RUN.replace_all(text, " ").into_owned()
}

/// Remove horizontal whitespace at the start of every line. Blank lines
/// themselves are kept.
pub fn strip_line_indent(text: &str) -> String {
    LINE_INDENT.replace_all(text, "").into_owned()
}

pub fn trim_document(text: &str) -> String {
    text.trim().to_string()
}
