//! Turning an accumulated completion into a validated document.

use std::convert::Infallible;

use thiserror::Error;
use tracing::{debug, trace};

use jotwise_core::Section;

use crate::normalize::normalize;
use crate::strip::{stream_error, strip_artifacts};
use crate::validate::validate;

/// Why an accumulated completion could not be turned into a document.
///
/// The messages stay internal; users only ever see a generic notice.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CleaningFailure {
    #[error("completion was empty")]
    EmptyResponse,

    #[error("generation failed mid-stream: {0}")]
    StreamError(String),

    #[error("nothing left after removing framing")]
    EmptyAfterCleaning,

    #[error("missing sections: {0:?}")]
    MissingSections(Vec<Section>),
}

/// A cleaned enhancement containing all three sections.
///
/// Only [`extract`] constructs one, so holding a `CleanedDocument` means
/// validation passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedDocument {
    text: String,
    bodies: [String; 3],
}

impl CleanedDocument {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Body text under a section's header, without the header line.
    pub fn section(&self, section: Section) -> &str {
        let idx = Section::ALL
            .iter()
            .position(|s| *s == section)
            .unwrap_or_default();
        &self.bodies[idx]
    }

    pub(crate) fn from_validated(text: String) -> Self {
        let bodies = section_bodies(&text);
        Self { text, bodies }
    }
}

impl std::fmt::Display for CleanedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Cleaning stage about to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleaningStage {
    Stripping,
    Normalizing,
    Validating,
}

/// Strip, normalize and validate a raw completion.
pub fn extract(raw: &str) -> std::result::Result<CleanedDocument, CleaningFailure> {
    match extract_staged(raw, |_| Ok::<(), Infallible>(())) {
        Ok(cleaned) => cleaned,
        Err(never) => match never {},
    }
}

/// [`extract`], calling `enter` before each stage runs. An error from
/// `enter` stops cleaning and is returned as the outer error.
pub fn extract_staged<E>(
    raw: &str,
    mut enter: impl FnMut(CleaningStage) -> std::result::Result<(), E>,
) -> std::result::Result<std::result::Result<CleanedDocument, CleaningFailure>, E> {
    if raw.trim().is_empty() {
        return Ok(Err(CleaningFailure::EmptyResponse));
    }
    trace!(subsystem = "enhance", component = "extract", raw = %raw, "Raw completion");

    if let Some(message) = stream_error(raw) {
        debug!(
            subsystem = "enhance",
            component = "extract",
            error = %message,
            "Completion carries an error part"
        );
        return Ok(Err(CleaningFailure::StreamError(message)));
    }

    enter(CleaningStage::Stripping)?;
    let stripped = strip_artifacts(raw);

    enter(CleaningStage::Normalizing)?;
    let normalized = normalize(&stripped);
    if normalized.is_empty() {
        debug!(
            subsystem = "enhance",
            component = "extract",
            response_len = raw.len(),
            "Completion empty after cleaning"
        );
        return Ok(Err(CleaningFailure::EmptyAfterCleaning));
    }

    enter(CleaningStage::Validating)?;
    let missing = validate(&normalized);
    if !missing.is_empty() {
        debug!(
            subsystem = "enhance",
            component = "extract",
            missing = ?missing,
            "Completion missing sections"
        );
        return Ok(Err(CleaningFailure::MissingSections(missing)));
    }

    debug!(
        subsystem = "enhance",
        component = "extract",
        response_len = raw.len(),
        cleaned_len = normalized.len(),
        "Completion cleaned"
    );
    trace!(subsystem = "enhance", component = "extract", cleaned = %normalized, "Cleaned completion");

    Ok(Ok(CleanedDocument::from_validated(normalized)))
}

/// String-level form of [`extract`]: the cleaned text, or an empty string
/// when cleaning failed.
pub fn extract_and_clean(raw: &str) -> String {
    extract(raw).map(CleanedDocument::into_string).unwrap_or_default()
}

/// Byte range of the line holding a section's header. A line where the
/// marker is followed by `:` wins over a bare mention of the word.
fn header_line(text: &str, section: Section) -> Option<(usize, usize)> {
    let marker = section.marker();
    let mut fallback = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        if let Some(pos) = line.find(marker) {
            let line_end = offset + line.len();
            if line[pos + marker.len()..].starts_with(':') {
                return Some((offset, line_end));
            }
            fallback.get_or_insert((offset, line_end));
        }
        offset += line.len();
    }
    fallback
}

fn section_bodies(text: &str) -> [String; 3] {
    let mut headers: Vec<(Section, usize, usize)> = Section::ALL
        .iter()
        .filter_map(|s| header_line(text, *s).map(|(start, end)| (*s, start, end)))
        .collect();
    headers.sort_by_key(|(_, start, _)| *start);

    let mut bodies: [String; 3] = Default::default();
    for (i, (section, _, body_start)) in headers.iter().enumerate() {
        let body_end = headers
            .get(i + 1)
            .map(|(_, next_start, _)| *next_start)
            .unwrap_or(text.len());
        let body = text
            .get(*body_start..body_end.max(*body_start))
            .unwrap_or_default()
            .trim();
        let idx = Section::ALL
            .iter()
            .position(|s| s == section)
            .unwrap_or_default();
        bodies[idx] = body.to_string();
    }
    bodies
}
