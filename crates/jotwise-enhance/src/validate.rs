//! Structural validation of a normalized enhancement document.

use tracing::warn;

use jotwise_core::{Section, DECORATIVE_GLYPHS};

/// Sections whose marker does not occur in `text`, in document order.
pub fn missing_sections(text: &str) -> Vec<Section> {
    Section::ALL
        .into_iter()
        .filter(|section| !text.contains(section.marker()))
        .collect()
}

/// Whether any glyph from the decorative allow-list occurs in `text`.
pub fn has_decorative_glyph(text: &str) -> bool {
    DECORATIVE_GLYPHS.iter().any(|glyph| text.contains(glyph))
}

/// Check a normalized document. Returns the missing sections; an empty
/// list means the document is complete. A document without any
/// decorative glyph is accepted with a warning.
pub fn validate(text: &str) -> Vec<Section> {
    let missing = missing_sections(text);
    if missing.is_empty() && !has_decorative_glyph(text) {
        warn!(
            subsystem = "enhance",
            component = "validate",
            response_len = text.len(),
            "Enhancement has all sections but no decorative glyphs"
        );
    }
    missing
}
