//! The three sections an enhancement document must contain.
//!
//! The prompt asks the model for these headers verbatim, and the
//! structural validator looks for the same markers, so both sides share
//! the constants defined here.

use serde::{Deserialize, Serialize};

/// Glyphs the prompt asks the model to decorate its answer with. Their
/// absence is only worth a warning.
pub const DECORATIVE_GLYPHS: &[&str] = &[
    "🎯", "✅", "💡", "🍅", "💪", "📝", "💻", "🧑‍🤝‍🧑", "👍",
];

/// One named section of a cleaned enhancement document, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Section {
    PriorityTasks,
    Summary,
    ProductivityTip,
}

impl Section {
    /// All sections in the order they appear in a document.
    pub const ALL: [Section; 3] = [
        Section::PriorityTasks,
        Section::Summary,
        Section::ProductivityTip,
    ];

    /// Case-sensitive marker the validator searches for.
    pub fn marker(self) -> &'static str {
        match self {
            Section::PriorityTasks => "PRIORITY TASKS",
            Section::Summary => "SUMMARY",
            Section::ProductivityTip => "PRODUCTIVITY TIP",
        }
    }

    /// Full header line the prompt requests, glyph included.
    pub fn header(self) -> &'static str {
        match self {
            Section::PriorityTasks => "🎯 PRIORITY TASKS:",
            Section::Summary => "✅ SUMMARY:",
            Section::ProductivityTip => "💡 PRODUCTIVITY TIP:",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.marker())
    }
}
