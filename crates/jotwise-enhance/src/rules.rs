//! Named text transforms applied as an ordered list.

use tracing::trace;

/// A single named, pure text transform.
#[derive(Clone, Copy)]
pub struct TextRule {
    pub name: &'static str,
    pub apply: fn(&str) -> String,
}

impl std::fmt::Debug for TextRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRule").field("name", &self.name).finish()
    }
}

/// Run `rules` front to back, feeding each the previous output.
pub fn apply_all(rules: &[TextRule], stage: &'static str, input: &str) -> String {
    rules.iter().fold(input.to_string(), |text, rule| {
        let out = (rule.apply)(&text);
        if out != text {
            trace!(
                subsystem = "enhance",
                component = stage,
                rule = rule.name,
                before_len = text.len(),
                after_len = out.len(),
                "Rule changed text"
            );
        }
        out
    })
}
