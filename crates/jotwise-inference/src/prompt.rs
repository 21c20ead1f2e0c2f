//! The enhancement prompt.
//!
//! The section headers come from [`jotwise_core::Section`] so the prompt
//! and the structural validator cannot drift apart.

use jotwise_core::Section;

/// Word limit the model is asked to respect.
pub const WORD_LIMIT: usize = 120;

/// Build the prompt asking for a three-section enhancement of `content`.
pub fn enhancement_prompt(content: &str) -> String {
    let [tasks, summary, tip] = Section::ALL.map(Section::header);

    format!(
        "Analyze this task list and provide a structured enhancement:

---
{content}
---

**CRITICAL INSTRUCTIONS FOR RESPONSE FORMAT:**
1. Respond ONLY with plain text.
2. Do NOT include any prefixes like '0:', 'f:', 'e:', 'd:'.
3. Do NOT include quotation marks around text segments.
4. Use standard newline characters ONLY between lines and sections.
5. Include relevant emojis within the text as requested.

Please provide the following sections, exactly as written, with plain text content following each header:

{tasks}
[Bulleted list of tasks, prioritized, with brief reasoning. Use '*' or '-' for bullets.]

{summary}
[1-2 sentence motivational overview.]

{tip}
[One specific, actionable technique for these tasks.]

Example of CORRECT format:
{tasks}
* Task A (Reason A)
* Task B (Reason B)

{summary}
This is the summary text.

{tip}
This is the productivity tip.

Keep the entire response under {WORD_LIMIT} words."
    )
}
