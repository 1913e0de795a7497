//! Per-block presentation rules.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::glyphs::{is_decorative, DecorationPair};

/// Sentence end plus the whitespace after it. Full-width marks break even
/// without trailing whitespace.
static SENTENCE_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[.!?…]+["'”’)\]]*\s+|[。！？]+["'”’)\]]*\s*"#).unwrap()
});

/// Category hints a model embeds in STATE clauses, e.g. `[Now]` or `(미래)`.
static CATEGORY_HINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\[[^\[\]]*\]|【[^【】]*】|[(（]\s*(?:now|current|currently|future|later|next|forecast|현재|지금|미래|앞으로|예보)\s*[)）]",
    )
    .unwrap()
});

/// Applies line-break and decoration rules to each block.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParagraphFormatter;

impl ParagraphFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Formats CONTEXT or ACTION text: one sentence per line, no glyphs,
    /// no blank lines.
    pub fn format_narrative(&self, text: &str) -> String {
        let plain = strip_glyphs(text);
        let broken = SENTENCE_BREAK.replace_all(&plain, |caps: &Captures| {
            format!("{}\n", caps[0].trim_end())
        });

        broken
            .lines()
            .map(collapse_spaces)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Formats STATE as `"{glyph} {current}\n{glyph} {future}"`.
    ///
    /// An empty clause drops its line. A lone future clause takes the first
    /// glyph.
    pub fn format_state(&self, current: &str, future: &str, glyphs: &DecorationPair) -> String {
        let current = clean_state_clause(current);
        let future = clean_state_clause(future);

        match (current.is_empty(), future.is_empty()) {
            (true, true) => String::new(),
            (false, true) => format!("{} {}", glyphs.current, current),
            (true, false) => format!("{} {}", glyphs.current, future),
            (false, false) => format!(
                "{} {}\n{} {}",
                glyphs.current, current, glyphs.future, future
            ),
        }
    }
}

fn clean_state_clause(clause: &str) -> String {
    let without_hints = CATEGORY_HINT.replace_all(clause, " ");
    let flattened = collapse_spaces(&without_hints);
    flattened
        .trim_start_matches(|c: char| is_decorative(c) || c.is_whitespace())
        .to_string()
}

fn strip_glyphs(text: &str) -> String {
    text.chars().filter(|c| !is_decorative(*c)).collect()
}

/// Collapses every whitespace run (line breaks included) to one space.
fn collapse_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
