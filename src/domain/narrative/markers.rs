//! Marker grammar and the strict extraction path.
//!
//! Each segment is wrapped in a delimiter pair, `::P1::` … `::/P1::` for
//! CONTEXT, `::P2::` … `::/P2::` for STATE and `::P3::` … `::/P3::` for
//! ACTION. STATE carries one internal `::BR2::` separating the current clause
//! from the forward-looking one. Matching is case-insensitive.

use once_cell::sync::Lazy;
use regex::Regex;

use super::segments::{ParsedSegments, SegmentSource, SegmentTag};

/// Separator between the current and future clauses of STATE.
pub const STATE_BREAK: &str = "::BR2::";

static SEGMENT_PATTERNS: Lazy<Vec<(SegmentTag, Regex)>> = Lazy::new(|| {
    SegmentTag::ALL
        .iter()
        .map(|tag| {
            let pattern = format!(
                r"(?is){}(.*?){}",
                regex::escape(&tag.open_marker()),
                regex::escape(&tag.close_marker())
            );
            (*tag, Regex::new(&pattern).unwrap())
        })
        .collect()
});

static ANY_SEGMENT_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)::/?P[1-3]::").unwrap());

static STATE_BREAK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("(?i){}", regex::escape(STATE_BREAK))).unwrap());

/// A segment marker or state break with the spaces around it.
static STRAY_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[ \t]*::(?:/?P[1-3]|BR2)::[ \t]*").unwrap());

/// A segment marker with the spaces around it. State breaks are kept.
static STRAY_SEGMENT_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[ \t]*::/?P[1-3]::[ \t]*").unwrap());

/// Pulls tagged segments out of sanitized model text.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerExtractor;

impl MarkerExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts all tagged segments.
    ///
    /// Returns `None` only when no segment tag pair is found at all. Any
    /// subset of found tags is accepted; the rest stay empty.
    pub fn extract(&self, text: &str) -> Option<ParsedSegments> {
        let context = self.capture(SegmentTag::Context, text);
        let state = self.capture(SegmentTag::State, text);
        let action = self.capture(SegmentTag::Action, text);

        if context.is_none() && state.is_none() && action.is_none() {
            return None;
        }

        let mut segments = ParsedSegments::new(SegmentSource::Markers);
        if let Some(context) = context {
            segments = segments.with_context(strip_markers(&context));
        }
        if let Some(state) = state {
            let (current, future) = split_state(&state);
            segments = segments.with_state(current, future);
        }
        if let Some(action) = action {
            segments = segments.with_action(strip_markers(&action));
        }
        Some(segments)
    }

    /// Returns the trimmed interior of the first matched pair for `tag`.
    ///
    /// A pair enclosing another segment marker is nested and does not count.
    fn capture(&self, tag: SegmentTag, text: &str) -> Option<String> {
        let pattern = SEGMENT_PATTERNS
            .iter()
            .find(|(candidate, _)| *candidate == tag)
            .map(|(_, pattern)| pattern)?;

        let interior = pattern.captures(text)?.get(1)?.as_str();
        if ANY_SEGMENT_MARKER.is_match(interior) {
            return None;
        }
        Some(interior.trim().to_string())
    }
}

/// Splits a STATE body on the sub-separator.
///
/// Text before the first separator is the current clause; every later piece
/// is joined with a single space into the future clause.
pub fn split_state(body: &str) -> (String, String) {
    let mut parts = STATE_BREAK_PATTERN.split(body);
    let current = parts.next().unwrap_or_default().trim().to_string();
    let future = parts
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (current, future)
}

/// Whether `text` holds a state break.
pub fn has_state_break(text: &str) -> bool {
    STATE_BREAK_PATTERN.is_match(text)
}

/// Removes every leftover segment marker and state break.
///
/// Each marker collapses to one space; lines are trimmed and line breaks kept.
pub fn strip_markers(text: &str) -> String {
    tidy_lines(&STRAY_MARKER.replace_all(text, " "))
}

/// Removes leftover segment markers but keeps state breaks.
pub fn strip_segment_markers(text: &str) -> String {
    tidy_lines(&STRAY_SEGMENT_MARKER.replace_all(text, " "))
}

fn tidy_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Describes the grammar for inclusion in a model prompt.
pub fn format_instructions() -> String {
    let [context, state, action] = SegmentTag::ALL;
    format!(
        "Wrap each paragraph in its markers and write nothing outside them.\n\
         {} two or three sentences explaining the context {}\n\
         {} the current situation with empathy {} a forecast of what comes next {}\n\
         {} one concrete action in a single sentence {}\n\
         Do not use numbering, bullets, headings or section labels.",
        context.open_marker(),
        context.close_marker(),
        state.open_marker(),
        STATE_BREAK,
        state.close_marker(),
        action.open_marker(),
        action.close_marker(),
    )
}
