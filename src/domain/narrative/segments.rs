//! Segment types shared by both extraction paths.

use serde::Serialize;

/// One of the three top-level blocks of a narrative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentTag {
    /// Free narrative, two or three sentences.
    Context,
    /// Current state plus a forward-looking clause, split by the sub-separator.
    State,
    /// A single recommended action.
    Action,
}

impl SegmentTag {
    /// All tags in display order.
    pub const ALL: [SegmentTag; 3] = [SegmentTag::Context, SegmentTag::State, SegmentTag::Action];

    /// Marker name used inside the `::NAME::` delimiters.
    pub fn marker_name(&self) -> &'static str {
        match self {
            SegmentTag::Context => "P1",
            SegmentTag::State => "P2",
            SegmentTag::Action => "P3",
        }
    }

    /// Opening delimiter, e.g. `::P1::`.
    pub fn open_marker(&self) -> String {
        format!("::{}::", self.marker_name())
    }

    /// Closing delimiter, e.g. `::/P1::`.
    pub fn close_marker(&self) -> String {
        format!("::/{}::", self.marker_name())
    }
}

/// Which extraction path produced a [`ParsedSegments`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentSource {
    Markers,
    Heuristic,
}

/// Segment bodies pulled out of a model reply.
///
/// A value is always built by exactly one path, recorded in `source`.
/// Missing segments are `None` and render as nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSegments {
    pub context: Option<String>,
    pub state_current: Option<String>,
    pub state_future: Option<String>,
    pub action: Option<String>,
    source: SegmentSource,
}

impl ParsedSegments {
    /// Creates an empty record for the given path.
    pub fn new(source: SegmentSource) -> Self {
        Self {
            context: None,
            state_current: None,
            state_future: None,
            action: None,
            source,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = non_empty(context.into());
        self
    }

    pub fn with_state(mut self, current: impl Into<String>, future: impl Into<String>) -> Self {
        self.state_current = non_empty(current.into());
        self.state_future = non_empty(future.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = non_empty(action.into());
        self
    }

    /// The path that produced these segments.
    pub fn source(&self) -> SegmentSource {
        self.source
    }

    /// True when no segment carries any text.
    pub fn is_empty(&self) -> bool {
        self.context.is_none()
            && self.state_current.is_none()
            && self.state_future.is_none()
            && self.action.is_none()
    }

    pub fn context_str(&self) -> &str {
        self.context.as_deref().unwrap_or_default()
    }

    pub fn state_current_str(&self) -> &str {
        self.state_current.as_deref().unwrap_or_default()
    }

    pub fn state_future_str(&self) -> &str {
        self.state_future.as_deref().unwrap_or_default()
    }

    pub fn action_str(&self) -> &str {
        self.action.as_deref().unwrap_or_default()
    }
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == s.len() {
        Some(s)
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_follow_tag_order() {
        assert_eq!(SegmentTag::Context.open_marker(), "::P1::");
        assert_eq!(SegmentTag::State.close_marker(), "::/P2::");
        assert_eq!(SegmentTag::Action.marker_name(), "P3");
    }

    #[test]
    fn blank_segments_become_none() {
        let segments = ParsedSegments::new(SegmentSource::Markers)
            .with_context("  ")
            .with_state(" now ", "")
            .with_action("Go.");

        assert!(segments.context.is_none());
        assert_eq!(segments.state_current.as_deref(), Some("now"));
        assert!(segments.state_future.is_none());
        assert_eq!(segments.action_str(), "Go.");
        assert_eq!(segments.source(), SegmentSource::Markers);
    }

    #[test]
    fn new_record_is_empty() {
        assert!(ParsedSegments::new(SegmentSource::Heuristic).is_empty());
    }

    #[test]
    fn source_serializes_snake_case() {
        let json = serde_json::to_string(&SegmentSource::Heuristic).unwrap();
        assert_eq!(json, "\"heuristic\"");
    }
}
