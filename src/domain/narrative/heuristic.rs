//! Fallback segmentation for replies that carry no segment markers.

use once_cell::sync::Lazy;
use regex::Regex;

use super::markers::{has_state_break, split_state, strip_markers, strip_segment_markers};
use super::segments::{ParsedSegments, SegmentSource};

/// Forward-looking connectors that usually open the future clause of STATE.
pub const DEFAULT_TEMPORAL_CONNECTORS: &[&str] = &[
    "앞으로",
    "이제부터",
    "머지않아",
    "from now on",
    "going forward",
    "in the days ahead",
    "soon",
    "tomorrow",
];

/// Two or more line breaks, whitespace-only lines included.
static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*\n\s*").unwrap());

/// Sentence-ending punctuation (with closing quotes) followed by whitespace.
static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[.!?。！？…]+["'”’)\]]*\s+"#).unwrap());

/// Splits untagged text into CONTEXT, STATE and ACTION.
#[derive(Debug, Clone)]
pub struct HeuristicSegmenter {
    connector_pattern: Option<Regex>,
}

impl Default for HeuristicSegmenter {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPORAL_CONNECTORS.iter().map(|c| c.to_string()).collect())
    }
}

impl HeuristicSegmenter {
    /// Creates a segmenter that splits STATE on the given connectors.
    ///
    /// An empty list disables the connector rule and leaves only the
    /// punctuation fallback.
    pub fn new(connectors: Vec<String>) -> Self {
        Self {
            connector_pattern: connector_pattern(connectors),
        }
    }

    /// Partitions `text` into exactly three paragraphs.
    ///
    /// Unmatched markers are dropped. A leftover state break in the second
    /// paragraph is tried as the split point before the connector rule.
    pub fn segment(&self, text: &str) -> ParsedSegments {
        let [context, state, action] = split_paragraphs(&strip_segment_markers(text));
        let (current, future) = self.split_state_or_break(&state);

        ParsedSegments::new(SegmentSource::Heuristic)
            .with_context(strip_markers(&context))
            .with_state(current, future)
            .with_action(strip_markers(&action))
    }

    fn split_state_or_break(&self, chunk: &str) -> (String, String) {
        if has_state_break(chunk) {
            let (current, future) = split_state(chunk);
            if !current.is_empty() && !future.is_empty() {
                return (current, future);
            }
        }
        self.split_state(&strip_markers(chunk))
    }

    /// Finds the boundary between the current and the future clause.
    ///
    /// A connector following a clause boundary wins; otherwise the first
    /// sentence end followed by whitespace. Without either, the whole chunk
    /// is the current clause.
    pub fn split_state(&self, chunk: &str) -> (String, String) {
        let chunk = chunk.trim();

        if let Some(at) = self.connector_break(chunk) {
            return halves(chunk, at);
        }

        if let Some(found) = SENTENCE_END.find(chunk) {
            let at = found.end();
            if at < chunk.len() {
                return halves(chunk, at);
            }
        }

        (chunk.to_string(), String::new())
    }

    fn connector_break(&self, chunk: &str) -> Option<usize> {
        let pattern = self.connector_pattern.as_ref()?;
        let captures = pattern.captures(chunk)?;
        captures.get(1).map(|m| m.start())
    }
}

/// Splits text on blank lines into exactly three paragraphs.
///
/// Single line breaks inside a paragraph become spaces. Extra paragraphs are
/// folded into the third; missing ones are empty.
pub fn split_paragraphs(text: &str) -> [String; 3] {
    let mut chunks: Vec<String> = PARAGRAPH_BREAK
        .split(text)
        .map(flatten_lines)
        .filter(|chunk| !chunk.is_empty())
        .collect();

    if chunks.len() > 3 {
        let tail = chunks.split_off(2).join(" ");
        chunks.push(tail);
    }
    chunks.resize(3, String::new());

    let mut iter = chunks.into_iter();
    [
        iter.next().unwrap_or_default(),
        iter.next().unwrap_or_default(),
        iter.next().unwrap_or_default(),
    ]
}

fn flatten_lines(chunk: &str) -> String {
    chunk
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn halves(chunk: &str, at: usize) -> (String, String) {
    let (current, future) = chunk.split_at(at);
    (current.trim().to_string(), future.trim().to_string())
}

/// Builds `<clause boundary><whitespace>(connector)`; the connector group
/// marks the break position.
fn connector_pattern(mut connectors: Vec<String>) -> Option<Regex> {
    connectors = connectors
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    if connectors.is_empty() {
        return None;
    }
    // Longest first so "from now on" beats a shorter prefix at the same spot.
    connectors.sort_by_key(|c| std::cmp::Reverse(c.chars().count()));

    let alternation = connectors
        .iter()
        .map(|c| {
            let escaped = regex::escape(c);
            if c.ends_with(|ch: char| ch.is_ascii_alphanumeric()) {
                format!(r"{escaped}\b")
            } else {
                escaped
            }
        })
        .collect::<Vec<_>>()
        .join("|");

    let pattern = format!(r#"(?i)[.!?。！？…,，;:]["'”’)\]]*\s+({alternation})"#);
    match Regex::new(&pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            tracing::warn!("Temporal connector pattern rejected, connector split disabled: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_chunks_map_to_three_segments() {
        let segments =
            HeuristicSegmenter::default().segment("Plain text.\n\nSecond part.\n\nThird part.");

        assert_eq!(segments.source(), SegmentSource::Heuristic);
        assert_eq!(segments.context_str(), "Plain text.");
        assert_eq!(segments.state_current_str(), "Second part.");
        assert!(segments.state_future.is_none());
        assert_eq!(segments.action_str(), "Third part.");
    }

    #[test]
    fn overflow_folds_into_third_chunk() {
        let [first, second, third] = split_paragraphs("c1\n\nc2\n\nc3\n\nc4\n\nc5");
        assert_eq!(first, "c1");
        assert_eq!(second, "c2");
        assert_eq!(third, "c3 c4 c5");
    }

    #[test]
    fn short_input_is_padded() {
        let [first, second, third] = split_paragraphs("only one");
        assert_eq!(first, "only one");
        assert_eq!(second, "");
        assert_eq!(third, "");
    }

    #[test]
    fn single_breaks_are_flattened() {
        let [first, second, _] = split_paragraphs("wrapped\nline\n\n  \n\nnext\n para ");
        assert_eq!(first, "wrapped line");
        assert_eq!(second, "next para");
    }

    #[test]
    fn empty_input_yields_empty_segments() {
        assert!(HeuristicSegmenter::default().segment("").is_empty());
    }

    #[test]
    fn splits_state_on_connector() {
        let segmenter = HeuristicSegmenter::default();
        let (current, future) =
            segmenter.split_state("You feel stretched thin; soon the weight will lift.");
        assert_eq!(current, "You feel stretched thin;");
        assert_eq!(future, "soon the weight will lift.");
    }

    #[test]
    fn connector_prefers_clause_start_over_sentence_end() {
        let segmenter = HeuristicSegmenter::default();
        let (current, future) =
            segmenter.split_state("It is hard. It stays hard. Going forward, light returns.");
        assert_eq!(current, "It is hard. It stays hard.");
        assert_eq!(future, "Going forward, light returns.");
    }

    #[test]
    fn splits_korean_connector() {
        let segmenter = HeuristicSegmenter::default();
        let (current, future) = segmenter.split_state("지금은 지쳐 있습니다. 앞으로는 회복됩니다.");
        assert_eq!(current, "지금은 지쳐 있습니다.");
        assert_eq!(future, "앞으로는 회복됩니다.");
    }

    #[test]
    fn connector_inside_word_is_ignored() {
        let segmenter = HeuristicSegmenter::default();
        let (current, future) = segmenter.split_state("It ends, soonish or not");
        assert_eq!(current, "It ends, soonish or not");
        assert_eq!(future, "");
    }

    #[test]
    fn falls_back_to_first_sentence_end() {
        let segmenter = HeuristicSegmenter::default();
        let (current, future) = segmenter.split_state("Now is heavy. Later is lighter. Truly.");
        assert_eq!(current, "Now is heavy.");
        assert_eq!(future, "Later is lighter. Truly.");
    }

    #[test]
    fn no_split_point_keeps_whole_chunk() {
        let segmenter = HeuristicSegmenter::default();
        let (current, future) = segmenter.split_state("A single sentence.");
        assert_eq!(current, "A single sentence.");
        assert_eq!(future, "");
    }

    #[test]
    fn custom_connectors_replace_defaults() {
        let segmenter = HeuristicSegmenter::new(vec!["eventually".to_string()]);
        let (current, future) = segmenter.split_state("Rest, eventually you heal");
        assert_eq!(current, "Rest,");
        assert_eq!(future, "eventually you heal");

        let (current, _) = segmenter.split_state("Rest, soon you heal");
        assert_eq!(current, "Rest, soon you heal");
    }

    #[test]
    fn padded_connectors_are_ordered_by_trimmed_length() {
        let connectors = vec!["   from now  ".to_string(), "from now on".to_string()];
        let pattern = connector_pattern(connectors.clone()).unwrap();
        assert!(pattern.as_str().contains(r"(from now on\b|from now\b)"));

        let segmenter = HeuristicSegmenter::new(connectors);
        let (current, future) = segmenter.split_state("Rest, from now on you heal");
        assert_eq!(current, "Rest,");
        assert_eq!(future, "from now on you heal");
    }

    #[test]
    fn unmatched_markers_never_reach_segments() {
        let segments = HeuristicSegmenter::default()
            .segment("::P1::Context never closed.\n\nYou are tired ::BR2:: it passes.\n\nRest.::/P3::");

        assert_eq!(segments.context_str(), "Context never closed.");
        assert_eq!(segments.state_current_str(), "You are tired");
        assert_eq!(segments.state_future_str(), "it passes.");
        assert_eq!(segments.action_str(), "Rest.");
    }

    #[test]
    fn leading_break_falls_back_to_connector_rule() {
        let segments = HeuristicSegmenter::default()
            .segment("Intro.\n\n::BR2:: It is late, soon it is dawn.\n\nWait ::BR2:: here.");

        assert_eq!(segments.state_current_str(), "It is late,");
        assert_eq!(segments.state_future_str(), "soon it is dawn.");
        assert_eq!(segments.action_str(), "Wait here.");
    }

    #[test]
    fn empty_connector_list_uses_punctuation_only() {
        let segmenter = HeuristicSegmenter::new(Vec::new());
        let (current, future) = segmenter.split_state("One. Two.");
        assert_eq!(current, "One.");
        assert_eq!(future, "Two.");
    }
}
