//! Narrative formatting pipeline.
//!
//! Reshapes a model's free-form reply into exactly the three blocks the UI
//! displays:
//!
//! ```text
//! CONTEXT, one sentence per line
//!
//! ✦ STATE current clause
//! ❀ STATE future clause
//!
//! ACTION, one sentence per line
//! ```
//!
//! # Flow
//!
//! 1. [`NarrativeSanitizer`] strips numbering, bullets, headings, labels and
//!    escaped line breaks.
//! 2. [`MarkerExtractor`] pulls `::P1::`/`::P2::`/`::P3::` segments. Only when
//!    no segment is tagged at all does [`HeuristicSegmenter`] split the text
//!    on blank lines instead.
//! 3. [`ParagraphFormatter`] applies the per-block rules, decorating STATE
//!    with a [`DecorationPair`] from the [`SymbolPicker`].
//! 4. [`Assembler`] joins the blocks and clamps to the length budget.
//!
//! The pipeline is synchronous and never fails; the worst case is a
//! best-effort reconstruction, and empty input yields an empty string.

mod assembler;
mod glyphs;
mod heuristic;
mod markers;
mod paragraph;
mod sanitizer;
mod segments;

pub use assembler::{clamp, Assembler, BLOCK_SEPARATOR, DEFAULT_LENGTH_LIMIT};
pub use glyphs::{is_decorative, DecorationPair, PaletteError, SymbolPicker, DEFAULT_PALETTE};
pub use heuristic::{split_paragraphs, HeuristicSegmenter, DEFAULT_TEMPORAL_CONNECTORS};
pub use markers::{format_instructions, split_state, MarkerExtractor, STATE_BREAK};
pub use paragraph::ParagraphFormatter;
pub use sanitizer::{sanitize, NarrativeSanitizer};
pub use segments::{ParsedSegments, SegmentSource, SegmentTag};

use once_cell::sync::Lazy;
use rand::Rng;

static DEFAULT_FORMATTER: Lazy<NarrativeFormatter> = Lazy::new(NarrativeFormatter::default);

/// Formats raw model text with the default pipeline.
pub fn format(raw: &str, length_limit: usize) -> String {
    DEFAULT_FORMATTER.format_with_limit(raw, length_limit)
}

/// Output of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedNarrative {
    /// Display-ready text.
    pub text: String,
    /// Path that produced the segments.
    pub source: SegmentSource,
}

/// The full reshaping pipeline. Immutable once built, so one instance can
/// serve concurrent requests.
#[derive(Debug, Clone)]
pub struct NarrativeFormatter {
    sanitizer: NarrativeSanitizer,
    extractor: MarkerExtractor,
    segmenter: HeuristicSegmenter,
    picker: SymbolPicker,
    paragraphs: ParagraphFormatter,
    length_limit: usize,
}

impl Default for NarrativeFormatter {
    fn default() -> Self {
        Self {
            sanitizer: NarrativeSanitizer::new(),
            extractor: MarkerExtractor::new(),
            segmenter: HeuristicSegmenter::default(),
            picker: SymbolPicker::default(),
            paragraphs: ParagraphFormatter::new(),
            length_limit: DEFAULT_LENGTH_LIMIT,
        }
    }
}

impl NarrativeFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default length budget used by [`Self::format`].
    pub fn with_length_limit(mut self, length_limit: usize) -> Self {
        self.length_limit = length_limit;
        self
    }

    /// Replaces the fallback segmenter (e.g. with other temporal connectors).
    pub fn with_segmenter(mut self, segmenter: HeuristicSegmenter) -> Self {
        self.segmenter = segmenter;
        self
    }

    /// Replaces the glyph palette.
    pub fn with_symbol_picker(mut self, picker: SymbolPicker) -> Self {
        self.picker = picker;
        self
    }

    pub fn length_limit(&self) -> usize {
        self.length_limit
    }

    /// Formats with the configured length budget.
    pub fn format(&self, raw: &str) -> String {
        self.format_with_limit(raw, self.length_limit)
    }

    /// Formats with an explicit length budget.
    pub fn format_with_limit(&self, raw: &str, length_limit: usize) -> String {
        self.shape(raw, length_limit, &mut rand::thread_rng()).text
    }

    /// Sanitizes and segments raw text without formatting it.
    ///
    /// The marker path wins whenever at least one segment is tagged; the
    /// heuristic path runs only otherwise.
    pub fn parse(&self, raw: &str) -> ParsedSegments {
        let clean = self.sanitizer.sanitize(raw);
        match self.extractor.extract(&clean) {
            Some(segments) => segments,
            None => self.segmenter.segment(&clean),
        }
    }

    /// Runs the whole pipeline with an injected random source.
    pub fn shape<R: Rng + ?Sized>(
        &self,
        raw: &str,
        length_limit: usize,
        rng: &mut R,
    ) -> FormattedNarrative {
        let segments = self.parse(raw);
        let glyphs = self.picker.pick(rng);

        let blocks = [
            self.paragraphs.format_narrative(segments.context_str()),
            self.paragraphs.format_state(
                segments.state_current_str(),
                segments.state_future_str(),
                &glyphs,
            ),
            self.paragraphs.format_narrative(segments.action_str()),
        ];
        let text = Assembler::new(length_limit).assemble(&blocks);

        tracing::debug!(
            source = ?segments.source(),
            chars = text.chars().count(),
            length_limit,
            "Narrative formatted"
        );

        FormattedNarrative {
            text,
            source: segments.source(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn lines(text: &str) -> Vec<&str> {
        text.lines().collect()
    }

    #[test]
    fn marker_reply_uses_marker_path() {
        let formatter = NarrativeFormatter::new();
        let mut rng = StdRng::seed_from_u64(1);
        let out = formatter.shape(
            "::P1::A::/P1:: ::P2::B::BR2::C::/P2:: ::P3::D::/P3::",
            DEFAULT_LENGTH_LIMIT,
            &mut rng,
        );

        assert_eq!(out.source, SegmentSource::Markers);
        let blocks: Vec<&str> = out.text.split(BLOCK_SEPARATOR).collect();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0], "A");
        assert_eq!(blocks[2], "D");

        let state = lines(blocks[1]);
        assert_eq!(state.len(), 2);
        let (g1, b) = state[0].split_once(' ').unwrap();
        let (g2, c) = state[1].split_once(' ').unwrap();
        assert_eq!(b, "B");
        assert_eq!(c, "C");
        assert_ne!(g1, g2);
        assert!(DEFAULT_PALETTE.contains(&g1));
        assert!(DEFAULT_PALETTE.contains(&g2));
    }

    #[test]
    fn untagged_reply_uses_heuristic_path() {
        let formatter = NarrativeFormatter::new();
        let mut rng = StdRng::seed_from_u64(2);
        let out = formatter.shape(
            "Plain text.\n\nSecond part.\n\nThird part.",
            DEFAULT_LENGTH_LIMIT,
            &mut rng,
        );

        assert_eq!(out.source, SegmentSource::Heuristic);
        let blocks: Vec<&str> = out.text.split(BLOCK_SEPARATOR).collect();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0], "Plain text.");
        assert_eq!(lines(blocks[1]).len(), 1);
        assert!(blocks[1].ends_with(" Second part."));
        assert_eq!(blocks[2], "Third part.");
    }

    #[test]
    fn partial_tags_omit_missing_blocks() {
        let out = format("::P1::Only context. Two sentences.::/P1::", 1000);
        assert_eq!(out, "Only context.\nTwo sentences.");
    }

    #[test]
    fn messy_reply_is_cleaned_before_extraction() {
        let raw = "## Reading\\n\\n::P1::[Context] It began. It grew.::/P1::\\n\
                   ::P2::\\n1. ✦ You are weary.::BR2::(Future) Peace returns.::/P2::\\n\
                   ::P3::\\n**One action:** Call a friend today.\\n::/P3::";
        let out = format(raw, 1000);
        let blocks: Vec<&str> = out.split(BLOCK_SEPARATOR).collect();

        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0], "It began.\nIt grew.");
        assert!(blocks[1].lines().next().unwrap().ends_with(" You are weary."));
        assert!(blocks[1].lines().nth(1).unwrap().ends_with(" Peace returns."));
        assert_eq!(blocks[2], "Call a friend today.");
    }

    #[test]
    fn unclosed_marker_text_is_not_displayed() {
        let out = format(
            "::P1::Context never closed.\n\nYou are tired ::BR2:: it passes.\n\nRest.",
            1000,
        );
        assert!(!out.contains("::"));

        let blocks: Vec<&str> = out.split(BLOCK_SEPARATOR).collect();
        assert_eq!(blocks[0], "Context never closed.");
        let state = lines(blocks[1]);
        assert!(state[0].ends_with(" You are tired"));
        assert!(state[1].ends_with(" it passes."));
        assert_eq!(blocks[2], "Rest.");
    }

    #[test]
    fn stray_break_inside_context_is_dropped() {
        assert_eq!(format("::P1::Intro ::BR2:: more.::/P1::", 1000), "Intro more.");
    }

    #[test]
    fn empty_input_formats_to_empty_string() {
        assert_eq!(format("", 1000), "");
        assert_eq!(format(" \\n\\n ", 1000), "");
    }

    #[test]
    fn long_output_is_clamped() {
        let sentence = "This sentence is exactly forty chars ok. ";
        let raw = format!("::P1::{}::/P1::", sentence.repeat(40));
        let out = format(&raw, 1000);
        assert!(out.chars().count() <= 1000);
        assert_eq!(out, out.trim_end());
    }

    #[test]
    fn configured_limit_is_the_default() {
        let formatter = NarrativeFormatter::new().with_length_limit(5);
        assert_eq!(formatter.format("::P1::Hello world::/P1::"), "Hello");
    }

    #[test]
    fn custom_palette_is_used() {
        let picker = SymbolPicker::new(vec!["+".to_string(), "-".to_string()]).unwrap();
        let formatter = NarrativeFormatter::new().with_symbol_picker(picker);
        let out = formatter.format("::P2::now::BR2::later::/P2::");
        assert!(out == "+ now\n- later" || out == "- now\n+ later");
    }
}
