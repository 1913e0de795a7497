//! Presentation-artifact removal for raw model replies.
//!
//! The model is told to write plain prose inside segment markers, but replies
//! still arrive with numbering, bullets, markdown headings, bracketed section
//! labels and escaped line breaks. Every rule here is a pure rewrite that
//! shortens the text whenever it fires, and [`NarrativeSanitizer::sanitize`]
//! applies the whole rule set until nothing changes. The result is a fixed
//! point, so sanitizing twice is the same as sanitizing once.

use once_cell::sync::Lazy;
use regex::Regex;

/// Rewrite rules applied in order on every pass.
static RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        // Windows line endings and stray carriage returns
        (Regex::new(r"\r\n?").unwrap(), "\n"),
        // Leading enumeration and bullets
        (
            Regex::new(r"(?m)^[ \t]*(?:\d{1,2}[.)]|[-*•·▪◦])[ \t]+").unwrap(),
            "",
        ),
        // Markdown headings
        (Regex::new(r"(?m)^[ \t]*#{1,6}(?:[ \t]+|$)").unwrap(), ""),
        // Markdown emphasis
        (Regex::new(r"\*\*|__").unwrap(), ""),
        // Any square-bracketed span
        (Regex::new(r"\[[^\[\]\n]*\]").unwrap(), ""),
        // Parenthesized or bracketed section labels
        (
            Regex::new(
                r"(?i)[(（【〔「<]\s*(?:context|current|future|forecast|briefing|맥락|현재|미래|예보|브리핑)\b[^)）】〕」>\n]{0,30}[)）】〕」>]",
            )
            .unwrap(),
            "",
        ),
        // Bare label phrases at line start
        (
            Regex::new(
                r"(?im)^[ \t]*(?:context explanation|current\s*\+\s*empathy|future forecast|one action|맥락\s*설명|현재\s*\+\s*공감|미래\s*예보|한\s*가지\s*행동)[ \t]*(?:[:：\-–—][ \t]*|$)",
            )
            .unwrap(),
            "",
        ),
        // Three or more line breaks (blank-ish lines included)
        (Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").unwrap(), "\n\n"),
    ]
});

/// Strips formatting the model was asked not to produce.
#[derive(Debug, Clone, Copy, Default)]
pub struct NarrativeSanitizer;

impl NarrativeSanitizer {
    pub fn new() -> Self {
        Self
    }

    /// Sanitizes raw model text.
    ///
    /// Escaped line breaks are normalized first on each pass, then every
    /// removal rule runs, then the text is trimmed. Passes repeat until the
    /// output stops changing.
    pub fn sanitize(&self, text: &str) -> String {
        let mut current = self.apply_once(text);
        loop {
            let next = self.apply_once(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    fn apply_once(&self, text: &str) -> String {
        let mut out = normalize_escaped_breaks(text);
        for (pattern, replacement) in RULES.iter() {
            if pattern.is_match(&out) {
                out = pattern.replace_all(&out, *replacement).into_owned();
            }
        }
        let trimmed = out.trim();
        if trimmed.len() == out.len() {
            out
        } else {
            trimmed.to_string()
        }
    }
}

/// Convenience wrapper around [`NarrativeSanitizer::sanitize`].
pub fn sanitize(text: &str) -> String {
    NarrativeSanitizer.sanitize(text)
}

/// Turns literal `\n` pairs and stray `/n` typos into real line breaks.
fn normalize_escaped_breaks(text: &str) -> String {
    if !text.contains("\\n") && !text.contains("/n") {
        return text.to_string();
    }

    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        match (chars[i], chars.get(i + 1).copied()) {
            ('\\', Some('n')) => {
                out.push('\n');
                i += 2;
            }
            ('/', Some('n')) if is_stray_slash_n(&chars, i) => {
                out.push('\n');
                i += 2;
            }
            (c, _) => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

/// `/n` counts as a typo only when it is not part of a word like `and/nor`.
fn is_stray_slash_n(chars: &[char], at: usize) -> bool {
    let before = at.checked_sub(1).map(|j| chars[j]);
    let after = chars.get(at + 2).copied();
    !before.is_some_and(|c| c.is_ascii_alphanumeric()) && !after.is_some_and(|c| c.is_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_plain_prose_alone() {
        assert_eq!(sanitize("Hello there. All is well."), "Hello there. All is well.");
    }

    #[test]
    fn removes_numbering_and_bullets() {
        let input = "1. First line\n2) Second line\n- Third\n* Fourth\n• Fifth";
        assert_eq!(
            sanitize(input),
            "First line\nSecond line\nThird\nFourth\nFifth"
        );
    }

    #[test]
    fn keeps_decimal_numbers_at_line_start() {
        assert_eq!(sanitize("3.5 million people"), "3.5 million people");
    }

    #[test]
    fn removes_markdown_headings() {
        assert_eq!(sanitize("## Title\n###### Deep\nBody"), "Title\nDeep\nBody");
    }

    #[test]
    fn keeps_hashtags() {
        assert_eq!(sanitize("#blessed day"), "#blessed day");
    }

    #[test]
    fn removes_bracketed_spans_anywhere() {
        assert_eq!(sanitize("[Context] You are tired [note]."), "You are tired .");
    }

    #[test]
    fn removes_parenthesized_labels() {
        assert_eq!(sanitize("(Current) Things are hard."), "Things are hard.");
        assert_eq!(sanitize("Rest now (future forecast)"), "Rest now");
        assert_eq!(sanitize("【현재】 힘든 시기입니다."), "힘든 시기입니다.");
    }

    #[test]
    fn keeps_ordinary_parentheses() {
        assert_eq!(sanitize("He was (currently) away."), "He was (currently) away.");
    }

    #[test]
    fn removes_bare_label_phrases() {
        let input = "Context explanation: It began.\nFuture forecast - It will pass.\nOne action:\nRest.";
        assert_eq!(sanitize(input), "It began.\nIt will pass.\n\nRest.");
    }

    #[test]
    fn removes_korean_label_phrases() {
        assert_eq!(sanitize("맥락 설명: 시작되었습니다."), "시작되었습니다.");
        assert_eq!(sanitize("현재+공감: 지치셨군요."), "지치셨군요.");
    }

    #[test]
    fn normalizes_escaped_line_breaks() {
        assert_eq!(sanitize("One.\\nTwo.\\n\\nThree."), "One.\nTwo.\n\nThree.");
    }

    #[test]
    fn normalizes_slash_n_typo() {
        assert_eq!(sanitize("One./nTwo."), "One.\nTwo.");
        assert_eq!(sanitize("this and/nor that"), "this and/nor that");
    }

    #[test]
    fn collapses_runs_of_blank_lines() {
        assert_eq!(sanitize("A\n\n\n\nB\n \n\t\nC"), "A\n\nB\n\nC");
    }

    #[test]
    fn strips_emphasis() {
        assert_eq!(sanitize("**One action:** Call a friend."), "Call a friend.");
    }

    #[test]
    fn keeps_segment_markers() {
        let input = "::P1::A::/P1:: ::P2::B::BR2::C::/P2:: ::P3::D::/P3::";
        assert_eq!(sanitize(input), input);
    }

    #[test]
    fn is_idempotent_on_layered_artifacts() {
        let input = "\\n\\n\\n- 1. ## [x] **Context explanation:**\\n\\n\\n\\n# - text\r\n\r\n\r\n";
        let once = sanitize(input);
        assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("  \n\n "), "");
    }
}
