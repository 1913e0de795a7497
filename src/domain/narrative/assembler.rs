//! Final join and length clamp.

/// Default character budget for a formatted narrative.
pub const DEFAULT_LENGTH_LIMIT: usize = 1000;

/// Separator between blocks.
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// Joins formatted blocks and enforces the length budget.
#[derive(Debug, Clone, Copy)]
pub struct Assembler {
    length_limit: usize,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new(DEFAULT_LENGTH_LIMIT)
    }
}

impl Assembler {
    pub fn new(length_limit: usize) -> Self {
        Self { length_limit }
    }

    pub fn length_limit(&self) -> usize {
        self.length_limit
    }

    /// Joins the non-empty blocks with a blank line, then clamps.
    pub fn assemble<I, S>(&self, blocks: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = blocks
            .into_iter()
            .filter_map(|block| {
                let block = block.as_ref().trim();
                (!block.is_empty()).then(|| block.to_string())
            })
            .collect::<Vec<_>>()
            .join(BLOCK_SEPARATOR);

        clamp(joined, self.length_limit)
    }
}

/// Hard cut at `limit` characters, then trailing whitespace is trimmed.
///
/// Counts `char`s, so multi-byte text is never split inside a code point.
pub fn clamp(text: String, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        None => text,
        Some((cut, _)) => text[..cut].trim_end().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_with_blank_lines() {
        let assembler = Assembler::default();
        assert_eq!(assembler.assemble(["A", "✦ B\n❀ C", "D"]), "A\n\n✦ B\n❀ C\n\nD");
    }

    #[test]
    fn skips_empty_blocks() {
        let assembler = Assembler::default();
        assert_eq!(assembler.assemble(["A", "", "  "]), "A");
        assert_eq!(assembler.assemble(["", "B", "C"]), "B\n\nC");
        assert_eq!(assembler.assemble(["", "", ""]), "");
    }

    #[test]
    fn short_output_is_untouched() {
        let assembler = Assembler::new(10);
        assert_eq!(assembler.assemble(["0123456789"]), "0123456789");
    }

    #[test]
    fn truncates_to_exact_limit() {
        let assembler = Assembler::new(1000);
        let long = "x".repeat(1050);
        let out = assembler.assemble([long.as_str()]);
        assert_eq!(out.chars().count(), 1000);
        assert_eq!(out, out.trim_end());
    }

    #[test]
    fn trims_whitespace_left_by_the_cut() {
        let assembler = Assembler::new(6);
        assert_eq!(assembler.assemble(["abcd", "efgh"]), "abcd");
    }

    #[test]
    fn counts_characters_not_bytes() {
        let out = clamp("가나다라마".to_string(), 3);
        assert_eq!(out, "가나다");
    }

    #[test]
    fn zero_limit_yields_empty() {
        assert_eq!(clamp("abc".to_string(), 0), "");
    }
}
