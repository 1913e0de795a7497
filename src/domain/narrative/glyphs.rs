//! Decorative glyphs for the STATE block.

use rand::Rng;
use thiserror::Error;

/// Glyphs prefixed to the two STATE lines.
pub const DEFAULT_PALETTE: &[&str] = &[
    "✦", "✧", "❖", "◆", "◇", "✿", "❀", "☘", "✶", "❂", "✺", "❋",
];

/// Errors building a [`SymbolPicker`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaletteError {
    #[error("Glyph palette needs at least 2 distinct glyphs, got {distinct}")]
    TooFewGlyphs { distinct: usize },
}

/// Two distinct glyphs for one STATE block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecorationPair {
    /// Prefix for the current clause.
    pub current: String,
    /// Prefix for the future clause.
    pub future: String,
}

/// Draws glyph pairs uniformly from a fixed palette.
#[derive(Debug, Clone)]
pub struct SymbolPicker {
    palette: Vec<String>,
}

impl Default for SymbolPicker {
    fn default() -> Self {
        Self {
            palette: DEFAULT_PALETTE.iter().map(|g| g.to_string()).collect(),
        }
    }
}

impl SymbolPicker {
    /// Creates a picker over `palette`.
    ///
    /// Blank and duplicate entries are dropped; at least two distinct glyphs
    /// must remain.
    pub fn new(palette: Vec<String>) -> Result<Self, PaletteError> {
        let mut distinct: Vec<String> = Vec::with_capacity(palette.len());
        for glyph in palette {
            let glyph = glyph.trim();
            if !glyph.is_empty() && !distinct.iter().any(|g| g == glyph) {
                distinct.push(glyph.to_string());
            }
        }

        if distinct.len() < 2 {
            return Err(PaletteError::TooFewGlyphs {
                distinct: distinct.len(),
            });
        }
        Ok(Self { palette: distinct })
    }

    pub fn palette(&self) -> &[String] {
        &self.palette
    }

    /// Picks two different glyphs.
    ///
    /// The second index is drawn from the remaining `n - 1` slots and
    /// advanced past the first, so both draws stay uniform and never collide.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> DecorationPair {
        let n = self.palette.len();
        let first = rng.gen_range(0..n);
        let mut second = rng.gen_range(0..n - 1);
        if second >= first {
            second += 1;
        }

        DecorationPair {
            current: self.palette[first].clone(),
            future: self.palette[second].clone(),
        }
    }
}

/// True for symbols a model tends to sprinkle in as decoration.
pub fn is_decorative(c: char) -> bool {
    matches!(c,
        '\u{2022}' | '\u{2023}' | '\u{2043}' | '\u{203B}'
        | '\u{2190}'..='\u{21FF}'
        | '\u{25A0}'..='\u{25FF}'
        | '\u{2600}'..='\u{27BF}'
        | '\u{2B00}'..='\u{2BFF}'
        | '\u{1F300}'..='\u{1FAFF}'
        | '\u{FE0F}'
        | '\u{200D}'
    )
}
