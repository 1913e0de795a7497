//! Narrative formatting configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::narrative::{
    HeuristicSegmenter, NarrativeFormatter, SymbolPicker, DEFAULT_LENGTH_LIMIT,
};

/// Narrative formatting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NarrativeConfig {
    /// Character budget for one formatted explanation
    #[serde(default = "default_length_limit")]
    pub length_limit: usize,

    /// Temporal connectors (comma-separated) that open the future STATE
    /// clause. Built-in list when unset.
    pub temporal_connectors: Option<String>,

    /// Decoration glyphs (comma-separated). Built-in palette when unset.
    pub glyph_palette: Option<String>,
}

impl NarrativeConfig {
    /// Configured connectors, or `None` for the built-in list
    pub fn connectors_list(&self) -> Option<Vec<String>> {
        split_list(self.temporal_connectors.as_deref())
    }

    /// Configured glyphs, or `None` for the built-in palette
    pub fn palette_list(&self) -> Option<Vec<String>> {
        split_list(self.glyph_palette.as_deref())
    }

    /// Builds the formatter these settings describe
    pub fn formatter(&self) -> Result<NarrativeFormatter, ValidationError> {
        let mut formatter = NarrativeFormatter::new().with_length_limit(self.length_limit);

        if let Some(connectors) = self.connectors_list() {
            formatter = formatter.with_segmenter(HeuristicSegmenter::new(connectors));
        }
        if let Some(palette) = self.palette_list() {
            formatter = formatter.with_symbol_picker(SymbolPicker::new(palette)?);
        }

        Ok(formatter)
    }

    /// Validate narrative configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.length_limit == 0 {
            return Err(ValidationError::InvalidLengthLimit);
        }
        if let Some(palette) = self.palette_list() {
            SymbolPicker::new(palette)?;
        }
        Ok(())
    }
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            length_limit: default_length_limit(),
            temporal_connectors: None,
            glyph_palette: None,
        }
    }
}

/// Splits a comma-separated override. Blank input means "not set".
fn split_list(raw: Option<&str>) -> Option<Vec<String>> {
    let items: Vec<String> = raw?
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect();
    (!items.is_empty()).then_some(items)
}

fn default_length_limit() -> usize {
    DEFAULT_LENGTH_LIMIT
}
