//! Repeated-group extraction of product rows.

use serde::{Deserialize, Serialize};

use super::patterns::LINE_ITEM;
use super::ExtractionMatch;
use crate::models::invoice::LineItem;

/// Portion of the document text searched for product rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum LineItemScope {
    /// Search the whole text. Numeric runs outside the product table may be
    /// picked up as rows.
    #[default]
    Unanchored,

    /// Search only between the first `start` marker and the next `end` marker.
    Section {
        start: String,
        end: Option<String>,
    },
}

impl LineItemScope {
    /// Narrow `text` to the searched region, returning it with its byte offset.
    ///
    /// Returns `None` when a section start marker is configured but absent.
    pub fn region<'a>(&self, text: &'a str) -> Option<(usize, &'a str)> {
        match self {
            LineItemScope::Unanchored => Some((0, text)),
            LineItemScope::Section { start, end } => {
                let offset = text.find(start.as_str())? + start.len();
                let rest = &text[offset..];
                let region = match end.as_deref().and_then(|e| rest.find(e)) {
                    Some(end_pos) => &rest[..end_pos],
                    None => rest,
                };
                Some((offset, region))
            }
        }
    }
}

/// Product row extractor.
#[derive(Debug, Clone, Default)]
pub struct LineItemExtractor {
    scope: LineItemScope,
}

impl LineItemExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict matching to a region of the text.
    pub fn with_scope(mut self, scope: LineItemScope) -> Self {
        self.scope = scope;
        self
    }

    /// All product rows within the scope, in order of appearance.
    pub fn extract_all(&self, text: &str) -> Vec<ExtractionMatch<LineItem>> {
        let Some((offset, region)) = self.scope.region(text) else {
            return Vec::new();
        };

        LINE_ITEM
            .captures_iter(region)
            .map(|caps| {
                let full_match = caps.get(0).unwrap();
                let item = LineItem::new(&caps[1], &caps[2], &caps[3], &caps[4]);
                ExtractionMatch::new(item, offset + full_match.start(), offset + full_match.end())
            })
            .collect()
    }
}
