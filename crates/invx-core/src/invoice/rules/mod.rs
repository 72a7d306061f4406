//! Rule-based field extractors for the invoice template.

pub mod labels;
pub mod line_items;
pub mod patterns;

pub use labels::LabelRule;
pub use line_items::{LineItemExtractor, LineItemScope};
pub use patterns::*;

/// An extracted value with the byte range of its whole match in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionMatch<T> {
    pub value: T,
    pub position: (usize, usize),
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, start: usize, end: usize) -> Self {
        Self {
            value,
            position: (start, end),
        }
    }
}
