//! Rule-based field extractors for bills.

pub mod amounts;
pub mod header;
pub mod line_items;
pub mod page_type;
pub mod patterns;
pub mod table_rows;
pub mod totals;

pub use amounts::{parse_amount, round_money, AmountExtractor};
pub use header::{extract_header_fields, HeaderField, HeaderFields, HEADER_FIELDS};
pub use line_items::{parse_line, parse_line_items, LineStrategy, LINE_STRATEGIES, SUMMARY_KEYWORDS};
pub use page_type::classify_page;
pub use table_rows::extract_table_rows;
pub use totals::{extract_totals, TotalLabel, TOTAL_LABELS};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A value together with the text it was read from.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Byte range in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
