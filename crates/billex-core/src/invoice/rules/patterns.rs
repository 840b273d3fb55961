//! Common regex patterns for bill extraction.
//!
//! Every pattern that involves money is built around [`AMOUNT_TOKEN`], a
//! currency marker (`₹`, `INR`, `Rs`/`Rs.`) followed by digits with optional
//! thousands separators and up to two fraction digits. The token contains
//! exactly one capture group: the numeric text.

use lazy_static::lazy_static;
use regex::Regex;

/// Currency-prefixed amount, one capture group for the number.
pub const AMOUNT_TOKEN: &str = r"(?:₹|INR|\bRs\.?)\s*([\d,]+(?:\.\d{1,2})?)";

lazy_static! {
    // Standalone amount token.
    pub static ref AMOUNT: Regex = Regex::new(AMOUNT_TOKEN).unwrap();

    // "Paracetamol ₹50 /tab x 2 = ₹100"
    // groups: description, unit price, quantity, line amount
    pub static ref QUANTITY_LINE: Regex = Regex::new(&format!(
        r"(?i)^(.*?){AMOUNT_TOKEN}\s*/\w+\s*[x×]\s*([\d.]+)\s*=\s*{AMOUNT_TOKEN}"
    ))
    .unwrap();

    // "Room Rent - ₹2,000"
    // groups: description, amount
    pub static ref TRAILING_AMOUNT_LINE: Regex = Regex::new(&format!(
        r"^(.*?)[\s:,-]+{AMOUNT_TOKEN}$"
    ))
    .unwrap();

    // Single subtotal figure: label as written, amount.
    pub static ref SUBTOTAL: Regex = Regex::new(&format!(
        r"(?is)(Sub\s*total|Total\s+Amount).*?{AMOUNT_TOKEN}"
    ))
    .unwrap();

    // Unlabelled table row: name, quantity, rate, amount.
    pub static ref TABLE_ROW: Regex = Regex::new(
        r"([A-Za-z0-9/\-() ]+?)\s+(\d+(?:\.\d+)?)\s+([\d,.]+)\s+([\d,.]+)"
    )
    .unwrap();

    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Turn a human-readable label such as `"Round Off"` into a pattern that
/// tolerates any run of whitespace (including none) between words.
pub fn label_pattern(label: &str) -> String {
    label
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s*")
}
