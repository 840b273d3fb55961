//! Page classification for pagewise output.

use crate::models::PageType;

const PHARMACY_MARKERS: &[&str] = &["pharmacy", "drug", "medicine"];

/// Classify a page by the words it contains.
///
/// Pharmacy markers take precedence; a page mentioning both "total" and
/// "final" is the final bill; anything else is a detail page.
pub fn classify_page(text: &str) -> PageType {
    let lower = text.to_lowercase();

    if PHARMACY_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return PageType::Pharmacy;
    }

    if lower.contains("total") && lower.contains("final") {
        return PageType::FinalBill;
    }

    PageType::BillDetail
}
