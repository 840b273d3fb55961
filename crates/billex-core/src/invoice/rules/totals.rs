//! Summary figure extraction (totals, taxes, discount, round-off).

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::amounts::parse_amount;
use super::patterns::{label_pattern, AMOUNT_TOKEN};
use crate::models::{TotalKey, TotalsMap};

/// A printed summary label and the key its amount is stored under.
#[derive(Debug, Clone, Copy)]
pub struct TotalLabel {
    pub key: TotalKey,
    pub label: &'static str,
    /// Whether a leading minus sign is honoured.
    pub signed: bool,
}

impl TotalLabel {
    const fn new(key: TotalKey, label: &'static str) -> Self {
        Self {
            key,
            label,
            signed: false,
        }
    }

    const fn signed(key: TotalKey, label: &'static str) -> Self {
        Self {
            key,
            label,
            signed: true,
        }
    }

    fn pattern(&self) -> String {
        let sign = if self.signed { r"(-)?\s*" } else { "()" };
        format!(r"(?is){}.*?{}{}", label_pattern(self.label), sign, AMOUNT_TOKEN)
    }
}

/// Labels in search order. Each label is searched independently over the
/// whole text.
pub const TOTAL_LABELS: &[TotalLabel] = &[
    TotalLabel::new(TotalKey::TotalAmount, "Total Amount"),
    TotalLabel::new(TotalKey::Discount, "Discount"),
    TotalLabel::new(TotalKey::Cgst, "CGST"),
    TotalLabel::new(TotalKey::Sgst, "SGST"),
    TotalLabel::new(TotalKey::Igst, "IGST"),
    TotalLabel::new(TotalKey::TotalTax, "Total Tax"),
    TotalLabel::new(TotalKey::GrandTotal, "Grand Total"),
    TotalLabel::signed(TotalKey::RoundOff, "Round Off"),
    TotalLabel::new(TotalKey::FinalAmountPrinted, "Final Amount"),
];

lazy_static! {
    static ref TOTAL_PATTERNS: Vec<(TotalLabel, Regex)> = TOTAL_LABELS
        .iter()
        .map(|label| (*label, Regex::new(&label.pattern()).unwrap()))
        .collect();
}

/// Extract printed summary figures. Only the first match per label is kept.
pub fn extract_totals(text: &str) -> TotalsMap {
    TOTAL_PATTERNS
        .iter()
        .filter_map(|(label, pattern)| {
            let caps = pattern.captures(text)?;
            let mut amount = parse_amount(caps.get(2)?.as_str())?;
            if caps.get(1).is_some_and(|sign| !sign.as_str().is_empty()) {
                amount = -amount;
            }
            debug!("total {} = {}", label.key, amount);
            Some((label.key, amount))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SUMMARY: &str = "\
Total Amount: ₹1,000.00
Discount ₹100
CGST @9% ₹40.50
SGST @9% ₹40.50
Grand Total ₹981
Round Off -₹0.50
Final Amount ₹980.50";

    #[test]
    fn test_extracts_each_label() {
        let totals = extract_totals(SUMMARY);

        assert_eq!(totals.get(TotalKey::TotalAmount), Some(dec!(1000.00)));
        assert_eq!(totals.get(TotalKey::Discount), Some(dec!(100)));
        assert_eq!(totals.get(TotalKey::Cgst), Some(dec!(40.50)));
        assert_eq!(totals.get(TotalKey::Sgst), Some(dec!(40.50)));
        assert_eq!(totals.get(TotalKey::GrandTotal), Some(dec!(981)));
        assert_eq!(totals.get(TotalKey::RoundOff), Some(dec!(-0.50)));
        assert_eq!(totals.get(TotalKey::FinalAmountPrinted), Some(dec!(980.50)));
        assert!(!totals.contains(TotalKey::Igst));
        assert!(!totals.contains(TotalKey::TotalTax));
    }

    #[test]
    fn test_label_spans_lines() {
        let totals = extract_totals("FINAL AMOUNT\n(incl. taxes)\nINR 2,450");
        assert_eq!(totals.get(TotalKey::FinalAmountPrinted), Some(dec!(2450)));
    }

    #[test]
    fn test_first_match_per_label() {
        let totals = extract_totals("Discount ₹10\nDiscount ₹20");
        assert_eq!(totals.get(TotalKey::Discount), Some(dec!(10)));
    }

    #[test]
    fn test_unsigned_labels_ignore_minus() {
        let totals = extract_totals("Discount -₹10");
        assert_eq!(totals.get(TotalKey::Discount), Some(dec!(10)));
    }

    #[test]
    fn test_empty_text() {
        assert!(extract_totals("no figures here").is_empty());
    }
}
