//! Currency amount extraction.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::AMOUNT;
use super::{ExtractionMatch, FieldExtractor};

/// Currency amount extractor.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for caps in AMOUNT.captures_iter(text) {
            let (Some(full_match), Some(number)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if let Some(amount) = parse_amount(number.as_str()) {
                results.push(
                    ExtractionMatch::new(amount, full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                );
            }
        }

        results
    }
}

/// Parse an amount such as `"12,345.50"`.
///
/// Thousands separators and whitespace are removed; the remainder must be
/// a plain decimal number.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    Decimal::from_str(&cleaned).ok()
}

/// Round to two decimal places.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_amount_strips_separators() {
        assert_eq!(parse_amount("12,345.50"), Some(dec!(12345.50)));
        assert_eq!(parse_amount("1,00,000"), Some(dec!(100000)));
        assert_eq!(parse_amount(" 250 "), Some(dec!(250)));
        assert_eq!(parse_amount("0.5"), Some(dec!(0.5)));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount(","), None);
        assert_eq!(parse_amount("1.2.3"), None);
        assert_eq!(parse_amount("12a"), None);
    }

    #[test]
    fn test_extract_all_amounts_in_order() {
        let extractor = AmountExtractor::new();
        let text = "MRP ₹120, offer Rs. 99.50 (INR 1,099)";

        let results = extractor.extract_all(text);
        let values: Vec<Decimal> = results.iter().map(|m| m.value).collect();
        assert_eq!(values, vec![dec!(120), dec!(99.50), dec!(1099)]);
        assert_eq!(results[1].source, "Rs. 99.50");

        let (start, end) = results[1].position.unwrap();
        assert_eq!(&text[start..end], "Rs. 99.50");
    }

    #[test]
    fn test_round_money() {
        assert_eq!(round_money(dec!(10.005)), dec!(10.00));
        assert_eq!(round_money(dec!(10.015)), dec!(10.02));
        assert_eq!(round_money(dec!(7)), dec!(7));
    }
}
