//! Line item parsing.
//!
//! Each non-empty line is offered to an ordered list of strategies; the
//! first strategy that recognizes the line produces the item. Lines that
//! carry summary labels (totals, taxes, discounts) are never items.

use tracing::debug;

use super::FieldExtractor;
use super::amounts::{AmountExtractor, parse_amount};
use super::patterns::{QUANTITY_LINE, TRAILING_AMOUNT_LINE};
use crate::models::LineItem;

/// Labels that mark a line as part of the bill summary.
pub const SUMMARY_KEYWORDS: &[&str] = &[
    "Total",
    "Subtotal",
    "Grand Total",
    "Discount",
    "CGST",
    "SGST",
    "IGST",
    "Round Off",
    "Final Amount",
];

/// A line parsing strategy. `None` means "not recognized, try the next one".
pub type LineStrategy = fn(&str) -> Option<LineItem>;

/// Strategies in priority order.
pub const LINE_STRATEGIES: &[(&str, LineStrategy)] = &[
    ("quantity", parse_quantity_line),
    ("trailing_amount", parse_trailing_amount_line),
    ("fallback", parse_any_amount_line),
];

/// Parse line items from OCR text.
pub fn parse_line_items(text: &str) -> Vec<LineItem> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !is_summary_line(line))
        .filter_map(parse_line)
        .collect()
}

/// Run a single line through the strategies.
pub fn parse_line(line: &str) -> Option<LineItem> {
    LINE_STRATEGIES.iter().find_map(|(name, strategy)| {
        let item = strategy(line)?;
        debug!("line item via {}: {:?}", name, item.description);
        Some(item)
    })
}

fn is_summary_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    SUMMARY_KEYWORDS
        .iter()
        .any(|keyword| lower.contains(&keyword.to_lowercase()))
}

fn clean_description(raw: &str) -> String {
    raw.trim_matches(|c| matches!(c, ':' | '-' | ' ')).to_string()
}

/// `Paracetamol ₹50 /tab x 2 = ₹100`
fn parse_quantity_line(line: &str) -> Option<LineItem> {
    let caps = QUANTITY_LINE.captures(line)?;

    let unit_price = parse_amount(caps.get(2)?.as_str())?;
    let quantity = parse_amount(caps.get(3)?.as_str())?;
    let amount = parse_amount(caps.get(4)?.as_str())?;

    Some(
        LineItem::new(clean_description(caps.get(1)?.as_str()), amount)
            .with_quantity(unit_price, quantity),
    )
}

/// `Room Rent - ₹2,000`
fn parse_trailing_amount_line(line: &str) -> Option<LineItem> {
    let caps = TRAILING_AMOUNT_LINE.captures(line)?;
    let amount = parse_amount(caps.get(2)?.as_str())?;

    Some(LineItem::new(clean_description(caps.get(1)?.as_str()), amount))
}

/// Any line with at least one amount; the last amount wins. Every matched
/// amount is cut out of the description.
fn parse_any_amount_line(line: &str) -> Option<LineItem> {
    let matches = AmountExtractor::new().extract_all(line);
    let amount = matches.last()?.value;

    let mut description = String::with_capacity(line.len());
    let mut cursor = 0;
    for (start, end) in matches.iter().filter_map(|m| m.position) {
        description.push_str(&line[cursor..start]);
        cursor = end;
    }
    description.push_str(&line[cursor..]);

    Some(LineItem::new(clean_description(&description), amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quantity_line() {
        let item = parse_line("Paracetamol ₹50 /tab x 2 = ₹100").unwrap();
        assert_eq!(item.description, "Paracetamol");
        assert_eq!(item.unit_price, Some(dec!(50)));
        assert_eq!(item.quantity, Some(dec!(2)));
        assert_eq!(item.amount, dec!(100));
    }

    #[test]
    fn test_trailing_amount_line() {
        let item = parse_line("Room Rent (2 days): ₹2,000").unwrap();
        assert_eq!(item.description, "Room Rent (2 days)");
        assert_eq!(item.amount, dec!(2000));
        assert_eq!(item.quantity, None);
    }

    #[test]
    fn test_fallback_takes_last_amount() {
        let item = parse_line("X-Ray Rs 300 chest Rs. 450 extra").unwrap();
        assert_eq!(item.amount, dec!(450));
        assert_eq!(item.description, "X-Ray  chest  extra");
    }

    #[test]
    fn test_quantity_failure_falls_through() {
        // "1.2.3" is not a number, so the quantity strategy declines.
        let item = parse_line("Gauze ₹5 /pc x 1.2.3 = ₹15").unwrap();
        assert_eq!(item.amount, dec!(15));
        assert_eq!(item.quantity, None);
    }

    #[test]
    fn test_line_without_amount_is_ignored() {
        assert!(parse_line("Consultant: Dr. Mehta").is_none());
    }

    #[test]
    fn test_summary_lines_are_skipped() {
        let text = "\
Consultation - ₹500
Subtotal: ₹500
CGST 9%: ₹45
igst ₹0
Round Off ₹0
Final Amount ₹545

Dressing: ₹120";
        let items = parse_line_items(text);
        let descriptions: Vec<&str> = items.iter().map(|i| i.description.as_str()).collect();
        assert_eq!(descriptions, vec!["Consultation", "Dressing"]);
    }

    #[test]
    fn test_strategy_order() {
        let names: Vec<&str> = LINE_STRATEGIES.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["quantity", "trailing_amount", "fallback"]);
    }
}
