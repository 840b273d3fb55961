//! Unlabelled table rows: `name quantity rate amount`.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::amounts::parse_amount;
use super::patterns::{TABLE_ROW, WHITESPACE_RUN};
use crate::models::BillItem;

/// Extract every table row from page text.
///
/// Whitespace (including line breaks) is collapsed first, so a row may span
/// OCR lines. Rows whose numbers do not parse are skipped.
pub fn extract_table_rows(text: &str) -> Vec<BillItem> {
    let collapsed = WHITESPACE_RUN.replace_all(text, " ");

    TABLE_ROW
        .captures_iter(&collapsed)
        .filter_map(|caps| {
            Some(BillItem {
                item_name: caps.get(1)?.as_str().trim().to_string(),
                item_quantity: Decimal::from_str(caps.get(2)?.as_str()).ok()?,
                item_rate: parse_amount(caps.get(3)?.as_str())?,
                item_amount: parse_amount(caps.get(4)?.as_str())?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rows_across_lines() {
        let text = "Consultation 1 500.00 500.00\nX-Ray (Chest) 2\n350 700";
        let rows = extract_table_rows(text);

        assert_eq!(
            rows,
            vec![
                BillItem {
                    item_name: "Consultation".to_string(),
                    item_quantity: dec!(1),
                    item_rate: dec!(500.00),
                    item_amount: dec!(500.00),
                },
                BillItem {
                    item_name: "X-Ray (Chest)".to_string(),
                    item_quantity: dec!(2),
                    item_rate: dec!(350),
                    item_amount: dec!(700),
                },
            ]
        );
    }

    #[test]
    fn test_thousands_separators() {
        let rows = extract_table_rows("ICU Charges 3 4,500 13,500");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].item_rate, dec!(4500));
        assert_eq!(rows[0].item_amount, dec!(13500));
    }

    #[test]
    fn test_unparseable_row_is_skipped() {
        let rows = extract_table_rows("Bandage 1 1.2.3 40");
        assert!(rows.is_empty());
    }

    #[test]
    fn test_prose_has_no_rows() {
        assert!(extract_table_rows("Thank you for visiting").is_empty());
    }
}
