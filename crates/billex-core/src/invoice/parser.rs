//! Rule-based bill parser: fields, line items, totals and reconciliation.

use std::collections::BTreeMap;
use std::time::Instant;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::models::config::ExtractionConfig;
use crate::models::{InvoiceOutput, PageLineItems, TotalKey};

use super::reconcile::{
    AMOUNT_OVERFLOW, build_taxes, compute_final_total, compute_subtotals, computed_total,
    cross_check, deduplicate_items, sum_items, totals_overflow,
};
use super::rules::{
    classify_page, extract_header_fields, extract_table_rows, extract_totals, parse_line_items,
};

/// Parses OCR text into bill outputs.
#[derive(Debug, Clone)]
pub struct BillParser {
    /// Allowed difference between printed and computed final totals.
    total_tolerance: Decimal,
}

impl BillParser {
    /// Create a parser with default settings.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            total_tolerance: config.total_tolerance,
        }
    }

    /// Set the final total tolerance.
    pub fn with_tolerance(mut self, tolerance: Decimal) -> Self {
        self.total_tolerance = tolerance;
        self
    }

    /// Parse the whole document text into an invoice output.
    pub fn parse(&self, text: &str) -> InvoiceOutput {
        let start = Instant::now();
        info!("Parsing bill from {} characters of text", text.len());

        let header = extract_header_fields(text);
        let line_items = deduplicate_items(parse_line_items(text));
        let totals = extract_totals(text);
        let sub_totals = compute_subtotals(text);
        let taxes = build_taxes(&totals);

        let discount = totals.get(TotalKey::Discount);
        let round_off = totals.get(TotalKey::RoundOff);
        let printed_final = totals.get(TotalKey::FinalAmountPrinted);

        let items_sum = sum_items(&line_items);
        let computed = computed_total(items_sum, discount, taxes.total_tax, round_off);
        let final_total =
            compute_final_total(items_sum, discount, taxes.total_tax, round_off, printed_final);

        let mut anomalies = Vec::new();
        if totals_overflow(&line_items, &taxes, discount, round_off) {
            warn!("bill totals exceed the decimal range, clamping");
            anomalies.push(AMOUNT_OVERFLOW.to_string());
        }
        if let Some(message) = cross_check(printed_final, computed, self.total_tolerance) {
            debug!("printed final {:?} vs computed {}", printed_final, computed);
            anomalies.push(message.to_string());
        }

        let mut meta = BTreeMap::new();
        meta.insert("items_sum".to_string(), items_sum.to_string());
        meta.insert("computed_total".to_string(), computed.to_string());
        meta.insert(
            "final_total_source".to_string(),
            if printed_final.is_some() { "printed" } else { "computed" }.to_string(),
        );
        meta.insert("line_item_count".to_string(), line_items.len().to_string());
        if let Some(printed) = printed_final {
            meta.insert("printed_final_amount".to_string(), printed.to_string());
        }
        if let Some(total_amount) = totals.get(TotalKey::TotalAmount) {
            meta.insert("total_amount".to_string(), total_amount.to_string());
        }

        debug!(
            "Parsed {} line items, {} totals in {}ms",
            line_items.len(),
            totals.len(),
            start.elapsed().as_millis()
        );

        InvoiceOutput {
            bill_no: header.bill_no,
            bill_date: header.bill_date,
            patient_name: header.patient_name,
            line_items,
            sub_totals,
            discount,
            taxes,
            grand_total: totals.get(TotalKey::GrandTotal),
            round_off,
            final_total,
            meta,
            anomalies,
        }
    }

    /// Parse one page into table rows and a page type.
    pub fn parse_page(&self, page_no: usize, text: &str) -> PageLineItems {
        let bill_items = extract_table_rows(text);
        let page_type = classify_page(text);
        debug!("page {}: {} rows, {}", page_no, bill_items.len(), page_type);

        PageLineItems {
            page_no: page_no.to_string(),
            page_type,
            bill_items,
        }
    }
}

impl Default for BillParser {
    fn default() -> Self {
        Self::new()
    }
}
