//! Rendering of extraction results.

use std::fmt::Write as _;

use billex_core::Extraction;
use billex_core::models::{InvoiceOutput, PagewiseResponse};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output (one row per item)
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub fn render(extraction: &Extraction, format: OutputFormat, pretty: bool) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if pretty => Ok(serde_json::to_string_pretty(extraction)?),
        OutputFormat::Json => Ok(serde_json::to_string(extraction)?),
        OutputFormat::Csv => match extraction {
            Extraction::Invoice(invoice) => invoice_csv(invoice),
            Extraction::Pagewise(response) => pagewise_csv(response),
        },
        OutputFormat::Text => Ok(match extraction {
            Extraction::Invoice(invoice) => invoice_text(invoice),
            Extraction::Pagewise(response) => pagewise_text(response),
        }),
    }
}

fn invoice_csv(invoice: &InvoiceOutput) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["description", "unit_price", "quantity", "amount"])?;

    for item in &invoice.line_items {
        wtr.write_record([
            item.description.clone(),
            item.unit_price.map(|p| p.to_string()).unwrap_or_default(),
            item.quantity.map(|q| q.to_string()).unwrap_or_default(),
            item.amount.to_string(),
        ])?;
    }

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn pagewise_csv(response: &PagewiseResponse) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "page_no",
        "page_type",
        "item_name",
        "item_quantity",
        "item_rate",
        "item_amount",
    ])?;

    for page in &response.data.pagewise_line_items {
        for item in &page.bill_items {
            wtr.write_record([
                page.page_no.clone(),
                page.page_type.to_string(),
                item.item_name.clone(),
                item.item_quantity.to_string(),
                item.item_rate.to_string(),
                item.item_amount.to_string(),
            ])?;
        }
    }

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn invoice_text(invoice: &InvoiceOutput) -> String {
    let mut output = String::new();
    let or_dash = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    let _ = writeln!(output, "Bill No:  {}", or_dash(&invoice.bill_no));
    let _ = writeln!(output, "Date:     {}", or_dash(&invoice.bill_date));
    let _ = writeln!(output, "Patient:  {}", or_dash(&invoice.patient_name));
    output.push('\n');

    let _ = writeln!(output, "Items ({}):", invoice.line_items.len());
    for item in &invoice.line_items {
        match (item.unit_price, item.quantity) {
            (Some(price), Some(quantity)) => {
                let _ = writeln!(
                    output,
                    "  {} ({} x {}): {}",
                    item.description, price, quantity, item.amount
                );
            }
            _ => {
                let _ = writeln!(output, "  {}: {}", item.description, item.amount);
            }
        }
    }
    output.push('\n');

    output.push_str("Summary:\n");
    for sub_total in &invoice.sub_totals {
        let _ = writeln!(output, "  {}: {}", sub_total.label, sub_total.amount);
    }
    if let Some(discount) = invoice.discount {
        let _ = writeln!(output, "  Discount: {}", discount);
    }
    for (code, amount) in &invoice.taxes.details {
        let _ = writeln!(output, "  {}: {}", code.total_key(), amount);
    }
    if let Some(total_tax) = invoice.taxes.total_tax {
        let _ = writeln!(output, "  Total tax: {}", total_tax);
    }
    if let Some(grand_total) = invoice.grand_total {
        let _ = writeln!(output, "  Grand total: {}", grand_total);
    }
    if let Some(round_off) = invoice.round_off {
        let _ = writeln!(output, "  Round off: {}", round_off);
    }
    let _ = writeln!(output, "  Final total: {}", invoice.final_total);

    if !invoice.anomalies.is_empty() {
        output.push_str("\nAnomalies:\n");
        for anomaly in &invoice.anomalies {
            let _ = writeln!(output, "  - {}", anomaly);
        }
    }

    output
}

fn pagewise_text(response: &PagewiseResponse) -> String {
    let mut output = String::new();

    for page in &response.data.pagewise_line_items {
        let _ = writeln!(
            output,
            "Page {} ({}): {} items",
            page.page_no,
            page.page_type,
            page.bill_items.len()
        );
        for item in &page.bill_items {
            let _ = writeln!(
                output,
                "  {} | {} x {} = {}",
                item.item_name, item.item_quantity, item.item_rate, item.item_amount
            );
        }
    }
    let _ = writeln!(output, "Total items: {}", response.data.total_item_count);

    output
}
