//! Parse command - run field extraction on text that was already
//! recognized elsewhere.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use clap::Args;

use billex_core::models::PagewiseResponse;
use billex_core::{BillParser, Extraction, Variant};

use super::{VariantArg, load_config};
use crate::output::{OutputFormat, render};

/// Page separator in text input (form feed, as written by PDF text tools).
const FORM_FEED: char = '\x0c';

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Text file, or `-` for stdin
    #[arg(required = true)]
    input: String,

    /// Output shape
    #[arg(long, value_enum, default_value = "invoice")]
    variant: VariantArg,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let parser = BillParser::from_config(&config.extraction);

    let text = if args.input == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        text
    } else {
        let path = PathBuf::from(&args.input);
        if !path.exists() {
            anyhow::bail!("Input file not found: {}", path.display());
        }
        fs::read_to_string(&path)?
    };

    let extraction = parse_text(&parser, &text, args.variant.into());
    println!("{}", render(&extraction, args.format, args.pretty)?);

    Ok(())
}

/// Parse text as one bill, or page by page when form feeds separate pages.
fn parse_text(parser: &BillParser, text: &str, variant: Variant) -> Extraction {
    match variant {
        Variant::Invoice => Extraction::Invoice(parser.parse(text)),
        Variant::Pagewise => {
            let pages = text
                .split(FORM_FEED)
                .enumerate()
                .map(|(index, page)| parser.parse_page(index + 1, page))
                .collect();
            Extraction::Pagewise(PagewiseResponse::from_pages(pages))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use billex_core::models::PageType;

    #[test]
    fn test_pagewise_splits_on_form_feed() {
        let text = "Gauze 2 10 20\x0cTotal 20\nFinal settlement";
        let Extraction::Pagewise(response) =
            parse_text(&BillParser::new(), text, Variant::Pagewise)
        else {
            panic!("expected pagewise output");
        };

        let pages = &response.data.pagewise_line_items;
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].bill_items.len(), 1);
        assert_eq!(pages[1].page_no, "2");
        assert_eq!(pages[1].page_type, PageType::FinalBill);
    }

    #[test]
    fn test_invoice_keeps_whole_text() {
        let text = "Bill No: 9\n\x0cX-Ray - ₹300";
        let Extraction::Invoice(invoice) = parse_text(&BillParser::new(), text, Variant::Invoice)
        else {
            panic!("expected invoice output");
        };

        assert_eq!(invoice.bill_no.as_deref(), Some("9"));
        assert_eq!(invoice.line_items.len(), 1);
    }
}
