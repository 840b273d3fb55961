//! End-to-end extraction: pages to text to structured output.

use std::time::Instant;

use image::DynamicImage;
use serde::Serialize;
use tracing::{debug, info};

use crate::anomaly::AnomalyDetector;
use crate::document::{Document, Page, PageContent};
use crate::error::{OcrError, Result};
use crate::invoice::BillParser;
use crate::models::config::{BillexConfig, PdfConfig};
use crate::models::{InvoiceOutput, PagewiseResponse};
use crate::ocr::{ImagePreprocessor, OcrBackend};

/// Separator placed between page texts before invoice parsing.
pub const PAGE_BREAK: &str = "\n\n---- PAGE BREAK ----\n\n";

/// Output shape requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// One aggregated invoice with reconciliation.
    #[default]
    Invoice,
    /// Table rows per page.
    Pagewise,
}

/// Result of running the pipeline on a document.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Extraction {
    Invoice(InvoiceOutput),
    Pagewise(PagewiseResponse),
}

/// Text and anomaly flags read from one page.
#[derive(Debug, Clone)]
pub struct PageReading {
    pub page_no: usize,
    pub text: String,
    pub anomalies: Vec<&'static str>,
}

/// Bill extraction pipeline over an OCR backend.
pub struct BillPipeline<R> {
    ocr: R,
    preprocessor: ImagePreprocessor,
    detector: AnomalyDetector,
    parser: BillParser,
    pdf: PdfConfig,
}

impl<R: OcrBackend> BillPipeline<R> {
    pub fn new(ocr: R, config: &BillexConfig) -> Self {
        Self {
            ocr,
            preprocessor: ImagePreprocessor::from_config(config.preprocess.clone()),
            detector: AnomalyDetector::new(config.anomaly.clone()),
            parser: BillParser::from_config(&config.extraction),
            pdf: config.pdf.clone(),
        }
    }

    /// Load pages and extract the requested variant.
    pub fn run(&self, document: &Document, variant: Variant) -> Result<Extraction> {
        let start = Instant::now();
        let pages = document.pages(&self.pdf)?;

        let extraction = match variant {
            Variant::Invoice => Extraction::Invoice(self.extract_invoice(&pages)?),
            Variant::Pagewise => Extraction::Pagewise(self.extract_pagewise(&pages)?),
        };

        info!(
            "Extracted {:?} output from {} pages in {}ms",
            variant,
            pages.len(),
            start.elapsed().as_millis()
        );
        Ok(extraction)
    }

    /// Read text from every page. Image pages are preprocessed, checked for
    /// anomalies and OCRed; text pages are used as-is.
    pub fn read_pages(&self, pages: &[Page]) -> std::result::Result<Vec<PageReading>, OcrError> {
        pages.iter().map(|page| self.read_page(page)).collect()
    }

    fn read_page(&self, page: &Page) -> std::result::Result<PageReading, OcrError> {
        match &page.content {
            PageContent::Text(text) => {
                debug!("Page {}: {} chars of embedded text", page.number, text.len());
                Ok(PageReading {
                    page_no: page.number,
                    text: text.clone(),
                    anomalies: Vec::new(),
                })
            }
            PageContent::Image(image) => {
                let start = Instant::now();
                let prepared = self.preprocessor.prepare(image);
                let anomalies = self.detector.detect(&prepared);
                let text = self.ocr.recognize(&DynamicImage::ImageLuma8(prepared))?;

                debug!(
                    "Page {}: OCR produced {} chars in {}ms",
                    page.number,
                    text.len(),
                    start.elapsed().as_millis()
                );
                Ok(PageReading {
                    page_no: page.number,
                    text,
                    anomalies,
                })
            }
        }
    }

    /// Parse all pages as one bill.
    pub fn extract_invoice(&self, pages: &[Page]) -> std::result::Result<InvoiceOutput, OcrError> {
        let readings = self.read_pages(pages)?;

        let text = readings
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join(PAGE_BREAK);

        let mut output = self.parser.parse(&text);
        for reading in &readings {
            output.anomalies.extend(
                reading
                    .anomalies
                    .iter()
                    .map(|message| format!("Page {}: {}", reading.page_no, message)),
            );
        }

        Ok(output)
    }

    /// Extract table rows and a page type for each page.
    pub fn extract_pagewise(
        &self,
        pages: &[Page],
    ) -> std::result::Result<PagewiseResponse, OcrError> {
        let items = self
            .read_pages(pages)?
            .iter()
            .map(|reading| self.parser.parse_page(reading.page_no, &reading.text))
            .collect();

        Ok(PagewiseResponse::from_pages(items))
    }
}
