//! Core library for bill and invoice extraction.
//!
//! This crate provides:
//! - Document acquisition (uploads, URLs) and PDF/image page loading
//! - Page preprocessing and OCR backends
//! - Rule-based extraction of header fields, line items and printed totals
//! - Reconciliation of items against printed totals and anomaly flags
//! - Invoice and pagewise output models

pub mod anomaly;
pub mod document;
pub mod error;
pub mod invoice;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;

pub use anomaly::AnomalyDetector;
pub use document::{load_pages, resolve_source, Document, DocumentKind, DocumentSource, Page, PageContent, Upload};
pub use error::{BillexError, DocumentError, FetchError, OcrError, PdfError, Result};
pub use invoice::BillParser;
pub use models::config::BillexConfig;
pub use models::{InvoiceOutput, LineItem, PageType, PagewiseResponse, TotalKey, TotalsMap};
pub use ocr::{backend_from_config, OcrBackend, StaticTextRecognizer, UnavailableRecognizer};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use pipeline::{BillPipeline, Extraction, PageReading, Variant};
