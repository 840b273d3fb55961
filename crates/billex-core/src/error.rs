//! Error types for the billex-core library.

use thiserror::Error;

/// Main error type for the billex library.
#[derive(Error, Debug)]
pub enum BillexError {
    /// Document source or type error.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Remote document could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to choosing and decoding the input document.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// Neither an upload nor a URL was supplied.
    #[error("no document provided")]
    NoDocument,

    /// The document is neither a PDF nor a supported raster image.
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    /// The image bytes could not be decoded.
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// No OCR engine is configured.
    #[error("OCR engine not available: configure a model directory")]
    NotAvailable,
}

/// Errors raised while downloading a document from a URL.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport-level failure (DNS, connect, timeout, body read).
    #[error("unable to fetch document: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("unable to fetch document: HTTP {0}")]
    Status(u16),
}

/// Result type for the billex library.
pub type Result<T> = std::result::Result<T, BillexError>;
