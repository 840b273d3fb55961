//! Document acquisition and page loading.

mod kind;
mod source;

pub use kind::{extension_of, DocumentKind};
pub use source::{fetch_document, http_client, resolve_source, DocumentSource, Upload};

use image::DynamicImage;
use tracing::{debug, enabled, info, Level};

use crate::error::{BillexError, DocumentError};
use crate::models::config::PdfConfig;
use crate::pdf::PdfExtractor;

/// Raw document bytes with their detected kind.
#[derive(Debug, Clone)]
pub struct Document {
    pub kind: DocumentKind,
    pub bytes: Vec<u8>,
}

impl Document {
    pub fn new(kind: DocumentKind, bytes: Vec<u8>) -> Self {
        Self { kind, bytes }
    }

    /// Split the document into pages.
    pub fn pages(&self, config: &PdfConfig) -> Result<Vec<Page>, BillexError> {
        load_pages(&self.bytes, self.kind, config)
    }
}

/// What a page provides to the pipeline.
#[derive(Debug, Clone)]
pub enum PageContent {
    /// A raster image that needs OCR.
    Image(DynamicImage),
    /// Text embedded in the document; no OCR needed.
    Text(String),
}

/// One page of a document.
#[derive(Debug, Clone)]
pub struct Page {
    /// 1-based page number.
    pub number: usize,
    pub content: PageContent,
}

impl Page {
    pub fn image(number: usize, image: DynamicImage) -> Self {
        Self {
            number,
            content: PageContent::Image(image),
        }
    }

    pub fn text(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            content: PageContent::Text(text.into()),
        }
    }
}

/// Load the pages of a document.
///
/// An image is a single page. A PDF yields one page per PDF page: its
/// largest embedded image, otherwise its embedded text (possibly empty).
pub fn load_pages(
    bytes: &[u8],
    kind: DocumentKind,
    config: &PdfConfig,
) -> Result<Vec<Page>, BillexError> {
    match kind {
        DocumentKind::Image => {
            let image = image::load_from_memory(bytes).map_err(DocumentError::Decode)?;
            debug!("Decoded image {}x{}", image.width(), image.height());
            Ok(vec![Page::image(1, image)])
        }
        DocumentKind::Pdf => {
            let pdf = PdfExtractor::load(bytes)?;
            if enabled!(Level::DEBUG) {
                debug!("PDF content type: {:?}", pdf.analyze());
            }

            let pages: Vec<Page> = pdf
                .pages(config.max_pages)
                .into_iter()
                .enumerate()
                .map(|(index, page)| match page.image {
                    Some(image) => Page::image(index + 1, image),
                    None => Page::text(index + 1, page.text),
                })
                .collect();

            info!("Loaded {} of {} PDF pages", pages.len(), pdf.page_count());
            Ok(pages)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PdfError;
    use crate::pdf::tests::{build_pdf, TestPage};
    use image::{GrayImage, ImageFormat, Luma};
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(10, 6, Luma([240])));
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
        bytes
    }

    #[test]
    fn test_image_is_single_page() {
        let pages = load_pages(&png_bytes(), DocumentKind::Image, &PdfConfig::default()).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].number, 1);
        assert!(matches!(&pages[0].content, PageContent::Image(img) if img.width() == 10));
    }

    #[test]
    fn test_undecodable_image() {
        let err = load_pages(b"not an image", DocumentKind::Image, &PdfConfig::default())
            .unwrap_err();
        assert!(matches!(err, BillexError::Document(DocumentError::Decode(_))));
    }

    #[test]
    fn test_pdf_pages_mix_text_and_images() {
        let bytes = build_pdf(&[TestPage::Text("Bill No: 9"), TestPage::Image(20, 30)]);
        let pages = load_pages(&bytes, DocumentKind::Pdf, &PdfConfig::default()).unwrap();

        assert_eq!(pages.len(), 2);
        assert!(matches!(&pages[0].content, PageContent::Text(t) if t.contains("Bill No: 9")));
        assert!(matches!(&pages[1].content, PageContent::Image(img) if img.height() == 30));
    }

    #[test]
    fn test_pdf_page_limit() {
        let bytes = build_pdf(&[TestPage::Text("a"), TestPage::Text("b")]);
        let config = PdfConfig { max_pages: 1 };
        assert_eq!(load_pages(&bytes, DocumentKind::Pdf, &config).unwrap().len(), 1);
    }

    #[test]
    fn test_broken_pdf() {
        let err = load_pages(b"%PDF-1.4 garbage", DocumentKind::Pdf, &PdfConfig::default())
            .unwrap_err();
        assert!(matches!(err, BillexError::Pdf(PdfError::Parse(_) | PdfError::NoPages)));
    }
}
