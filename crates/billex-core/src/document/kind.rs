//! Document type detection.

use crate::error::DocumentError;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff", "bmp", "webp"];

/// Supported document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Image,
}

impl DocumentKind {
    /// Decide the kind from the source name, falling back to the content
    /// when the name has no extension.
    ///
    /// A name with an unknown extension is rejected even if the bytes would
    /// decode.
    pub fn detect(name: Option<&str>, bytes: &[u8]) -> Result<Self, DocumentError> {
        match name.and_then(extension_of) {
            Some(ext) => Self::from_extension(&ext),
            None => Self::sniff(bytes),
        }
    }

    pub fn from_extension(ext: &str) -> Result<Self, DocumentError> {
        let ext = ext.to_ascii_lowercase();
        if ext == "pdf" {
            Ok(Self::Pdf)
        } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Ok(Self::Image)
        } else {
            Err(DocumentError::UnsupportedType(format!(".{ext}")))
        }
    }

    /// Detect the kind from magic bytes.
    pub fn sniff(bytes: &[u8]) -> Result<Self, DocumentError> {
        if bytes.starts_with(b"%PDF-") {
            Ok(Self::Pdf)
        } else if image::guess_format(bytes).is_ok() {
            Ok(Self::Image)
        } else {
            Err(DocumentError::UnsupportedType(
                "unrecognized content".to_string(),
            ))
        }
    }
}

/// Lower-cased extension of a file name or URL path, ignoring any query
/// string or fragment.
pub fn extension_of(name: &str) -> Option<String> {
    let path = name.split(['?', '#']).next().unwrap_or(name);
    let file = path.rsplit(['/', '\\']).next().unwrap_or(path);

    match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext.to_ascii_lowercase()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("bill.PDF").as_deref(), Some("pdf"));
        assert_eq!(
            extension_of("https://host/files/scan.jpeg?sig=a.b#p=1").as_deref(),
            Some("jpeg")
        );
        assert_eq!(extension_of("https://host/download"), None);
        assert_eq!(extension_of(".hidden"), None);
        assert_eq!(extension_of("trailing."), None);
    }

    #[test]
    fn test_extension_decides() {
        assert_eq!(DocumentKind::detect(Some("a.pdf"), b"").ok(), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::detect(Some("a.tif"), b"").ok(), Some(DocumentKind::Image));
        // Extension wins over content.
        assert_eq!(
            DocumentKind::detect(Some("scan.png"), b"%PDF-1.7").ok(),
            Some(DocumentKind::Image)
        );
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        assert!(matches!(
            DocumentKind::detect(Some("notes.docx"), b"%PDF-1.7"),
            Err(DocumentError::UnsupportedType(ext)) if ext == ".docx"
        ));
    }

    #[test]
    fn test_sniffing_without_extension() {
        assert_eq!(DocumentKind::detect(None, b"%PDF-1.4\n").ok(), Some(DocumentKind::Pdf));
        assert_eq!(
            DocumentKind::detect(Some("upload"), b"\x89PNG\r\n\x1a\n0000").ok(),
            Some(DocumentKind::Image)
        );
        assert!(DocumentKind::detect(None, b"hello").is_err());
    }
}
