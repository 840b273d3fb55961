//! Where a document comes from: an uploaded file or a URL.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::{Document, DocumentKind};
use crate::error::{BillexError, DocumentError, FetchError};

/// An uploaded file.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: Option<String>, bytes: Vec<u8>) -> Self {
        Self { filename, bytes }
    }
}

/// The chosen document source for one request.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    Upload(Upload),
    Url(String),
}

/// Pick the document source. An upload always wins over a URL; the URL is
/// then ignored entirely, including for type detection.
pub fn resolve_source(
    upload: Option<Upload>,
    url: Option<String>,
) -> Result<DocumentSource, DocumentError> {
    let url = url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty());

    match (upload, url) {
        (Some(upload), url) => {
            if let Some(url) = url {
                warn!("Both a file and a URL were provided; ignoring URL {}", url);
            }
            Ok(DocumentSource::Upload(upload))
        }
        (None, Some(url)) => Ok(DocumentSource::Url(url)),
        (None, None) => Err(DocumentError::NoDocument),
    }
}

impl DocumentSource {
    /// Obtain the document bytes and decide its kind.
    pub async fn acquire(self, client: &reqwest::Client) -> Result<Document, BillexError> {
        match self {
            DocumentSource::Upload(upload) => {
                let kind = DocumentKind::detect(upload.filename.as_deref(), &upload.bytes)?;
                info!(
                    "Received upload {} ({} bytes, {:?})",
                    upload.filename.as_deref().unwrap_or("<unnamed>"),
                    upload.bytes.len(),
                    kind
                );
                Ok(Document {
                    kind,
                    bytes: upload.bytes,
                })
            }
            DocumentSource::Url(url) => {
                let bytes = fetch_document(client, &url).await?;
                let path = reqwest::Url::parse(&url)
                    .map(|u| u.path().to_string())
                    .unwrap_or(url);
                let kind = DocumentKind::detect(Some(&path), &bytes)?;
                Ok(Document { kind, bytes })
            }
        }
    }
}

/// HTTP client used for document downloads.
pub fn http_client(timeout_secs: u64) -> Result<reqwest::Client, FetchError> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!("billex/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

/// Download a document. Non-success statuses are errors; there is no retry.
pub async fn fetch_document(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, FetchError> {
    debug!("Fetching document from {}", url);

    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        warn!("Fetching {} failed with HTTP {}", url, status.as_u16());
        return Err(FetchError::Status(status.as_u16()));
    }

    let bytes = response.bytes().await?;
    info!("Fetched {} bytes from {}", bytes.len(), url);
    Ok(bytes.to_vec())
}
