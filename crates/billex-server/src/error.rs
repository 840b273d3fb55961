//! API error responses.

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{error, warn};

use billex_core::{BillexError, DocumentError};

/// Error returned by a handler, rendered as `{"detail": ...}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }
}

impl From<BillexError> for ApiError {
    fn from(err: BillexError) -> Self {
        match &err {
            BillexError::Fetch(_) => {
                warn!("{}", err);
                Self::new(StatusCode::BAD_REQUEST, "Unable to fetch document")
            }
            BillexError::Document(DocumentError::NoDocument) => {
                Self::new(StatusCode::BAD_REQUEST, "No document provided")
            }
            BillexError::Document(DocumentError::UnsupportedType(_)) => {
                Self::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, err.to_string())
            }
            BillexError::Document(DocumentError::Decode(_)) | BillexError::Pdf(_) => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            _ => {
                error!("Extraction failed: {}", err);
                Self::internal(err.to_string())
            }
        }
    }
}

impl From<DocumentError> for ApiError {
    fn from(err: DocumentError) -> Self {
        BillexError::from(err).into()
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::new(err.status(), format!("invalid multipart body: {}", err.body_text()))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        Self::new(err.status(), err.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use billex_core::{FetchError, OcrError};

    #[test]
    fn test_status_mapping() {
        let cases = [
            (BillexError::Fetch(FetchError::Status(404)), StatusCode::BAD_REQUEST),
            (DocumentError::NoDocument.into(), StatusCode::BAD_REQUEST),
            (
                DocumentError::UnsupportedType(".docx".to_string()).into(),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (
                BillexError::Pdf(billex_core::PdfError::NoPages),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (OcrError::NotAvailable.into(), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn test_fetch_detail() {
        let err = ApiError::from(BillexError::Fetch(FetchError::Status(500)));
        assert_eq!(err.detail, "Unable to fetch document");
    }
}
