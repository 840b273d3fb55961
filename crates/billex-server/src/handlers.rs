//! Route handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use billex_core::document::{DocumentSource, Upload, resolve_source};
use billex_core::models::{InvoiceOutput, PagewiseResponse};
use billex_core::{Extraction, Variant};

use crate::AppState;
use crate::error::ApiError;

/// JSON request body: a document URL.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DocumentRequest {
    pub document: Option<String>,
}

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Bill extraction API is running" }))
}

pub async fn extract_bill_data(
    State(state): State<AppState>,
    request: Result<Json<DocumentRequest>, JsonRejection>,
) -> Result<Json<PagewiseResponse>, ApiError> {
    let Json(request) = request?;
    let source = resolve_source(None, request.document)?;
    pagewise(state, source).await
}

pub async fn extract_bill_data_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PagewiseResponse>, ApiError> {
    let source = read_multipart(multipart).await?;
    pagewise(state, source).await
}

pub async fn extract_invoice(
    State(state): State<AppState>,
    request: Result<Json<DocumentRequest>, JsonRejection>,
) -> Result<Json<InvoiceOutput>, ApiError> {
    let Json(request) = request?;
    let source = resolve_source(None, request.document)?;
    invoice(state, source).await
}

pub async fn extract_invoice_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<InvoiceOutput>, ApiError> {
    let source = read_multipart(multipart).await?;
    invoice(state, source).await
}

async fn pagewise(state: AppState, source: DocumentSource) -> Result<Json<PagewiseResponse>, ApiError> {
    match run(state, source, Variant::Pagewise).await? {
        Extraction::Pagewise(response) => Ok(Json(response)),
        Extraction::Invoice(_) => Err(ApiError::internal("unexpected invoice output")),
    }
}

async fn invoice(state: AppState, source: DocumentSource) -> Result<Json<InvoiceOutput>, ApiError> {
    match run(state, source, Variant::Invoice).await? {
        Extraction::Invoice(output) => Ok(Json(output)),
        Extraction::Pagewise(_) => Err(ApiError::internal("unexpected pagewise output")),
    }
}

/// Acquire the document, then run the CPU-bound pipeline off the async
/// executor.
async fn run(state: AppState, source: DocumentSource, variant: Variant) -> Result<Extraction, ApiError> {
    let document = source.acquire(&state.client).await?;
    info!("Extracting {:?} from {} byte {:?} document", variant, document.bytes.len(), document.kind);

    let extraction = tokio::task::spawn_blocking(move || state.pipeline.run(&document, variant))
        .await
        .map_err(|e| ApiError::internal(format!("extraction task failed: {}", e)))??;

    Ok(extraction)
}

/// Collect the `file` upload and the `document` URL from a form.
async fn read_multipart(mut multipart: Multipart) -> Result<DocumentSource, ApiError> {
    let mut upload = None;
    let mut url = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().map(str::to_string);
                let bytes = field.bytes().await?;
                debug!("Multipart file {:?}, {} bytes", filename, bytes.len());
                upload = Some(Upload::new(filename, bytes.to_vec()));
            }
            Some("document") => {
                url = Some(field.text().await?);
            }
            other => debug!("Ignoring multipart field {:?}", other),
        }
    }

    Ok(resolve_source(upload, url)?)
}
