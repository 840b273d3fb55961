//! HTTP API for bill extraction.
//!
//! Routes:
//! - `GET /` health message
//! - `POST /extract-bill-data` and `/extract-bill-data/upload`: pagewise output
//! - `POST /extract-invoice` and `/extract-invoice/upload`: invoice output
//!
//! JSON routes take `{"document": "<url>"}`; upload routes take a multipart
//! form with a `file` part and/or a `document` URL part.

mod error;
mod handlers;

pub use error::ApiError;
pub use handlers::DocumentRequest;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use billex_core::document::http_client;
use billex_core::models::config::BillexConfig;
use billex_core::{BillPipeline, BillexError, OcrBackend};

/// Shared, read-only request state.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<BillPipeline<Box<dyn OcrBackend>>>,
    client: reqwest::Client,
}

impl AppState {
    pub fn new(ocr: Box<dyn OcrBackend>, config: &BillexConfig) -> Result<Self, BillexError> {
        Ok(Self {
            pipeline: Arc::new(BillPipeline::new(ocr, config)),
            client: http_client(config.server.fetch_timeout_secs)?,
        })
    }
}

/// Build the application router.
pub fn router(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/extract-bill-data", post(handlers::extract_bill_data))
        .route("/extract-bill-data/upload", post(handlers::extract_bill_data_upload))
        .route("/extract-invoice", post(handlers::extract_invoice))
        .route("/extract-invoice/upload", post(handlers::extract_invoice_upload))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl-C.
pub async fn serve(config: &BillexConfig, ocr: Box<dyn OcrBackend>) -> Result<(), BillexError> {
    let state = AppState::new(ocr, config)?;
    let app = router(state, config.server.body_limit_bytes);

    let listener = tokio::net::TcpListener::bind(config.server.bind.as_str()).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, HttpBody, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use billex_core::{StaticTextRecognizer, UnavailableRecognizer};
    use image::{DynamicImage, GrayImage, ImageFormat, Luma};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use std::io::Cursor;
    use tower::ServiceExt;

    const BOUNDARY: &str = "billex-test-boundary";

    const BILL_TEXT: &str = "\
Bill No: 12345
Bill Date: 12-Jan-24
Paracetamol ₹50 /tab x 2 = ₹100
Consultation 1 400 400
Room Rent - ₹400
Final Amount ₹1,000";

    fn app_with(ocr: Box<dyn OcrBackend>) -> Router {
        let config = BillexConfig::default();
        let state = AppState::new(ocr, &config).unwrap();
        router(state, config.server.body_limit_bytes)
    }

    fn app() -> Router {
        app_with(Box::new(StaticTextRecognizer::new(BILL_TEXT)))
    }

    fn png() -> Vec<u8> {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(32, 32, Luma([235])));
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
        bytes
    }

    fn multipart(parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, filename, content) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match filename {
                Some(filename) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/extract-invoice/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    /// A URL on a port nothing listens on.
    async fn dead_url() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}/bill.pdf")
    }

    #[tokio::test]
    async fn test_root() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let (status, body) = send(app(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Bill extraction API is running" }));
    }

    #[tokio::test]
    async fn test_invoice_upload() {
        let (status, body) = send(app(), multipart(&[("file", Some("bill.png"), &png())])).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["bill_no"], "12345");
        assert_eq!(body["final_total"], json!(1000.0));
        assert_eq!(body["line_items"].as_array().unwrap().len(), 2);

        let anomalies: Vec<&str> = body["anomalies"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert!(anomalies.contains(&"Final total mismatch: printed amount differs from computed total."));
        assert!(anomalies.iter().any(|a| a.starts_with("Page 1: ")));
    }

    #[tokio::test]
    async fn test_pagewise_upload() {
        let mut request = multipart(&[("file", Some("bill.png"), &png())]);
        *request.uri_mut() = "/extract-bill-data/upload".parse().unwrap();
        let (status, body) = send(app(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_success"], true);
        assert_eq!(body["token_usage"]["total_tokens"], 0);
        assert_eq!(body["data"]["total_item_count"], 1);
        assert_eq!(body["data"]["pagewise_line_items"][0]["page_no"], "1");
        assert_eq!(body["data"]["pagewise_line_items"][0]["page_type"], "Bill Detail");
    }

    #[tokio::test]
    async fn test_upload_wins_over_url() {
        let url = dead_url().await;
        let request = multipart(&[
            ("document", None, url.as_bytes()),
            ("file", Some("bill.png"), &png()),
        ]);
        let (status, _) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unsupported_upload() {
        let request = multipart(&[("file", Some("bill.docx"), b"PK\x03\x04")]);
        let (status, body) = send(app(), request).await;

        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(body["detail"].as_str().unwrap().contains(".docx"));
    }

    #[tokio::test]
    async fn test_undecodable_upload() {
        let request = multipart(&[("file", Some("bill.png"), b"not really a png")]);
        let (status, _) = send(app(), request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_no_document() {
        let (status, body) = send(app(), json_request("/extract-invoice", json!({}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "detail": "No document provided" }));

        let (status, _) = send(app(), multipart(&[])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unreachable_url() {
        let request = json_request("/extract-bill-data", json!({ "document": dead_url().await }));
        let (status, body) = send(app(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Unable to fetch document");
    }

    #[tokio::test]
    async fn test_body_limit() {
        let state = AppState::new(
            Box::new(StaticTextRecognizer::new(BILL_TEXT)),
            &BillexConfig::default(),
        )
        .unwrap();
        let app = router(state, 64);

        let mut request = multipart(&[("file", Some("bill.png"), &png())]);
        let length = request.body().size_hint().exact().unwrap();
        request
            .headers_mut()
            .insert(header::CONTENT_LENGTH, length.to_string().parse().unwrap());

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_ocr_unavailable() {
        let app = app_with(Box::new(UnavailableRecognizer));
        let (status, _) = send(app, multipart(&[("file", Some("bill.png"), &png())])).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_malformed_json_has_detail() {
        let request = Request::builder()
            .method("POST")
            .uri("/extract-invoice")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"document\": "))
            .unwrap();
        let (status, body) = send(app(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().is_some_and(|d| !d.is_empty()));
    }

    #[tokio::test]
    async fn test_missing_json_content_type_has_detail() {
        let request = Request::builder()
            .method("POST")
            .uri("/extract-bill-data")
            .body(Body::from(json!({ "document": "x" }).to_string()))
            .unwrap();
        let (status, body) = send(app(), request).await;

        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(body["detail"].is_string());
    }
}
