//! Purchase order PDF rendering through an external document service.
//!
//! The service is handed a purchase order id and answers with the document as
//! base64 text, optionally behind a `data:application/pdf;base64,` prefix. This
//! module owns the seam to that service and the decoding of its payload.

use crate::{
    client::ApiClient,
    core::purchase_order,
    errors::{Error, Result},
};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use sea_orm::DatabaseConnection;
use serde_json::json;
use tracing::{info, instrument};

/// Renders a purchase order into an encoded PDF.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    /// Returns the encoded document for `po_id`.
    async fn render(&self, po_id: &str) -> Result<String>;
}

/// [`PdfRenderer`] backed by a remote action-dispatch endpoint.
pub struct RemotePdfRenderer {
    client: ApiClient,
}

impl RemotePdfRenderer {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PdfRenderer for RemotePdfRenderer {
    async fn render(&self, po_id: &str) -> Result<String> {
        self.client
            .call("createPoPdf", Some(&json!({ "poId": po_id })))
            .await
    }
}

/// Decodes the service payload into PDF bytes.
///
/// Whitespace around the payload and anything up to and including `;base64,` is
/// ignored.
///
/// # Errors
/// [`Error::ExternalService`] when the payload is empty or not valid base64.
pub fn decode_pdf_payload(payload: &str) -> Result<Vec<u8>> {
    let trimmed = payload.trim();
    let encoded = trimmed
        .split_once(";base64,")
        .map_or(trimmed, |(_, data)| data)
        .trim();

    if encoded.is_empty() {
        return Err(Error::ExternalService {
            message: "PDF service returned an empty document".to_string(),
        });
    }

    STANDARD.decode(encoded).map_err(|e| Error::ExternalService {
        message: format!("PDF service returned an undecodable document: {e}"),
    })
}

/// Renders an existing purchase order and returns the encoded document after
/// checking that it decodes.
#[instrument(skip(db, renderer))]
pub async fn render_purchase_order_pdf(
    db: &DatabaseConnection,
    renderer: &dyn PdfRenderer,
    po_id: &str,
) -> Result<String> {
    purchase_order::require_purchase_order(db, po_id).await?;

    let payload = renderer.render(po_id).await?;
    let bytes = decode_pdf_payload(&payload)?;

    info!(po_id, size = bytes.len(), "Purchase order PDF rendered");
    Ok(payload)
}
