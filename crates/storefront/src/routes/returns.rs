//! Return-request handler.
//!
//! Evidence photos arrive inline as base64; each is uploaded to the storage
//! bucket first, and the return row then references the resulting public
//! URLs. Uploads are mutations and are never retried.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use uuid::Uuid;

use snorty_core::ProductId;

use crate::backend::{NewReturn, ReturnReceipt};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Storage bucket holding uploaded return evidence.
const EVIDENCE_BUCKET: &str = "return-evidence";

/// Most generous accepted evidence payload, decoded (5 MiB).
const MAX_EVIDENCE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct CreateReturnRequest {
    pub order_id: String,
    pub product_id: ProductId,
    pub reason: String,
    #[serde(default)]
    pub evidence: Vec<EvidenceUpload>,
}

/// One inline evidence photo.
#[derive(Debug, Deserialize)]
pub struct EvidenceUpload {
    pub filename: String,
    pub content_type: String,
    /// Base64-encoded file content.
    pub data: String,
}

/// `POST /api/returns` - file a return request.
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateReturnRequest>,
) -> Result<(StatusCode, Json<ReturnReceipt>)> {
    if request.reason.trim().is_empty() {
        return Err(AppError::BadRequest("A return reason is required".to_owned()));
    }

    let mut evidence_urls = Vec::with_capacity(request.evidence.len());
    for upload in &request.evidence {
        let bytes = BASE64
            .decode(&upload.data)
            .map_err(|_| AppError::BadRequest(format!("invalid base64 in {}", upload.filename)))?;
        if bytes.len() > MAX_EVIDENCE_BYTES {
            return Err(AppError::BadRequest(format!(
                "{} exceeds the evidence size limit",
                upload.filename
            )));
        }

        let path = format!(
            "{}/{}-{}",
            request.order_id,
            Uuid::new_v4(),
            urlencoding::encode(&upload.filename)
        );
        let url = state
            .backend()
            .upload_object(EVIDENCE_BUCKET, &path, &upload.content_type, bytes)
            .await?;
        evidence_urls.push(url);
    }

    let receipt = state
        .backend()
        .create_return(&NewReturn {
            order_id: request.order_id,
            product_id: request.product_id,
            reason: request.reason,
            evidence_urls,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(receipt)))
}
