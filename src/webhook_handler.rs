use crate::errors::AppError;
use crate::handlers::AppState;
use crate::models::IngestResponse;
use crate::validator::validate;
use axum::{
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{header, HeaderMap},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use utoipa::ToSchema;

/// Documented shape of an inbound quotation. Extra fields are accepted
/// and stored verbatim.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QuotationPayload {
    /// String or integer, unique per quotation.
    #[schema(value_type = Object)]
    pub id: Value,
    pub customer_name: String,
    /// At least one line item.
    pub items: Vec<LineItemPayload>,
    pub total_amount: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LineItemPayload {
    pub name: String,
    #[schema(value_type = Object)]
    pub quantity: Value,
    #[schema(value_type = Object)]
    pub unit_price: Value,
}

/// Quotation webhook handler.
///
/// Flow:
/// 1. Require a JSON content type.
/// 2. Decode the body.
/// 3. Validate the quotation shape (first failure wins).
/// 4. Upsert into the store, stamped with receive time and origin.
///
/// Any rejection happens before the store is touched.
#[utoipa::path(
    post,
    path = "/webhook/quotations",
    request_body(content = QuotationPayload, content_type = "application/json"),
    responses(
        (status = 200, description = "Quotation stored", body = IngestResponse),
        (status = 400, description = "Wrong content type, malformed JSON or invalid quotation", body = ErrorResponse),
        (status = 500, description = "Unexpected internal failure", body = ErrorResponse)
    ),
    tag = "quotations"
)]
pub async fn receive_quotation(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<IngestResponse>, AppError> {
    let origin = client_ip(&headers, connect_info.map(|ConnectInfo(addr)| addr));
    tracing::info!("Received quotation webhook from {}", origin);

    if !is_json_content_type(&headers) {
        return Err(AppError::InvalidContentType);
    }

    let payload: Value = serde_json::from_slice(&body)?;
    let quotation = validate(payload)?;
    let raw_id = quotation.raw_id();

    let (id, total) = {
        let mut store = state.store.write().await;
        let id = store.upsert(quotation, &origin);
        (id, store.count())
    };

    tracing::info!("✓ Stored quotation {} ({} in store)", id, total);

    Ok(Json(IngestResponse {
        success: true,
        message: format!("Quotation {} received successfully", id),
        id: raw_id,
    }))
}

/// Accepts `application/json` and `application/*+json`, ignoring parameters.
fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };

    let mime = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// Resolves the caller's address: proxy headers first, then the peer socket.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded
        .or(real_ip)
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}
