use crate::crm_models::{CrmSyncRequest, CrmSyncResponse};
use crate::errors::AppError;
use crate::notion_client::NotionClient;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use std::fmt;
use std::sync::Arc;

/// State for the CRM sync deployment. It holds no records of its own.
pub struct CrmState {
    pub notion: NotionClient,
}

/// Failures surfaced by the CRM sync webhook as `{status: "error", message}`.
#[derive(Debug)]
pub enum CrmSyncError {
    /// Request body could not be decoded.
    InvalidRequest(String),
    /// The CRM API rejected the record or could not be reached.
    Upstream(String),
}

impl fmt::Display for CrmSyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrmSyncError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            CrmSyncError::Upstream(msg) => write!(f, "CRM sync failed: {}", msg),
        }
    }
}

impl From<AppError> for CrmSyncError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::ExternalApiError(msg) | AppError::InternalError(msg) => {
                CrmSyncError::Upstream(msg)
            }
            other => CrmSyncError::Upstream(other.to_string()),
        }
    }
}

impl IntoResponse for CrmSyncError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            CrmSyncError::InvalidRequest(msg) => {
                tracing::warn!("Rejected CRM sync request: {}", msg);
                (StatusCode::BAD_REQUEST, msg)
            }
            CrmSyncError::Upstream(msg) => {
                tracing::error!("CRM sync failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(CrmSyncResponse {
            status: "error".to_string(),
            message: Some(message),
        });

        (status, body).into_response()
    }
}

/// Routes served by the CRM sync deployment.
pub fn crm_router(state: Arc<CrmState>) -> Router {
    Router::new()
        .route("/", get(crm_index))
        .route("/webhook", post(crm_webhook))
        .with_state(state)
}

/// GET /
pub async fn crm_index() -> &'static str {
    "ZL Webhook Handler Ready"
}

/// POST /webhook
///
/// Maps the flattened quotation summary onto the CRM schema and creates one
/// record. Upstream failures are reported, never retried.
pub async fn crm_webhook(
    State(state): State<Arc<CrmState>>,
    payload: Result<Json<CrmSyncRequest>, JsonRejection>,
) -> Result<Json<CrmSyncResponse>, CrmSyncError> {
    let Json(request) = payload.map_err(|e| CrmSyncError::InvalidRequest(e.body_text()))?;
    tracing::info!(
        "Received CRM sync for client {:?}",
        request.client_name.as_deref().unwrap_or_default()
    );

    let properties = request.to_properties(Utc::now());
    let page_id = state.notion.create_page(properties).await?;
    tracing::debug!("CRM record {} created", page_id);

    Ok(Json(CrmSyncResponse {
        status: "success".to_string(),
        message: None,
    }))
}
