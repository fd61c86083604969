use crate::config::Config;
use crate::errors::AppError;
use crate::models::*;
use crate::query::query;
use crate::store::QuotationStore;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tera::{Context, Tera};
use tokio::sync::RwLock;
use utoipa::OpenApi;

const LISTING_TEMPLATE: &str = "index.html";

/// Shared application state injected into handlers.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Every store access goes through this lock.
    pub store: RwLock<QuotationStore>,
    /// Compiled HTML templates.
    pub templates: Tera,
}

impl AppState {
    /// Builds the state with an empty store and the embedded templates.
    pub fn new(config: Config) -> Result<Self, AppError> {
        let mut templates = Tera::default();
        // The `.html` name keeps Tera's autoescaping on.
        templates.add_raw_template(
            LISTING_TEMPLATE,
            include_str!("../templates/index.html.tera"),
        )?;

        Ok(Self {
            config,
            store: RwLock::new(QuotationStore::new()),
            templates,
        })
    }
}

/// One row of the listing view, pre-formatted for display.
#[derive(Debug, Serialize)]
struct ListingRow {
    id: String,
    customer_name: String,
    item_count: usize,
    item_names: Vec<String>,
    total_amount: String,
    received_at: String,
    received_from_ip: String,
}

impl From<&Quotation> for ListingRow {
    fn from(quotation: &Quotation) -> Self {
        let item_names = quotation
            .items()
            .iter()
            .map(|item| match item.get("name") {
                Some(Value::String(name)) => name.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            })
            .collect::<Vec<_>>();

        Self {
            id: quotation.id().to_string(),
            customer_name: quotation.customer_name().to_string(),
            item_count: item_names.len(),
            item_names,
            total_amount: format_amount(quotation.total_amount()),
            received_at: quotation.received_at().to_string(),
            received_from_ip: quotation.received_from_ip().to_string(),
        }
    }
}

fn format_amount(amount: Option<&Value>) -> String {
    match amount {
        Some(Value::Number(n)) => match n.as_f64() {
            Some(value) => format!("{:.2}", value),
            None => n.to_string(),
        },
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// GET /
///
/// Listing view. `search` and `customer` narrow the results; the page
/// also shows the unfiltered total.
#[utoipa::path(
    get,
    path = "/",
    params(ListingParams),
    responses(
        (status = 200, description = "HTML listing of matching quotations", body = String, content_type = "text/html"),
        (status = 500, description = "Template rendering failed", body = ErrorResponse)
    ),
    tag = "quotations"
)]
pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListingParams>,
) -> Result<Html<String>, AppError> {
    let search = params.search.unwrap_or_default();
    let customer = params.customer.unwrap_or_default();

    let snapshot = state.store.read().await.list_all();
    let results = query(&snapshot, &search, &customer);
    tracing::debug!(
        "Listing view: search={:?}, customer={:?}, {} of {} quotations",
        search,
        customer,
        results.len(),
        snapshot.len()
    );

    let rows: Vec<ListingRow> = results.iter().map(ListingRow::from).collect();

    let mut context = Context::new();
    context.insert("quotations", &rows);
    context.insert("filtered_count", &rows.len());
    context.insert("total_count", &snapshot.len());
    context.insert("search", search.trim());
    context.insert("customer", customer.trim());

    let html = state.templates.render(LISTING_TEMPLATE, &context)?;
    Ok(Html(html))
}

/// GET /api/quotations
///
/// Returns the full, unfiltered store in insertion order.
#[utoipa::path(
    get,
    path = "/api/quotations",
    responses((status = 200, description = "All stored quotations", body = QuotationListResponse)),
    tag = "quotations"
)]
pub async fn list_quotations(State(state): State<Arc<AppState>>) -> Json<QuotationListResponse> {
    let quotations = state.store.read().await.list_all();
    let total_count = quotations.len();

    Json(QuotationListResponse {
        quotations,
        total_count,
    })
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "system"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let quotations_count = state.store.read().await.count();

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            quotations_count,
            timestamp: utc_timestamp(Utc::now()),
        }),
    )
}

/// GET /static/app.js
///
/// Listing page behaviour: auto-refresh, column sorting, health badge and
/// value formatting.
pub async fn app_script() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        include_str!("../static/app.js"),
    )
}

/// GET /api/documentation/openapi.json
pub async fn openapi_spec() -> impl IntoResponse {
    Json(crate::routes::ApiDoc::openapi())
}

/// GET /api/documentation
///
/// Swagger UI page rendering the generated OpenAPI document.
pub async fn documentation() -> impl IntoResponse {
    let html = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Quotation Webhook - API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        body { margin: 0; padding: 0; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = function() {
            window.ui = SwaggerUIBundle({
                url: "/api/documentation/openapi.json",
                dom_id: '#swagger-ui',
                deepLinking: true,
                presets: [SwaggerUIBundle.presets.apis]
            });
        };
    </script>
</body>
</html>
"#;
    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
}
