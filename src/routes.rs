use crate::errors::AppError;
use crate::handlers::{self, AppState};
use crate::models::{ErrorResponse, HealthResponse, IngestResponse, QuotationListResponse};
use crate::webhook_handler::{self, LineItemPayload, QuotationPayload};
use axum::{
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::any::Any;
use std::sync::Arc;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorError,
    GovernorLayer,
};
use tower_http::{
    catch_panic::CatchPanicLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

/// OpenAPI document served at `/api/documentation/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Quotation Webhook API",
        description = "Receives quotation webhooks, stores them in memory and lists them."
    ),
    paths(
        webhook_handler::receive_quotation,
        handlers::index,
        handlers::list_quotations,
        handlers::health
    ),
    components(schemas(
        QuotationPayload,
        LineItemPayload,
        IngestResponse,
        ErrorResponse,
        QuotationListResponse,
        HealthResponse
    )),
    tags(
        (name = "quotations", description = "Quotation ingest and listing"),
        (name = "system", description = "Service health")
    )
)]
pub struct ApiDoc;

/// Builds the full HTTP surface of the quotation service.
///
/// The ingest route is rate limited per client IP unless
/// `rate_limit_per_second` is 0; read-only routes are never limited.
/// Panics inside a handler become a 500, and rate-limit and body-limit
/// rejections are rewritten, so every error carries the standard body.
pub fn build_router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let config = state.config.clone();

    let mut ingest_routes = Router::new().route(
        "/webhook/quotations",
        post(webhook_handler::receive_quotation),
    );

    if config.rate_limit_per_second > 0 {
        let governor_conf = GovernorConfigBuilder::default()
            .per_millisecond(replenish_interval_ms(config.rate_limit_per_second))
            .burst_size(config.rate_limit_burst)
            .key_extractor(SmartIpKeyExtractor)
            .error_handler(rate_limit_response)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limit configuration"))?;

        ingest_routes = ingest_routes.layer(GovernorLayer {
            config: Arc::new(governor_conf),
        });
    }

    let app = Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/quotations", get(handlers::list_quotations))
        .route("/static/app.js", get(handlers::app_script))
        .route("/api/documentation", get(handlers::documentation))
        .route(
            "/api/documentation/openapi.json",
            get(handlers::openapi_spec),
        )
        .merge(ingest_routes)
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(middleware::map_response(payload_too_large_as_json))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    Ok(app)
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    AppError::InternalError(format!("Handler panicked: {}", detail)).into_response()
}

/// Milliseconds between quota refills for a sustained `per_second` rate.
fn replenish_interval_ms(per_second: u64) -> u64 {
    (1000 / per_second.max(1)).max(1)
}

fn rate_limit_response(error: GovernorError) -> Response {
    match error {
        GovernorError::TooManyRequests { wait_time, .. } => AppError::RateLimited {
            wait_secs: wait_time,
        }
        .into_response(),
        other => AppError::InternalError(format!("Rate limiter failed: {}", other)).into_response(),
    }
}

async fn payload_too_large_as_json(response: Response) -> Response {
    if response.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge.into_response()
    } else {
        response
    }
}
