use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quotation_webhook::config::Config;
use quotation_webhook::handlers::AppState;
use quotation_webhook::routes::build_router;

/// Main entry point for the quotation webhook server.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading.
/// - The in-memory quotation store and HTML templates.
/// - HTTP routes and middleware (CORS, body limit, rate limiting).
///
/// It then starts the Axum server. Stored quotations live only as long as
/// the process.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quotation_webhook=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    let addr = format!("{}:{}", config.bind_address, config.port);

    let app_state = Arc::new(AppState::new(config)?);
    tracing::info!("Quotation store initialized (in-memory)");

    let app = build_router(app_state)?;

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Peer addresses feed the rate limiter and `received_from_ip`.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
