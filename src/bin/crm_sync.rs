//! CRM sync server: forwards flattened quotation summaries to Notion.
//!
//! Requires `NOTION_TOKEN` and `NOTION_DATABASE_ID`.

use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quotation_webhook::config::CrmConfig;
use quotation_webhook::crm_handler::{crm_router, CrmState};
use quotation_webhook::notion_client::NotionClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quotation_webhook=debug,crm_sync=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CrmConfig::from_env()?;

    let notion = NotionClient::new(&config)?;
    tracing::info!("✓ Notion client initialized: {}", config.notion_base_url);

    let app = crm_router(Arc::new(CrmState { notion })).layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("CRM sync server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
