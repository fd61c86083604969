use serde::Deserialize;

const DEFAULT_NOTION_BASE_URL: &str = "https://api.notion.com";
const DEFAULT_NOTION_VERSION: &str = "2022-06-28";

/// Settings for the quotation webhook server.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub bind_address: String,
    pub port: u16,
    /// Upper bound on request body size, in bytes.
    pub max_body_bytes: usize,
    /// Per-IP ingest rate; 0 disables rate limiting.
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
            max_body_bytes: 1024 * 1024,
            rate_limit_per_second: 10,
            rate_limit_burst: 20,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let config = Self {
            bind_address: std::env::var("BIND_ADDRESS")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.bind_address),
            port: parse_var("PORT", defaults.port)
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            max_body_bytes: parse_var("MAX_BODY_BYTES", defaults.max_body_bytes)
                .map_err(|_| anyhow::anyhow!("MAX_BODY_BYTES must be a positive integer"))
                .and_then(|bytes| {
                    if bytes == 0 {
                        anyhow::bail!("MAX_BODY_BYTES cannot be zero");
                    }
                    Ok(bytes)
                })?,
            rate_limit_per_second: parse_var(
                "RATE_LIMIT_PER_SECOND",
                defaults.rate_limit_per_second,
            )
            .map_err(|_| anyhow::anyhow!("RATE_LIMIT_PER_SECOND must be a non-negative integer"))?,
            rate_limit_burst: parse_var("RATE_LIMIT_BURST", defaults.rate_limit_burst)
                .map_err(|_| anyhow::anyhow!("RATE_LIMIT_BURST must be a positive integer"))
                .and_then(|burst| {
                    if burst == 0 {
                        anyhow::bail!("RATE_LIMIT_BURST cannot be zero");
                    }
                    Ok(burst)
                })?,
        };

        tracing::debug!("Server address: {}:{}", config.bind_address, config.port);
        tracing::debug!("Max body size: {} bytes", config.max_body_bytes);
        if config.rate_limit_per_second == 0 {
            tracing::warn!("Rate limiting disabled (RATE_LIMIT_PER_SECOND=0)");
        } else {
            tracing::debug!(
                "Rate limit: {}/s, burst {}",
                config.rate_limit_per_second,
                config.rate_limit_burst
            );
        }

        Ok(config)
    }
}

/// Settings for the CRM sync deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct CrmConfig {
    pub port: u16,
    pub notion_token: String,
    pub notion_database_id: String,
    pub notion_base_url: String,
    pub notion_version: String,
}

impl CrmConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: parse_var("PORT", 5001)
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            notion_token: std::env::var("NOTION_TOKEN")
                .map_err(|_| anyhow::anyhow!("NOTION_TOKEN environment variable required"))
                .and_then(|token| {
                    if token.trim().is_empty() {
                        anyhow::bail!("NOTION_TOKEN cannot be empty");
                    }
                    Ok(token)
                })?,
            notion_database_id: std::env::var("NOTION_DATABASE_ID")
                .map_err(|_| anyhow::anyhow!("NOTION_DATABASE_ID environment variable required"))
                .and_then(|id| {
                    if id.trim().is_empty() {
                        anyhow::bail!("NOTION_DATABASE_ID cannot be empty");
                    }
                    Ok(id)
                })?,
            notion_base_url: std::env::var("NOTION_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|url| {
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("NOTION_BASE_URL must start with http:// or https://");
                    }
                    Ok(url.trim_end_matches('/').to_string())
                })
                .transpose()?
                .unwrap_or_else(|| DEFAULT_NOTION_BASE_URL.to_string()),
            notion_version: std::env::var("NOTION_VERSION")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_NOTION_VERSION.to_string()),
        };

        tracing::info!("CRM configuration loaded successfully");
        tracing::debug!("Notion Base URL: {}", config.notion_base_url);
        tracing::debug!("Notion API version: {}", config.notion_version);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

/// Reads `key` and parses it, falling back to `default` when unset.
fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T, T::Err> {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().parse(),
        _ => Ok(default),
    }
}
