use serde::{Deserialize, Serialize};
use std::env;

/// Default freshness window for fetched exchange rates (5 minutes).
pub const DEFAULT_RATE_CACHE_TTL_SECS: u64 = 300;

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Runtime configuration of the library (as opposed to user `AppSettings`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Base URL of the part-number mapping backend, e.g. `https://example.org`.
    /// `None` keeps the mapping table purely local.
    pub mapping_store_url: Option<String>,

    pub rate_cache_ttl_secs: u64,

    pub http_timeout_secs: u64,

    /// Maximum number of calculations kept in history.
    pub history_limit: usize,

    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset, e.g. "info" or "resale_pricing_core=debug".
    pub level: String,

    /// Emit JSON lines instead of the human-readable format.
    pub json: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            mapping_store_url: None,
            rate_cache_ttl_secs: DEFAULT_RATE_CACHE_TTL_SECS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            history_limit: DEFAULT_HISTORY_LIMIT,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl CoreConfig {
    /// Defaults overlaid with `PRICING_*` environment variables.
    /// Unparsable values are ignored and the default is kept.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("PRICING_MAPPING_STORE_URL") {
            let url = url.trim();
            if !url.is_empty() {
                config.mapping_store_url = Some(url.trim_end_matches('/').to_string());
            }
        }
        if let Some(ttl) = parse_var("PRICING_RATE_CACHE_TTL_SECS") {
            config.rate_cache_ttl_secs = ttl;
        }
        if let Some(timeout) = parse_var("PRICING_HTTP_TIMEOUT_SECS") {
            config.http_timeout_secs = timeout;
        }
        if let Some(limit) = parse_var::<usize>("PRICING_HISTORY_LIMIT") {
            if limit > 0 {
                config.history_limit = limit;
            }
        }
        if let Ok(level) = env::var("PRICING_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(json) = parse_var("PRICING_LOG_JSON") {
            config.logging.json = json;
        }

        config
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok()?.trim().parse().ok()
}
