use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::errors::CoreError;
use crate::models::config::LoggingConfig;

/// Install a global `tracing` subscriber for applications embedding the core.
///
/// `RUST_LOG` takes precedence over `config.level`; an unparsable directive
/// falls back to "info". Fails if a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<(), CoreError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if config.json {
        registry.with(fmt::layer().json().with_target(true)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    result.map_err(|e| CoreError::Logging(e.to_string()))
}
