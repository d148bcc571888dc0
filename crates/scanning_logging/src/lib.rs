//! Shared logging setup for the scanning service.
//!
//! `init_logging` installs the process-wide subscriber once at startup.
//! Tests should not rely on it; they scope a subscriber with
//! `tracing::subscriber::with_default(test_subscriber(), ...)`.

use anyhow::{Context, Result};
use std::str::FromStr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "scanning_service=info,scanning_documents=info,scanning_schema=info,scanning_sirius=info,scanning_store=info,tower_http=warn";

/// Output encoding of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    /// One JSON object per line, for log shipping.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}', expected text or json", other)),
        }
    }
}

/// Logging configuration for service binaries.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    pub verbose: bool,
    pub format: LogFormat,
}

/// Initialize tracing with stdout output.
///
/// `RUST_LOG` wins over the built-in filter. `verbose` lowers the default to debug.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new(DEFAULT_LOG_FILTER)
        }
    });

    let json = config.format == LogFormat::Json;
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_target(true));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .with_context(|| format!("Failed to initialize logging for {}", config.app_name))?;

    Ok(())
}

/// Subscriber for tests: everything at debug, written through the test harness.
pub fn test_subscriber() -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .finish()
}
