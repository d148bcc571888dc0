//! Scanning ingestion service.
//!
//! Usage:
//!     scanning-service --http-port 8081 --xsd-path ./xsd
//!
//! Every flag can also be set through its environment variable, see `--help`.

use clap::Parser;
use scanning_logging::{init_logging, LogConfig};
use scanning_service::ServiceConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::parse();

    init_logging(LogConfig {
        app_name: "scanning-service",
        verbose: config.verbose,
        format: config.log_format,
    })?;

    tracing::info!("Starting scanning service");
    tracing::info!("  Port: {}", config.http_port);
    tracing::info!("  Schemas: {}", config.xsd_path.display());
    tracing::info!("  Sirius: {}", config.sirius_base_url);

    scanning_service::serve(config).await
}
