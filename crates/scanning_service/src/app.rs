//! Wiring of configuration into a running server.

use crate::auth::{AuthSettings, Authenticator, EnvSecretSource, SecretSource};
use crate::config::{ServiceConfig, StoreBackend};
use crate::ingest::{Backends, Ingestor};
use crate::routes::{router, AppState};
use anyhow::{Context, Result};
use scanning_schema::SchemaCatalogue;
use scanning_sirius::{CaseService, SiriusClient};
use scanning_store::{
    DocumentTracker, JobQueue, MemoryDocumentTracker, MemoryJobQueue, MemoryObjectStore,
    ObjectStore,
};
use std::sync::Arc;
use tracing::info;

/// Envelope schema every set is checked against.
const SET_SCHEMA: &str = "SET.xsd";

struct Stores {
    objects: Arc<dyn ObjectStore>,
    jobs: Arc<dyn JobQueue>,
    tracker: Arc<dyn DocumentTracker>,
    secrets: Arc<dyn SecretSource>,
}

fn memory_stores() -> Stores {
    Stores {
        objects: Arc::new(MemoryObjectStore::new()),
        jobs: Arc::new(MemoryJobQueue::new()),
        tracker: Arc::new(MemoryDocumentTracker::new()),
        secrets: Arc::new(EnvSecretSource),
    }
}

#[cfg(feature = "aws")]
async fn aws_stores(config: &ServiceConfig) -> Result<Stores> {
    use crate::auth::secrets::AwsSecretSource;
    use scanning_store::aws::{sdk_config, DynamoDocumentTracker, S3ObjectStore, SqsJobQueue};

    let sdk = sdk_config(&config.aws_region, config.aws_endpoint.as_deref()).await;
    Ok(Stores {
        objects: Arc::new(S3ObjectStore::new(
            &sdk,
            config.bucket_name.clone(),
            config.encryption_key.clone(),
        )),
        jobs: Arc::new(SqsJobQueue::new(&sdk, config.queue_url.clone())),
        tracker: Arc::new(DynamoDocumentTracker::new(
            &sdk,
            config.documents_table.clone(),
        )),
        secrets: Arc::new(AwsSecretSource::new(
            &sdk,
            config.jwt_secret_name.clone(),
            config.credentials_name.clone(),
        )),
    })
}

#[cfg(not(feature = "aws"))]
async fn aws_stores(_config: &ServiceConfig) -> Result<Stores> {
    Err(crate::config::ConfigError::BackendUnavailable("aws").into())
}

pub async fn build_state(config: &ServiceConfig) -> Result<AppState> {
    config.check_backend()?;

    let catalogue = Arc::new(SchemaCatalogue::new(&config.xsd_path));
    catalogue.load(SET_SCHEMA).with_context(|| {
        format!(
            "Failed to load {} from {}",
            SET_SCHEMA,
            config.xsd_path.display()
        )
    })?;

    let case_service: Arc<dyn CaseService> =
        Arc::new(SiriusClient::new(config.sirius()).context("Failed to build Sirius client")?);

    let stores = match config.store_backend {
        StoreBackend::Memory => memory_stores(),
        StoreBackend::Aws => aws_stores(config).await?,
    };
    info!(backend = ?config.store_backend, "Storage backends ready");

    let backends = Backends {
        case_service,
        objects: stores.objects,
        jobs: stores.jobs,
        tracker: stores.tracker,
    };
    let auth = Authenticator::new(
        stores.secrets,
        AuthSettings {
            api_username: config.api_username.clone(),
            expiration: config.jwt_expiration,
            secure_cookie: config.secure_cookie(),
        },
    );

    Ok(AppState {
        ingestor: Arc::new(Ingestor::new(catalogue, backends, config.http_timeout)),
        auth: Arc::new(auth),
    })
}

/// Serve until ctrl-c.
pub async fn serve(config: ServiceConfig) -> Result<()> {
    let state = build_state(&config).await?;
    let app = router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, environment = %config.environment, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
