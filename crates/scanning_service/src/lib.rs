//! Scanning ingestion service.
//!
//! Accepts scanned document sets over HTTP, validates the envelope and every
//! embedded document against their schemas, creates or reuses a Sirius case,
//! then attaches, stores and queues each document in order.
//!
//! # Modules
//!
//! - [`config`]: flags and environment
//! - [`auth`]: login, session tokens and the cookie check
//! - [`ingest`]: the per-set pipeline
//! - [`errors`]: public error mapping and response encoding
//! - [`routes`]: axum router
//! - [`app`]: backend wiring and the server loop

pub mod app;
pub mod auth;
pub mod config;
pub mod errors;
pub mod ingest;
pub mod routes;

pub use app::{build_state, serve};
pub use auth::{AuthError, AuthSettings, Authenticator};
pub use config::{parse_duration, ConfigError, ServiceConfig, StoreBackend};
pub use errors::{public_error, PublicError};
pub use ingest::{Backends, IngestError, Ingestor};
pub use routes::{router, AppState};
