//! Service configuration. Every option can be set by flag or environment.

use clap::{Parser, ValueEnum};
use scanning_logging::LogFormat;
use scanning_protocol::defaults;
use scanning_sirius::SiriusConfig;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unsupported duration '{0}'. Use <n>ms, <n>s, <n>m or <n>h.")]
    InvalidDuration(String),

    #[error("store backend '{0}' is not compiled in; rebuild with the `{0}` feature")]
    BackendUnavailable(&'static str),
}

/// Where sets, jobs and tracker records go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
    /// In-process maps. Local runs and tests.
    Memory,
    /// S3, SQS and DynamoDB.
    Aws,
}

impl Default for StoreBackend {
    fn default() -> Self {
        if cfg!(feature = "aws") {
            StoreBackend::Aws
        } else {
            StoreBackend::Memory
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "scanning-service",
    about = "Ingests scanned document sets and files them against Sirius cases"
)]
pub struct ServiceConfig {
    /// Deployment environment. Anything but `local` gets secure cookies.
    #[arg(long, env = "ENVIRONMENT", default_value = defaults::DEFAULT_ENVIRONMENT)]
    pub environment: String,

    #[arg(long, env = "SIRIUS_BASE_URL", default_value = defaults::DEFAULT_SIRIUS_BASE_URL)]
    pub sirius_base_url: String,

    #[arg(
        long,
        env = "SIRIUS_CASE_STUB_URL",
        default_value = defaults::DEFAULT_SIRIUS_CASE_STUB_PATH
    )]
    pub sirius_case_stub_path: String,

    #[arg(
        long,
        env = "SIRIUS_ATTACH_DOC_URL",
        default_value = defaults::DEFAULT_SIRIUS_ATTACH_DOC_PATH
    )]
    pub sirius_attach_doc_path: String,

    /// Directory holding SET.xsd and the per-document schemas.
    #[arg(long, env = "XSD_PATH", default_value = defaults::DEFAULT_XSD_PATH)]
    pub xsd_path: PathBuf,

    #[arg(long, env = "JOBQUEUE_SQS_QUEUE_URL", default_value = defaults::DEFAULT_QUEUE_URL)]
    pub queue_url: String,

    #[arg(long, env = "JOBQUEUE_S3_BUCKET_NAME", default_value = defaults::DEFAULT_BUCKET_NAME)]
    pub bucket_name: String,

    #[arg(
        long,
        env = "JOBQUEUE_S3_ENCRYPTION_KEY",
        default_value = defaults::DEFAULT_ENCRYPTION_KEY
    )]
    pub encryption_key: String,

    #[arg(long, env = "DOCUMENTS_TABLE", default_value = defaults::DEFAULT_DOCUMENTS_TABLE)]
    pub documents_table: String,

    /// Endpoint override for every AWS client, e.g. a localstack URL.
    #[arg(long, env = "AWS_ENDPOINT")]
    pub aws_endpoint: Option<String>,

    #[arg(long, env = "AWS_REGION", default_value = defaults::DEFAULT_AWS_REGION)]
    pub aws_region: String,

    #[arg(long, env = "API_USERNAME", default_value = defaults::DEFAULT_API_USERNAME)]
    pub api_username: String,

    #[arg(long, env = "JWT_SECRET_ARN", default_value = defaults::DEFAULT_JWT_SECRET_NAME)]
    pub jwt_secret_name: String,

    #[arg(long, env = "CREDENTIALS_ARN", default_value = defaults::DEFAULT_CREDENTIALS_NAME)]
    pub credentials_name: String,

    #[arg(
        long,
        env = "JWT_EXPIRATION",
        default_value = defaults::DEFAULT_JWT_EXPIRATION,
        value_parser = parse_duration
    )]
    pub jwt_expiration: Duration,

    #[arg(long, env = "HTTP_PORT", default_value_t = defaults::DEFAULT_HTTP_PORT)]
    pub http_port: u16,

    /// Bound on each outbound call.
    #[arg(
        long,
        env = "HTTP_TIMEOUT",
        default_value = defaults::DEFAULT_HTTP_TIMEOUT,
        value_parser = parse_duration
    )]
    pub http_timeout: Duration,

    #[arg(long, env = "STORE_BACKEND", value_enum, default_value_t = StoreBackend::default())]
    pub store_backend: StoreBackend,

    /// `text` or `json`.
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    pub log_format: LogFormat,

    /// Debug logging unless RUST_LOG says otherwise.
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServiceConfig {
    pub fn secure_cookie(&self) -> bool {
        self.environment != "local"
    }

    pub fn sirius(&self) -> SiriusConfig {
        SiriusConfig {
            base_url: self.sirius_base_url.clone(),
            case_stub_path: self.sirius_case_stub_path.clone(),
            attach_doc_path: self.sirius_attach_doc_path.clone(),
            timeout: self.http_timeout,
        }
    }

    /// Refuse a backend this build cannot provide.
    pub fn check_backend(&self) -> Result<(), ConfigError> {
        match self.store_backend {
            StoreBackend::Aws if !cfg!(feature = "aws") => {
                Err(ConfigError::BackendUnavailable("aws"))
            }
            _ => Ok(()),
        }
    }
}

/// `<n>ms`, `<n>s`, `<n>m` or `<n>h`.
pub fn parse_duration(raw: &str) -> Result<Duration, ConfigError> {
    let raw = raw.trim();
    let invalid = || ConfigError::InvalidDuration(raw.to_string());

    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (digits, unit) = raw.split_at(split);
    let value: u64 = digits.parse().map_err(|_| invalid())?;

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => Ok(Duration::from_secs(value * 60)),
        "h" => Ok(Duration::from_secs(value * 60 * 60)),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("10s"), Ok(Duration::from_secs(10)));
        assert_eq!(parse_duration("5m"), Ok(Duration::from_secs(300)));
        assert_eq!(parse_duration(" 1h "), Ok(Duration::from_secs(3600)));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        for raw in ["", "10", "s", "1.5s", "10d", "-1s"] {
            assert_eq!(
                parse_duration(raw),
                Err(ConfigError::InvalidDuration(raw.to_string())),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = ServiceConfig::try_parse_from([
            "scanning-service",
            "--environment",
            "production",
            "--http-port",
            "9000",
            "--http-timeout",
            "2s",
            "--store-backend",
            "memory",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(config.http_port, 9000);
        assert_eq!(config.http_timeout, Duration::from_secs(2));
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.secure_cookie());
        assert!(config.check_backend().is_ok());
        assert_eq!(config.sirius().timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_bad_duration_flag_is_rejected() {
        let err = ServiceConfig::try_parse_from(["scanning-service", "--http-timeout", "soon"]);
        assert!(err.is_err());
    }
}
