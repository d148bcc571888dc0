//! Canonical default values shared by the service and its adapters.

pub const DEFAULT_ENVIRONMENT: &str = "local";
pub const DEFAULT_HTTP_PORT: u16 = 8081;
pub const DEFAULT_HTTP_TIMEOUT: &str = "10s";

pub const DEFAULT_SIRIUS_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_SIRIUS_CASE_STUB_PATH: &str = "api/public/v1/scanned-cases";
pub const DEFAULT_SIRIUS_ATTACH_DOC_PATH: &str = "api/public/v1/scanned-documents";

pub const DEFAULT_XSD_PATH: &str = "xsd";

pub const DEFAULT_QUEUE_URL: &str = "000000000000/ddc.fifo";
pub const DEFAULT_BUCKET_NAME: &str = "opg-backoffice-jobsqueue-local";
pub const DEFAULT_ENCRYPTION_KEY: &str = "alias/aws/s3";
pub const DEFAULT_DOCUMENTS_TABLE: &str = "scanning-documents-local";
pub const DEFAULT_AWS_REGION: &str = "eu-west-1";

pub const DEFAULT_API_USERNAME: &str = "opg_document_and_d@publicguardian.gsi.gov.uk";
pub const DEFAULT_JWT_SECRET_NAME: &str = "local/jwt-key";
pub const DEFAULT_CREDENTIALS_NAME: &str = "/local/local-credentials";
pub const DEFAULT_JWT_EXPIRATION: &str = "1h";

/// Name of the session cookie carrying the bearer token.
pub const SESSION_COOKIE_NAME: &str = "membrane";

/// Upper bound on the size of an inbound set.
pub const MAX_SET_BODY_BYTES: usize = 32 * 1024 * 1024;
