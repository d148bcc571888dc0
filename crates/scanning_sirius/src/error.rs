use scanning_protocol::FieldErrors;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaseServiceError {
    /// Non-2xx response. Validation errors are only read from 400 bodies.
    #[error("case service responded with status {status_code}")]
    Status {
        status_code: u16,
        validation_errors: Option<FieldErrors>,
    },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid response from {url}, scannedCaseResponse is nil or missing UID")]
    MissingUid { url: String },

    #[error("no bearer token in request scope")]
    MissingToken,

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl CaseServiceError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            CaseServiceError::Status { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// True when the case service flagged the case reference itself.
    pub fn has_field_error(&self, field: &str) -> bool {
        match self {
            CaseServiceError::Status {
                validation_errors: Some(errors),
                ..
            } => errors.contains_key(field),
            _ => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, CaseServiceError::Transport { source, .. } if source.is_timeout())
    }
}
