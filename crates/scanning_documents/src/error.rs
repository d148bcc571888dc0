use scanning_protocol::EnvelopeXmlError;
use scanning_schema::SchemaError;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("failed to sanitise XML: {0}")]
pub struct SanitizeError(pub String);

/// Failure of the outer `Set` envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("request body is not UTF-8 text")]
    NotUtf8(#[source] std::str::Utf8Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Sanitize(#[from] SanitizeError),

    #[error(transparent)]
    Bind(#[from] EnvelopeXmlError),
}

impl EnvelopeError {
    pub fn validation_errors(&self) -> Option<&[String]> {
        match self {
            EnvelopeError::Schema(e) => e.validation_errors(),
            _ => None,
        }
    }
}

/// Failure of one embedded document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Document type {0} is not supported")]
    UnsupportedType(String),

    #[error("failed to decode embedded XML for {doc_type}: {source}")]
    Decode {
        doc_type: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("embedded XML for {doc_type} is not UTF-8 text")]
    NotUtf8 {
        doc_type: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("XML for {doc_type} failed XSD validation")]
    Schema {
        doc_type: String,
        #[source]
        source: SchemaError,
    },

    #[error("failed to sanitise XML for {doc_type}")]
    Sanitize {
        doc_type: String,
        #[source]
        source: SanitizeError,
    },

    #[error("expected a <{expected}> document but found <{found}>")]
    RootMismatch { expected: String, found: String },

    #[error("failed to parse {doc_type} document: {source}")]
    Parse {
        doc_type: String,
        #[source]
        source: quick_xml::DeError,
    },
}

impl DocumentError {
    pub fn validation_errors(&self) -> Option<&[String]> {
        match self {
            DocumentError::Schema { source, .. } => source.validation_errors(),
            _ => None,
        }
    }
}

/// Every rule the set broke, in the order they were checked.
#[derive(Debug, Error)]
#[error("Validate set failed: {}", .errors.join("; "))]
pub struct SetValidationError {
    pub errors: Vec<String>,
}
