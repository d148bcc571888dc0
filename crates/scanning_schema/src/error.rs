use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while locating, loading or applying a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("XML is not well-formed: {0}")]
    Malformed(String),

    #[error("schema location not found in XML")]
    LocationMissing,

    #[error("invalid schema location '{0}'")]
    LocationInvalid(String),

    #[error("failed to load schema {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse schema {location}: {message}")]
    Parse { location: String, message: String },

    #[error("XML failed schema validation ({} error(s))", .0.len())]
    Invalid(Vec<String>),
}

impl SchemaError {
    pub(crate) fn parse(location: &str, message: impl Into<String>) -> Self {
        SchemaError::Parse {
            location: location.to_string(),
            message: message.into(),
        }
    }

    /// Per-element messages when the document was checked and found invalid.
    pub fn validation_errors(&self) -> Option<&[String]> {
        match self {
            SchemaError::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}
