//! Validation of the typed XML embedded in each envelope document.

use crate::error::DocumentError;
use crate::registry::{Registry, TypedDocument};
use crate::sanitize::{root_name, sanitize_xml};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use scanning_protocol::{Document, DocumentType};
use scanning_schema::SchemaCatalogue;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
pub struct ValidatedDocument {
    pub doc_type: DocumentType,
    pub schema_location: String,
    /// Decoded XML exactly as received.
    pub decoded: Vec<u8>,
    pub typed: TypedDocument,
    /// Semantic findings. Logged only.
    pub findings: Vec<String>,
}

impl ValidatedDocument {
    pub fn sub_type(&self) -> Option<&str> {
        self.typed.sub_type()
    }
}

pub struct EmbeddedValidator {
    catalogue: Arc<SchemaCatalogue>,
    registry: Arc<Registry>,
}

impl EmbeddedValidator {
    pub fn new(catalogue: Arc<SchemaCatalogue>, registry: Arc<Registry>) -> Self {
        Self {
            catalogue,
            registry,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn validate(
        &self,
        doc: &Document,
        now: DateTime<Utc>,
    ) -> Result<ValidatedDocument, DocumentError> {
        let (doc_type, component) = self.registry.component(&doc.doc_type)?;
        let tag = doc_type.as_str();

        // Scanners wrap long base64 lines.
        let encoded: String = doc
            .embedded_xml
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let decoded = STANDARD
            .decode(encoded)
            .map_err(|source| DocumentError::Decode {
                doc_type: tag.to_string(),
                source,
            })?;
        let xml = String::from_utf8(decoded).map_err(|source| DocumentError::NotUtf8 {
            doc_type: tag.to_string(),
            source,
        })?;

        let schema_location =
            self.catalogue
                .validate(&xml)
                .map_err(|source| DocumentError::Schema {
                    doc_type: tag.to_string(),
                    source,
                })?;

        if component.typed {
            let found = root_name(&xml).unwrap_or_default();
            if found != tag {
                return Err(DocumentError::RootMismatch {
                    expected: tag.to_string(),
                    found,
                });
            }
        }

        let sanitized = sanitize_xml(&xml).map_err(|source| DocumentError::Sanitize {
            doc_type: tag.to_string(),
            source,
        })?;
        let typed = (component.parser)(&sanitized).map_err(|source| DocumentError::Parse {
            doc_type: tag.to_string(),
            source,
        })?;

        let findings = component
            .validator
            .map(|check| check(&typed, now))
            .unwrap_or_default();
        if !findings.is_empty() {
            info!(
                doc_type = tag,
                document_id = %doc.id,
                errors = ?findings,
                "Validation failed"
            );
        }

        Ok(ValidatedDocument {
            doc_type,
            schema_location,
            decoded: xml.into_bytes(),
            typed,
            findings,
        })
    }
}
