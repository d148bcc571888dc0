//! Outer `Set` envelope validation.

use crate::error::EnvelopeError;
use crate::sanitize::sanitize_xml;
use scanning_protocol::Set;
use scanning_schema::SchemaCatalogue;
use std::sync::Arc;
use tracing::debug;

pub struct EnvelopeValidator {
    catalogue: Arc<SchemaCatalogue>,
}

impl EnvelopeValidator {
    pub fn new(catalogue: Arc<SchemaCatalogue>) -> Self {
        Self { catalogue }
    }

    /// Check the raw body against the schema it names, then bind it.
    pub fn validate(&self, body: &[u8]) -> Result<Set, EnvelopeError> {
        let xml = std::str::from_utf8(body).map_err(EnvelopeError::NotUtf8)?;
        let location = self.catalogue.validate(xml)?;
        let set = Set::from_xml(&sanitize_xml(xml)?)?;
        debug!(
            schema = %location,
            documents = set.documents().len(),
            "Envelope validated"
        );
        Ok(set)
    }
}
