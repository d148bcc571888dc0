//! Schema root directory, location vetting and schema caching.

use crate::error::SchemaError;
use crate::model::Schema;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Read the `noNamespaceSchemaLocation` attribute from the root element.
///
/// The value is vetted with [`check_location`] before it is returned.
pub fn schema_location(xml: &str) -> Result<String, SchemaError> {
    let doc = roxmltree::Document::parse(xml).map_err(|e| SchemaError::Malformed(e.to_string()))?;
    let location = doc
        .root_element()
        .attributes()
        .find(|a| a.name() == "noNamespaceSchemaLocation")
        .map(|a| a.value().trim().to_string())
        .ok_or(SchemaError::LocationMissing)?;
    check_location(&location)?;
    Ok(location)
}

/// A schema location must be a bare file name inside the schema root.
pub fn check_location(location: &str) -> Result<(), SchemaError> {
    if location.is_empty()
        || location.contains('/')
        || location.contains('\\')
        || location.contains("..")
    {
        return Err(SchemaError::LocationInvalid(location.to_string()));
    }
    Ok(())
}

/// Schemas under one root directory, parsed once and shared.
#[derive(Debug)]
pub struct SchemaCatalogue {
    root: PathBuf,
    cache: RwLock<HashMap<String, Arc<Schema>>>,
}

impl SchemaCatalogue {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, location: &str) -> Result<String, SchemaError> {
        check_location(location)?;
        let path = self.root.join(location);
        std::fs::read_to_string(&path).map_err(|source| SchemaError::Load { path, source })
    }

    /// Load (or fetch from cache) the schema stored under `location`.
    pub fn load(&self, location: &str) -> Result<Arc<Schema>, SchemaError> {
        {
            let cache = self.cache.read().unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(schema) = cache.get(location) {
                return Ok(Arc::clone(schema));
            }
        }

        let text = self.read(location)?;
        let schema = Schema::parse_with_includes(location, &text, &mut |included| {
            self.read(included)
        })?;
        let schema = Arc::new(schema);
        debug!(location, root = %self.root.display(), "Loaded schema");

        let mut cache = self.cache.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(Arc::clone(
            cache.entry(location.to_string()).or_insert(schema),
        ))
    }

    /// Validate `xml` against the schema it names. Returns that schema location.
    pub fn validate(&self, xml: &str) -> Result<String, SchemaError> {
        let location = schema_location(xml)?;
        let schema = self.load(&location)?;
        schema.validate(xml)?;
        Ok(location)
    }
}
