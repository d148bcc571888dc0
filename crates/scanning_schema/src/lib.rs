//! XML Schema validation for scanned document sets.
//!
//! Every XML payload the service accepts names its schema through
//! `xsi:noNamespaceSchemaLocation`. This crate resolves that name against
//! a schema root directory, loads the XSD and validates the payload.
//!
//! Only the XSD subset used by the scanning forms is supported:
//!
//! - global and local elements, `ref`, `minOccurs`/`maxOccurs`
//! - named and anonymous complex types with `sequence`, `choice`, `all`, `any`
//! - `simpleContent` and `complexContent` extensions
//! - attributes with `use="required"`
//! - simple type restrictions (`enumeration`, `pattern`, length and range facets)
//! - `xs:include` (`xs:import` is refused)
//!
//! Failures are reported as a list of messages worded like libxml2's, e.g.
//! `Element 'LP2': Missing child element(s). Expected is ( Page1 ).`
//!
//! # Modules
//!
//! - [`model`]: schema object model and XSD parsing
//! - [`builtin`]: built-in simple types
//! - [`pattern`]: XSD regular expressions rewritten for `regex`
//! - [`validate`]: instance validation
//! - [`catalogue`]: schema root, location vetting and caching

pub mod builtin;
pub mod catalogue;
pub mod error;
pub mod model;
pub mod pattern;
pub mod validate;

pub use catalogue::{check_location, schema_location, SchemaCatalogue};
pub use error::SchemaError;
pub use model::Schema;
