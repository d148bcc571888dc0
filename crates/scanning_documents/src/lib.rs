//! Document handling for the scanning ingest pipeline.
//!
//! - [`registry`]: document type to parser and semantic check
//! - [`envelope`]: schema check and binding of the outer `Set`
//! - [`embedded`]: decode, schema check, bind and check each embedded form
//! - [`set_rules`]: set level rules and the case-creation decision
//! - [`forms`]: typed form bindings
//! - [`sanitize`], [`date`]: text clean-up and scan date parsing

pub mod date;
pub mod embedded;
pub mod envelope;
pub mod error;
pub mod forms;
pub mod registry;
pub mod sanitize;
pub mod set_rules;

pub use date::{format_scan_time, parse_date, to_rfc3339};
pub use embedded::{EmbeddedValidator, ValidatedDocument};
pub use envelope::EnvelopeValidator;
pub use error::{DocumentError, EnvelopeError, SanitizeError, SetValidationError};
pub use registry::{Component, Parser, Registry, SemanticValidator, TypedDocument};
pub use set_rules::{case_request, validate_set};
