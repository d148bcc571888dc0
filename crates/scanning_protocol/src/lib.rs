//! Scanning ingestion protocol types.
//!
//! Everything that crosses a process boundary lives here:
//!
//! - the inbound `Set` envelope (XML, bound with quick-xml serde)
//! - the JSON contract of `POST /api/ddc`
//! - the case-service (Sirius) request and response bodies
//! - object-store key naming and the job-queue message body
//!
//! The crate has no I/O of its own.

pub mod api;
pub mod defaults;
pub mod doc_types;
pub mod envelope;
pub mod job;
pub mod naming;
pub mod sirius;

pub use api::{ApiResponse, ResponseData};
pub use doc_types::{CaseCategory, DocumentType};
pub use envelope::{Body, Document, EnvelopeXmlError, Header, Set};
pub use job::{php_serialize, JobMessage, PhpValue, FORM_JOB_NAME};
pub use naming::{form_object_key, normalize_uid, set_object_key};
pub use sirius::{
    CaseType, FieldErrors, ScannedCaseRequest, ScannedCaseResponse, ScannedDocumentRequest,
    ScannedDocumentResponse,
};
