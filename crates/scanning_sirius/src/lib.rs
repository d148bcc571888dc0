//! Sirius case-management client.
//!
//! Two calls: create a case stub for a new set, and attach a scanned
//! document to a case. Both post JSON with the caller's bearer token.
//! Nothing is retried here.

mod client;
mod error;

pub use client::{SiriusClient, SiriusConfig};
pub use error::CaseServiceError;

use async_trait::async_trait;
use scanning_protocol::{
    ScannedCaseRequest, ScannedCaseResponse, ScannedDocumentRequest, ScannedDocumentResponse,
};

#[async_trait]
pub trait CaseService: Send + Sync {
    /// Create a case and return its UID. An empty UID is an error.
    async fn create_case_stub(
        &self,
        token: &str,
        request: &ScannedCaseRequest,
    ) -> Result<ScannedCaseResponse, CaseServiceError>;

    async fn attach_document(
        &self,
        token: &str,
        request: &ScannedDocumentRequest,
    ) -> Result<ScannedDocumentResponse, CaseServiceError>;
}
