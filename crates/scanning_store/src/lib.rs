//! Persistence collaborators of the ingest pipeline.
//!
//! - [`ObjectStore`]: raw envelopes and decoded forms, never overwritten
//! - [`JobQueue`]: FIFO work items grouped by case UID
//! - [`DocumentTracker`]: per-document processing state with conditional writes
//!
//! In-memory implementations live in [`memory`]. S3, SQS and DynamoDB
//! implementations are behind the `aws` feature.

#[cfg(feature = "aws")]
pub mod aws;
mod error;
pub mod memory;
mod xml;

pub use error::{StoreError, TrackerError};
pub use memory::{MemoryDocumentTracker, MemoryJobQueue, MemoryObjectStore, QueuedMessage};

use async_trait::async_trait;
use std::fmt;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store the request body as received. Returns the object key.
    async fn persist_envelope(&self, body: &[u8]) -> Result<String, StoreError>;

    /// Store one decoded form. The bytes must be well-formed XML.
    async fn persist_decoded_document(
        &self,
        body: &[u8],
        doc_type: &str,
    ) -> Result<String, StoreError>;
}

#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Queue a form job for `filename`, grouped under `uid`. Returns the message id.
    async fn enqueue_for_processing(&self, uid: &str, filename: &str)
        -> Result<String, StoreError>;
}

/// At-most-once bookkeeping per document id.
///
/// An empty id is never tracked: every operation succeeds without writing.
#[async_trait]
pub trait DocumentTracker: Send + Sync {
    /// Current record for `id`. Always `None` for an empty id.
    async fn lookup(&self, id: &str) -> Result<Option<TrackerRecord>, TrackerError>;

    /// Claim the document. Allowed when there is no record or the last attempt failed.
    async fn mark_processing(&self, id: &str, case_no: &str) -> Result<(), TrackerError>;

    async fn mark_completed(&self, id: &str) -> Result<(), TrackerError>;

    async fn mark_failed(&self, id: &str) -> Result<(), TrackerError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    Processing,
    Completed,
    Failed,
}

impl DocumentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentStatus::Processing => "PROCESSING",
            DocumentStatus::Completed => "COMPLETED",
            DocumentStatus::Failed => "FAILED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PROCESSING" => Some(DocumentStatus::Processing),
            "COMPLETED" => Some(DocumentStatus::Completed),
            "FAILED" => Some(DocumentStatus::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partition and sort key of a tracker record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerRecord {
    pub case_no: String,
    pub status: DocumentStatus,
}

pub fn tracker_key(id: &str) -> String {
    format!("DOCUMENT#{}", id)
}
