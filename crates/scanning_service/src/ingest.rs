//! End-to-end handling of one submitted set.
//!
//! The set is stored as received, validated, checked against the set rules and
//! tied to a Sirius case. Documents are then attached, stored and queued one
//! at a time in envelope order. Once a case exists the document loop runs on
//! its own task, so a caller hanging up cannot strand a case without its
//! documents.

use crate::errors::error_chain;
use chrono::Utc;
use scanning_documents::{
    case_request, format_scan_time, validate_set, DocumentError, EmbeddedValidator,
    EnvelopeError, EnvelopeValidator, Registry, SetValidationError,
};
use scanning_protocol::{normalize_uid, Document, ScannedDocumentRequest, Set};
use scanning_schema::SchemaCatalogue;
use scanning_sirius::{CaseService, CaseServiceError};
use scanning_store::{
    DocumentStatus, DocumentTracker, JobQueue, ObjectStore, StoreError, TrackerError,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, Instrument, Span};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("method {0} is not allowed")]
    MethodNotAllowed(String),

    #[error("unsupported content type '{0}'")]
    InvalidContentType(String),

    #[error("failed to read request body: {0}")]
    InvalidBody(String),

    #[error("request body exceeds the size limit")]
    BodyTooLarge,

    #[error("failed to persist set")]
    PersistSet(#[source] StoreError),

    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    SetRules(#[from] SetValidationError),

    #[error("failed to create case stub")]
    CreateCase(#[source] CaseServiceError),

    #[error("document already processed for case {case_no}")]
    AlreadyProcessed { case_no: String },

    #[error("document tracker call failed")]
    Tracker(#[source] TrackerError),

    #[error("embedded document failed on reprocessing")]
    Reprocess(#[source] DocumentError),

    #[error("failed to attach document to case {uid}")]
    Attach {
        uid: String,
        #[source]
        source: CaseServiceError,
    },

    #[error("failed to persist decoded document")]
    PersistDocument(#[source] StoreError),

    #[error("failed to enqueue document")]
    Enqueue(#[source] StoreError),

    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("document processing task failed: {0}")]
    Detached(String),
}

impl From<TrackerError> for IngestError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::AlreadyProcessed { case_no } => IngestError::AlreadyProcessed { case_no },
            other => IngestError::Tracker(other),
        }
    }
}

/// Downstream systems the pipeline talks to.
#[derive(Clone)]
pub struct Backends {
    pub case_service: Arc<dyn CaseService>,
    pub objects: Arc<dyn ObjectStore>,
    pub jobs: Arc<dyn JobQueue>,
    pub tracker: Arc<dyn DocumentTracker>,
}

pub struct Ingestor {
    envelope: EnvelopeValidator,
    embedded: EmbeddedValidator,
    backends: Backends,
    /// Bound on each store, queue and tracker call. Sirius calls carry their
    /// own client timeout.
    timeout: Duration,
}

impl Ingestor {
    pub fn new(catalogue: Arc<SchemaCatalogue>, backends: Backends, timeout: Duration) -> Self {
        Self {
            envelope: EnvelopeValidator::new(Arc::clone(&catalogue)),
            embedded: EmbeddedValidator::new(catalogue, Arc::new(Registry::new())),
            backends,
            timeout,
        }
    }

    /// Run a set through the whole pipeline. Returns the normalised case UID.
    pub async fn ingest(self: &Arc<Self>, token: &str, body: &[u8]) -> Result<String, IngestError> {
        let set_filename = self
            .bounded(
                "persist set",
                self.backends.objects.persist_envelope(body),
                IngestError::PersistSet,
            )
            .await?;
        info!(set_filename, "Stored Set data");

        let set = self.envelope.validate(body)?;
        let now = Utc::now();
        for doc in set.documents() {
            self.embedded.validate(doc, now)?;
        }
        validate_set(&set)?;
        self.check_replay(&set).await?;

        let uid = match case_request(&set, now) {
            Some(request) => {
                let response = self
                    .backends
                    .case_service
                    .create_case_stub(token, &request)
                    .await
                    .map_err(IngestError::CreateCase)?;
                info!(
                    uid = %response.uid,
                    case_type = ?request.case_type,
                    "Created case stub"
                );
                response.uid
            }
            None => set.case_no().trim().to_string(),
        };
        let uid = normalize_uid(&uid);

        let this = Arc::clone(self);
        let token = token.to_string();
        let task_uid = uid.clone();
        let task = tokio::spawn(
            async move { this.process_documents(&token, &task_uid, &set).await }
                .instrument(Span::current()),
        );
        task.await
            .map_err(|e| IngestError::Detached(e.to_string()))??;
        Ok(uid)
    }

    /// Answer a resubmitted set from the tracker before any case is created.
    async fn check_replay(&self, set: &Set) -> Result<(), IngestError> {
        for doc in set.documents() {
            let record = self
                .bounded(
                    "lookup document",
                    self.backends.tracker.lookup(&doc.id),
                    IngestError::from,
                )
                .await?;
            if let Some(record) = record.filter(|r| r.status == DocumentStatus::Completed) {
                info!(document_id = %doc.id, case_no = %record.case_no, "Document already processed");
                return Err(IngestError::AlreadyProcessed {
                    case_no: record.case_no,
                });
            }
        }
        Ok(())
    }

    async fn process_documents(&self, token: &str, uid: &str, set: &Set) -> Result<(), IngestError> {
        info!(uid, documents = set.documents().len(), "Processing documents");
        let tracker = &self.backends.tracker;

        for doc in set.documents() {
            self.bounded(
                "mark processing",
                tracker.mark_processing(&doc.id, uid),
                IngestError::from,
            )
            .await?;

            if let Err(err) = self.process_document(token, uid, set, doc).await {
                let marked = self
                    .bounded("mark failed", tracker.mark_failed(&doc.id), IngestError::from)
                    .await;
                if let Err(mark_err) = marked {
                    error!(
                        uid,
                        document_id = %doc.id,
                        error = %error_chain(&mark_err),
                        "Failed to mark document as failed"
                    );
                }
                return Err(err);
            }

            let completed = self
                .bounded("mark completed", tracker.mark_completed(&doc.id), IngestError::from)
                .await;
            if let Err(mark_err) = completed {
                error!(
                    uid,
                    document_id = %doc.id,
                    error = %error_chain(&mark_err),
                    "Failed to mark document as completed"
                );
            }
        }
        Ok(())
    }

    async fn process_document(
        &self,
        token: &str,
        uid: &str,
        set: &Set,
        doc: &Document,
    ) -> Result<(), IngestError> {
        let now = Utc::now();
        let validated = self
            .embedded
            .validate(doc, now)
            .map_err(IngestError::Reprocess)?;
        let doc_type = validated.doc_type;

        let request = ScannedDocumentRequest {
            case_reference: uid.to_string(),
            content: doc.embedded_pdf.clone(),
            document_type: doc_type.case_service_type().to_string(),
            document_sub_type: validated.sub_type().map(str::to_string),
            scanned_date: format_scan_time(set.scan_time(), now),
        };
        let attached = self
            .backends
            .case_service
            .attach_document(token, &request)
            .await
            .map_err(|source| IngestError::Attach {
                uid: uid.to_string(),
                source,
            })?;
        info!(uid, document_id = %doc.id, %doc_type, uuid = %attached.uuid, "Attached document");

        let filename = self
            .bounded(
                "persist document",
                self.backends
                    .objects
                    .persist_decoded_document(&validated.decoded, doc_type.as_str()),
                IngestError::PersistDocument,
            )
            .await?;

        if !doc_type.is_extraction_eligible() {
            info!(uid, %doc_type, filename, "Skipping external job processing");
            return Ok(());
        }

        let message_id = self
            .bounded(
                "enqueue",
                self.backends.jobs.enqueue_for_processing(uid, &filename),
                IngestError::Enqueue,
            )
            .await?;
        info!(uid, %doc_type, filename, message_id, "Document queued for processing");
        Ok(())
    }

    async fn bounded<T, E>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, E>>,
        wrap: impl FnOnce(E) -> IngestError,
    ) -> Result<T, IngestError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(wrap),
            Err(_) => Err(IngestError::Timeout {
                operation,
                timeout: self.timeout,
            }),
        }
    }
}
