//! In-process backends for local runs and tests.

use crate::error::{StoreError, TrackerError};
use crate::xml::check_well_formed;
use crate::{DocumentStatus, DocumentTracker, JobQueue, ObjectStore, TrackerRecord};
use async_trait::async_trait;
use scanning_protocol::{form_object_key, set_object_key, JobMessage};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};
use uuid::Uuid;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub const MEMORY_BUCKET: &str = "memory";

/// Objects keyed like the S3 bucket, with the same no-overwrite rule.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    unavailable: AtomicBool,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every put fail, as if the bucket were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Conditional put: refuses a key that already exists.
    pub fn put_object(&self, key: &str, body: &[u8]) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Upload {
                bucket: MEMORY_BUCKET.to_string(),
                key: key.to_string(),
                message: "object store unavailable".to_string(),
            });
        }
        let mut objects = lock(&self.objects);
        if objects.contains_key(key) {
            return Err(StoreError::AlreadyExists {
                key: key.to_string(),
            });
        }
        objects.insert(key.to_string(), body.to_vec());
        debug!(key, bytes = body.len(), "Stored object");
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        lock(&self.objects).get(key).cloned()
    }

    /// Keys in sort order.
    pub fn keys(&self) -> Vec<String> {
        lock(&self.objects).keys().cloned().collect()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn persist_envelope(&self, body: &[u8]) -> Result<String, StoreError> {
        let key = set_object_key(Uuid::now_v7());
        self.put_object(&key, body)?;
        Ok(key)
    }

    async fn persist_decoded_document(
        &self,
        body: &[u8],
        doc_type: &str,
    ) -> Result<String, StoreError> {
        check_well_formed(body).map_err(|message| StoreError::InvalidXml {
            doc_type: doc_type.to_string(),
            message,
        })?;
        let key = form_object_key(Uuid::now_v7(), doc_type);
        self.put_object(&key, body)?;
        Ok(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedMessage {
    pub message_id: String,
    pub group_id: String,
    pub body: String,
}

#[derive(Debug, Default)]
pub struct MemoryJobQueue {
    messages: Mutex<Vec<QueuedMessage>>,
    next_id: AtomicU64,
}

impl MemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<QueuedMessage> {
        lock(&self.messages).clone()
    }
}

#[async_trait]
impl JobQueue for MemoryJobQueue {
    async fn enqueue_for_processing(
        &self,
        uid: &str,
        filename: &str,
    ) -> Result<String, StoreError> {
        let body = JobMessage::form_job(uid, filename).to_json()?;
        let message_id = format!("memory-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        lock(&self.messages).push(QueuedMessage {
            message_id: message_id.clone(),
            group_id: uid.to_string(),
            body,
        });
        info!(uid, filename, message_id = %message_id, "Queued form job");
        Ok(message_id)
    }
}

#[derive(Debug, Default)]
pub struct MemoryDocumentTracker {
    records: Mutex<HashMap<String, TrackerRecord>>,
}

impl MemoryDocumentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, id: &str) -> Option<TrackerRecord> {
        lock(&self.records).get(id).cloned()
    }

    fn transition(&self, id: &str, to: DocumentStatus) -> Result<(), TrackerError> {
        if id.is_empty() {
            return Ok(());
        }
        let mut records = lock(&self.records);
        match records.get_mut(id) {
            Some(record) if record.status == DocumentStatus::Processing => {
                record.status = to;
                Ok(())
            }
            other => Err(TrackerError::Conflict {
                id: id.to_string(),
                status: other
                    .map(|r| r.status.to_string())
                    .unwrap_or_else(|| "missing".to_string()),
            }),
        }
    }
}

#[async_trait]
impl DocumentTracker for MemoryDocumentTracker {
    async fn lookup(&self, id: &str) -> Result<Option<TrackerRecord>, TrackerError> {
        if id.is_empty() {
            return Ok(None);
        }
        Ok(self.record(id))
    }

    async fn mark_processing(&self, id: &str, case_no: &str) -> Result<(), TrackerError> {
        if id.is_empty() {
            return Ok(());
        }
        let mut records = lock(&self.records);
        match records.get(id) {
            Some(existing) if existing.status == DocumentStatus::Completed => {
                Err(TrackerError::AlreadyProcessed {
                    case_no: existing.case_no.clone(),
                })
            }
            Some(existing) if existing.status == DocumentStatus::Processing => {
                Err(TrackerError::Conflict {
                    id: id.to_string(),
                    status: existing.status.to_string(),
                })
            }
            _ => {
                records.insert(
                    id.to_string(),
                    TrackerRecord {
                        case_no: case_no.to_string(),
                        status: DocumentStatus::Processing,
                    },
                );
                Ok(())
            }
        }
    }

    async fn mark_completed(&self, id: &str) -> Result<(), TrackerError> {
        self.transition(id, DocumentStatus::Completed)
    }

    async fn mark_failed(&self, id: &str) -> Result<(), TrackerError> {
        self.transition(id, DocumentStatus::Failed)
    }
}
