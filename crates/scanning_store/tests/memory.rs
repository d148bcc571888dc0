//! Behaviour of the in-memory backends, which mirror the conditional
//! semantics of the AWS ones.

use scanning_store::{
    DocumentStatus, DocumentTracker, JobQueue, MemoryDocumentTracker, MemoryJobQueue,
    MemoryObjectStore, ObjectStore, StoreError, TrackerError, TrackerRecord,
};

// =============================================================================
// Object store
// =============================================================================

/// Test that envelope and form keys follow the naming scheme and sort by arrival
#[tokio::test]
async fn test_object_keys() {
    let store = MemoryObjectStore::new();
    let set_key = store.persist_envelope(b"<Set/>").await.unwrap();
    let form_key = store
        .persist_decoded_document(b"<LP1F/>", "LP1F")
        .await
        .unwrap();

    assert!(set_key.starts_with("SET_") && set_key.ends_with(".xml"));
    assert!(form_key.starts_with("FORM_DDC_") && form_key.ends_with("_LP1F.xml"));
    assert_eq!(store.get(&set_key).unwrap(), b"<Set/>");
    assert_eq!(store.keys().len(), 2);
}

/// Test that an existing key is never overwritten
#[tokio::test]
async fn test_put_does_not_overwrite() {
    let store = MemoryObjectStore::new();
    store.put_object("SET_x.xml", b"first").unwrap();
    let err = store.put_object("SET_x.xml", b"second").unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists { key } if key == "SET_x.xml"));
    assert_eq!(store.get("SET_x.xml").unwrap(), b"first");
}

/// Test that decoded forms must be well-formed XML
#[tokio::test]
async fn test_decoded_document_must_be_xml() {
    let store = MemoryObjectStore::new();
    let err = store
        .persist_decoded_document(b"<LP1F><Page1></LP1F>", "LP1F")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidXml { .. }));
    assert!(store.keys().is_empty());
}

/// Test that an unavailable store fails every put
#[tokio::test]
async fn test_unavailable_store() {
    let store = MemoryObjectStore::new();
    store.set_unavailable(true);
    assert!(matches!(
        store.persist_envelope(b"<Set/>").await,
        Err(StoreError::Upload { .. })
    ));
}

// =============================================================================
// Job queue
// =============================================================================

/// Test that messages are grouped by UID and carry the form job body
#[tokio::test]
async fn test_enqueue_groups_by_uid() {
    let queue = MemoryJobQueue::new();
    let id = queue
        .enqueue_for_processing("700012341234", "FORM_DDC_abc_LP1F.xml")
        .await
        .unwrap();

    let messages = queue.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].message_id, id);
    assert_eq!(messages[0].group_id, "700012341234");
    assert_eq!(
        messages[0].body,
        r#"{"content":"a:2:{s:3:\"uid\";s:12:\"700012341234\";s:8:\"filename\";s:21:\"FORM_DDC_abc_LP1F.xml\";}","metadata":{"__name__":"Ddc\\Job\\FormJob"}}"#
    );
}

// =============================================================================
// Document tracker
// =============================================================================

/// Test the processing to completed lifecycle and the replay that follows
#[tokio::test]
async fn test_tracker_lifecycle() {
    let tracker = MemoryDocumentTracker::new();
    tracker.mark_processing("doc-A", "700012341234").await.unwrap();
    assert_eq!(
        tracker.record("doc-A"),
        Some(TrackerRecord {
            case_no: "700012341234".into(),
            status: DocumentStatus::Processing
        })
    );

    tracker.mark_completed("doc-A").await.unwrap();
    assert_eq!(tracker.record("doc-A").unwrap().status, DocumentStatus::Completed);

    let err = tracker.mark_processing("doc-A", "other").await.unwrap_err();
    assert!(matches!(err, TrackerError::AlreadyProcessed { case_no } if case_no == "700012341234"));
}

/// Test that an in-flight document refuses a second claim
#[tokio::test]
async fn test_tracker_conflict_while_processing() {
    let tracker = MemoryDocumentTracker::new();
    tracker.mark_processing("doc-A", "1").await.unwrap();
    assert!(matches!(
        tracker.mark_processing("doc-A", "1").await,
        Err(TrackerError::Conflict { .. })
    ));
}

/// Test that a failed document can be claimed again
#[tokio::test]
async fn test_tracker_failed_can_be_redriven() {
    let tracker = MemoryDocumentTracker::new();
    tracker.mark_processing("doc-A", "1").await.unwrap();
    tracker.mark_failed("doc-A").await.unwrap();
    tracker.mark_processing("doc-A", "2").await.unwrap();
    assert_eq!(tracker.record("doc-A").unwrap().case_no, "2");
}

/// Test that transitions require a processing record
#[tokio::test]
async fn test_tracker_transition_needs_processing() {
    let tracker = MemoryDocumentTracker::new();
    assert!(tracker.mark_completed("doc-A").await.is_err());
    tracker.mark_processing("doc-A", "1").await.unwrap();
    tracker.mark_completed("doc-A").await.unwrap();
    assert!(tracker.mark_failed("doc-A").await.is_err());
}

/// Test that documents without an id are never tracked
#[tokio::test]
async fn test_tracker_ignores_empty_id() {
    let tracker = MemoryDocumentTracker::new();
    tracker.mark_processing("", "1").await.unwrap();
    tracker.mark_completed("").await.unwrap();
    tracker.mark_failed("").await.unwrap();
    assert!(tracker.record("").is_none());
    assert_eq!(tracker.lookup("").await.unwrap(), None);
}

/// Test that lookup reports the stored case number and status
#[tokio::test]
async fn test_tracker_lookup() {
    let tracker = MemoryDocumentTracker::new();
    assert_eq!(tracker.lookup("doc-A").await.unwrap(), None);
    tracker.mark_processing("doc-A", "700012341234").await.unwrap();
    tracker.mark_failed("doc-A").await.unwrap();
    assert_eq!(
        tracker.lookup("doc-A").await.unwrap(),
        Some(TrackerRecord {
            case_no: "700012341234".into(),
            status: DocumentStatus::Failed
        })
    );
}
