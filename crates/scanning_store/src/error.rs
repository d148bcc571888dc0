use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The conditional put found an object under the key already.
    #[error("object {key} already exists")]
    AlreadyExists { key: String },

    #[error("invalid XML for {doc_type}: {message}")]
    InvalidXml { doc_type: String, message: String },

    #[error("failed to upload object {key} to bucket {bucket}: {message}")]
    Upload {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("failed to encode job message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to send message to queue {queue}: {message}")]
    Queue { queue: String, message: String },
}

#[derive(Debug, Error)]
pub enum TrackerError {
    /// The document reached a final state in an earlier request.
    #[error("document already processed")]
    AlreadyProcessed { case_no: String },

    /// The record is not in the state the write requires.
    #[error("document {id} is {status}, conditional write refused")]
    Conflict { id: String, status: String },

    #[error("document tracker request failed: {0}")]
    Backend(String),
}
