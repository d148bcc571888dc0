//! S3, SQS and DynamoDB backends.

use crate::error::{StoreError, TrackerError};
use crate::xml::check_well_formed;
use crate::{
    tracker_key, DocumentStatus, DocumentTracker, JobQueue, ObjectStore, TrackerRecord,
};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValuesOnConditionCheckFailure};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ServerSideEncryption;
use scanning_protocol::{form_object_key, set_object_key, JobMessage};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Shared SDK configuration. `endpoint` points every client at a local stack.
pub async fn sdk_config(region: &str, endpoint: Option<&str>) -> SdkConfig {
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));
    if let Some(endpoint) = endpoint {
        loader = loader.endpoint_url(endpoint);
    }
    loader.load().await
}

pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    kms_key: String,
}

impl S3ObjectStore {
    pub fn new(config: &SdkConfig, bucket: String, kms_key: String) -> Self {
        // Local stacks only serve path-style URLs.
        let s3_config = aws_sdk_s3::config::Builder::from(config)
            .force_path_style(config.endpoint_url().is_some())
            .build();
        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            bucket,
            kms_key,
        }
    }

    async fn put(&self, key: &str, body: &[u8]) -> Result<(), StoreError> {
        let result = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body.to_vec()))
            .server_side_encryption(ServerSideEncryption::AwsKms)
            .ssekms_key_id(&self.kms_key)
            .if_none_match("*")
            .send()
            .await;

        match result {
            Ok(_) => {
                debug!(bucket = %self.bucket, key, "Stored object");
                Ok(())
            }
            Err(err) if err.raw_response().map(|r| r.status().as_u16()) == Some(412) => {
                Err(StoreError::AlreadyExists {
                    key: key.to_string(),
                })
            }
            Err(err) => Err(StoreError::Upload {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                message: DisplayErrorContext(&err).to_string(),
            }),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn persist_envelope(&self, body: &[u8]) -> Result<String, StoreError> {
        let key = set_object_key(Uuid::now_v7());
        self.put(&key, body).await?;
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
        self.put(&key, body).await?;
        Ok(key)
    }
}

pub struct SqsJobQueue {
    client: aws_sdk_sqs::Client,
    queue_url: String,
}

impl SqsJobQueue {
    pub fn new(config: &SdkConfig, queue_url: String) -> Self {
        Self {
            client: aws_sdk_sqs::Client::new(config),
            queue_url,
        }
    }
}

#[async_trait]
impl JobQueue for SqsJobQueue {
    async fn enqueue_for_processing(
        &self,
        uid: &str,
        filename: &str,
    ) -> Result<String, StoreError> {
        let body = JobMessage::form_job(uid, filename).to_json()?;
        let output = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .message_group_id(uid)
            .send()
            .await
            .map_err(|err| StoreError::Queue {
                queue: self.queue_url.clone(),
                message: aws_sdk_sqs::error::DisplayErrorContext(&err).to_string(),
            })?;

        let message_id = output.message_id().unwrap_or_default().to_string();
        info!(uid, filename, message_id = %message_id, "Queued form job");
        Ok(message_id)
    }
}

pub struct DynamoDocumentTracker {
    client: aws_sdk_dynamodb::Client,
    table: String,
}

impl DynamoDocumentTracker {
    pub fn new(config: &SdkConfig, table: String) -> Self {
        Self {
            client: aws_sdk_dynamodb::Client::new(config),
            table,
        }
    }

    async fn transition(&self, id: &str, to: DocumentStatus) -> Result<(), TrackerError> {
        if id.is_empty() {
            return Ok(());
        }
        let key = tracker_key(id);
        let result = self
            .client
            .update_item()
            .table_name(&self.table)
            .key("PK", AttributeValue::S(key.clone()))
            .key("SK", AttributeValue::S(key))
            .update_expression("SET #Status = :NewStatus")
            .condition_expression("#Status = :Processing")
            .expression_attribute_names("#Status", "Status")
            .expression_attribute_values(
                ":Processing",
                AttributeValue::S(DocumentStatus::Processing.as_str().to_string()),
            )
            .expression_attribute_values(":NewStatus", AttributeValue::S(to.as_str().to_string()))
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => match err.as_service_error() {
                Some(UpdateItemError::ConditionalCheckFailedException(_)) => {
                    Err(TrackerError::Conflict {
                        id: id.to_string(),
                        status: "not PROCESSING".to_string(),
                    })
                }
                _ => Err(TrackerError::Backend(
                    aws_sdk_dynamodb::error::DisplayErrorContext(&err).to_string(),
                )),
            },
        }
    }
}

#[async_trait]
impl DocumentTracker for DynamoDocumentTracker {
    async fn lookup(&self, id: &str) -> Result<Option<TrackerRecord>, TrackerError> {
        if id.is_empty() {
            return Ok(None);
        }
        let key = tracker_key(id);
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key("PK", AttributeValue::S(key.clone()))
            .key("SK", AttributeValue::S(key))
            .consistent_read(true)
            .send()
            .await
            .map_err(|err| {
                TrackerError::Backend(aws_sdk_dynamodb::error::DisplayErrorContext(&err).to_string())
            })?;

        let Some(item) = output.item() else {
            return Ok(None);
        };
        let attribute = |name: &str| item.get(name).and_then(|value| value.as_s().ok());
        let status = attribute("Status").map(String::as_str).unwrap_or_default();
        let status = DocumentStatus::parse(status).ok_or_else(|| {
            TrackerError::Backend(format!("document {} has unknown status '{}'", id, status))
        })?;
        Ok(Some(TrackerRecord {
            case_no: attribute("CaseNo").cloned().unwrap_or_default(),
            status,
        }))
    }

    async fn mark_processing(&self, id: &str, case_no: &str) -> Result<(), TrackerError> {
        if id.is_empty() {
            return Ok(());
        }
        let key = tracker_key(id);
        let result = self
            .client
            .put_item()
            .table_name(&self.table)
            .item("PK", AttributeValue::S(key.clone()))
            .item("SK", AttributeValue::S(key))
            .item("CaseNo", AttributeValue::S(case_no.to_string()))
            .item(
                "Status",
                AttributeValue::S(DocumentStatus::Processing.as_str().to_string()),
            )
            .condition_expression("attribute_not_exists(PK) OR #Status = :Failed")
            .expression_attribute_names("#Status", "Status")
            .expression_attribute_values(
                ":Failed",
                AttributeValue::S(DocumentStatus::Failed.as_str().to_string()),
            )
            .return_values_on_condition_check_failure(ReturnValuesOnConditionCheckFailure::AllOld)
            .send()
            .await;

        let err = match result {
            Ok(_) => return Ok(()),
            Err(err) => err,
        };
        let Some(PutItemError::ConditionalCheckFailedException(failed)) = err.as_service_error()
        else {
            return Err(TrackerError::Backend(
                aws_sdk_dynamodb::error::DisplayErrorContext(&err).to_string(),
            ));
        };

        let attribute = |name: &str| {
            failed
                .item()
                .and_then(|item| item.get(name))
                .and_then(|value| value.as_s().ok())
                .cloned()
                .unwrap_or_default()
        };
        let status = attribute("Status");
        match DocumentStatus::parse(&status) {
            Some(DocumentStatus::Completed) | Some(DocumentStatus::Failed) => {
                Err(TrackerError::AlreadyProcessed {
                    case_no: attribute("CaseNo"),
                })
            }
            _ => {
                warn!(document_id = id, status = %status, "Document is already being processed");
                Err(TrackerError::Conflict {
                    id: id.to_string(),
                    status,
                })
            }
        }
    }

    async fn mark_completed(&self, id: &str) -> Result<(), TrackerError> {
        self.transition(id, DocumentStatus::Completed).await
    }

    async fn mark_failed(&self, id: &str) -> Result<(), TrackerError> {
        self.transition(id, DocumentStatus::Failed).await
    }
}
