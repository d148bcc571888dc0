//! JSON contract of `POST /api/ddc`.

use serde::{Deserialize, Serialize};

/// `{"data": {...}}` wrapper returned for every ingest outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub data: ResponseData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseData {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(
        rename = "validationErrors",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub validation_errors: Option<Vec<String>>,
}

impl ApiResponse {
    pub fn success(uid: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            data: ResponseData {
                success: true,
                message: message.into(),
                uid: Some(uid.into()),
                validation_errors: None,
            },
        }
    }

    pub fn failure(message: impl Into<String>, validation_errors: Option<Vec<String>>) -> Self {
        Self {
            data: ResponseData {
                success: false,
                message: message.into(),
                uid: None,
                validation_errors: validation_errors.filter(|v| !v.is_empty()),
            },
        }
    }

    /// Message used on 202 responses.
    pub fn queued(uid: &str) -> Self {
        Self::success(
            uid,
            format!("The document set for case {} has been queued for processing", uid),
        )
    }
}
