//! reqwest implementation of [`CaseService`].

use crate::error::CaseServiceError;
use crate::CaseService;
use async_trait::async_trait;
use reqwest::StatusCode;
use scanning_protocol::sirius::ErrorBody;
use scanning_protocol::{
    ScannedCaseRequest, ScannedCaseResponse, ScannedDocumentRequest, ScannedDocumentResponse,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct SiriusConfig {
    pub base_url: String,
    pub case_stub_path: String,
    pub attach_doc_path: String,
    /// Bound on each call, connect to last byte.
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SiriusClient {
    http: reqwest::Client,
    config: SiriusConfig,
}

impl SiriusClient {
    pub fn new(config: SiriusConfig) -> Result<Self, CaseServiceError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(CaseServiceError::Client)?;
        Ok(Self { http, config })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn post<B, R>(&self, path: &str, token: &str, body: &B) -> Result<R, CaseServiceError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        if token.is_empty() {
            return Err(CaseServiceError::MissingToken);
        }
        let url = self.url(path);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(body)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|source| CaseServiceError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|source| CaseServiceError::Transport {
                url: url.clone(),
                source,
            })?;

        if !status.is_success() {
            let validation_errors = if status == StatusCode::BAD_REQUEST {
                serde_json::from_str::<ErrorBody>(&text)
                    .ok()
                    .map(|body| body.validation_errors)
                    .filter(|errors| !errors.is_empty())
            } else {
                None
            };
            warn!(%url, status = status.as_u16(), "Case service rejected request");
            return Err(CaseServiceError::Status {
                status_code: status.as_u16(),
                validation_errors,
            });
        }

        debug!(%url, status = status.as_u16(), "Case service accepted request");
        serde_json::from_str(&text).map_err(|source| CaseServiceError::Decode { url, source })
    }
}

#[async_trait]
impl CaseService for SiriusClient {
    async fn create_case_stub(
        &self,
        token: &str,
        request: &ScannedCaseRequest,
    ) -> Result<ScannedCaseResponse, CaseServiceError> {
        let path = &self.config.case_stub_path;
        let response: ScannedCaseResponse = self.post(path, token, request).await?;
        if response.uid.trim().is_empty() {
            return Err(CaseServiceError::MissingUid {
                url: self.url(path),
            });
        }
        Ok(response)
    }

    async fn attach_document(
        &self,
        token: &str,
        request: &ScannedDocumentRequest,
    ) -> Result<ScannedDocumentResponse, CaseServiceError> {
        self.post(&self.config.attach_doc_path, token, request).await
    }
}
