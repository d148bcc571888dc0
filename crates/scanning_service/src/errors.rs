//! Translation of pipeline failures into the public API response.

use crate::ingest::IngestError;
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use scanning_documents::DocumentError;
use scanning_protocol::{normalize_uid, ApiResponse};
use scanning_sirius::CaseServiceError;
use std::error::Error as StdError;
use tracing::{error, info};

pub const TOO_LARGE_MESSAGE: &str =
    "Request content too large: the XML document exceeds the maximum allowed size";
const PERSIST_DOCUMENT_MESSAGE: &str = "Failed to persist document to Sirius";
const SANITIZE_MESSAGE: &str = "Validate and sanitize XML failed";
const ENCODE_FAILED_MESSAGE: &str = "Failed to encode response";
const MISSING_UID_MESSAGE: &str = "Invalid response from Sirius when creating case stub, \
     scannedCaseResponse is nil or missing UID";

/// What the caller is told about a failed (or already handled) request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicError {
    pub status: StatusCode,
    pub message: String,
    pub validation_errors: Option<Vec<String>>,
    /// Set for outcomes reported as success, i.e. an already processed document.
    pub uid: Option<String>,
}

impl PublicError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            validation_errors: None,
            uid: None,
        }
    }

    fn with_errors(mut self, errors: Option<&[String]>) -> Self {
        self.validation_errors = errors.map(<[String]>::to_vec);
        self
    }

    pub fn body(&self) -> ApiResponse {
        match &self.uid {
            Some(uid) => ApiResponse::success(uid.as_str(), self.message.as_str()),
            None => ApiResponse::failure(self.message.as_str(), self.validation_errors.clone()),
        }
    }
}

pub fn public_error(err: &IngestError) -> PublicError {
    match err {
        IngestError::MethodNotAllowed(_) => {
            PublicError::new(StatusCode::METHOD_NOT_ALLOWED, "Invalid HTTP method")
        }
        IngestError::InvalidContentType(_) => {
            PublicError::new(StatusCode::BAD_REQUEST, "Invalid content type")
        }
        IngestError::InvalidBody(_) => {
            PublicError::new(StatusCode::BAD_REQUEST, "Invalid request body")
        }
        IngestError::BodyTooLarge => {
            PublicError::new(StatusCode::PAYLOAD_TOO_LARGE, TOO_LARGE_MESSAGE)
        }
        IngestError::PersistSet(_) => {
            PublicError::new(StatusCode::INTERNAL_SERVER_ERROR, "Could not persist set to S3")
        }
        IngestError::Envelope(e) => PublicError::new(StatusCode::BAD_REQUEST, SANITIZE_MESSAGE)
            .with_errors(e.validation_errors()),
        IngestError::Document(e) => match e {
            DocumentError::UnsupportedType(_) | DocumentError::Schema { .. } => {
                PublicError::new(StatusCode::BAD_REQUEST, e.to_string())
                    .with_errors(e.validation_errors())
            }
            _ => PublicError::new(StatusCode::BAD_REQUEST, SANITIZE_MESSAGE),
        },
        IngestError::SetRules(e) => PublicError::new(StatusCode::BAD_REQUEST, "Validate set failed")
            .with_errors(Some(&e.errors)),
        IngestError::CreateCase(CaseServiceError::MissingUid { .. }) => {
            PublicError::new(StatusCode::INTERNAL_SERVER_ERROR, MISSING_UID_MESSAGE)
        }
        IngestError::CreateCase(_) => PublicError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to create case stub in Sirius",
        ),
        IngestError::AlreadyProcessed { case_no } => PublicError {
            uid: Some(normalize_uid(case_no)),
            ..PublicError::new(StatusCode::ALREADY_REPORTED, "Document has already been processed")
        },
        IngestError::Attach { uid, source } => attach_error(uid, source),
        _ => PublicError::new(StatusCode::INTERNAL_SERVER_ERROR, PERSIST_DOCUMENT_MESSAGE),
    }
}

fn attach_error(uid: &str, source: &CaseServiceError) -> PublicError {
    match source.status_code() {
        Some(400) if source.has_field_error("caseReference") => {
            PublicError::new(StatusCode::BAD_REQUEST, format!("{} is not a valid case UID", uid))
        }
        Some(404) => {
            PublicError::new(StatusCode::BAD_REQUEST, format!("Case not found with UID {}", uid))
        }
        Some(413) => PublicError::new(StatusCode::PAYLOAD_TOO_LARGE, TOO_LARGE_MESSAGE),
        _ => PublicError::new(StatusCode::INTERNAL_SERVER_ERROR, PERSIST_DOCUMENT_MESSAGE),
    }
}

/// `err` followed by each of its sources, colon separated.
pub fn error_chain(err: &dyn StdError) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

/// Log a failed request at a level matching its status and build the response.
pub fn error_response(err: &IngestError) -> Response {
    let public = public_error(err);
    if public.status.is_server_error() {
        error!(
            status = public.status.as_u16(),
            error = %error_chain(err),
            "{}",
            public.message
        );
    } else {
        info!(
            status = public.status.as_u16(),
            error = %error_chain(err),
            validation_errors = ?public.validation_errors,
            "{}",
            public.message
        );
    }
    render(public.status, &public.body())
}

fn json_encoder(body: &ApiResponse) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(body)
}

fn json_response(status: StatusCode, bytes: Vec<u8>) -> Response {
    (status, [(CONTENT_TYPE, "application/json")], bytes).into_response()
}

pub fn render(status: StatusCode, body: &ApiResponse) -> Response {
    render_with(status, body, json_encoder)
}

/// Encode `body`. A failed encode is retried once as a generic 500 body, and a
/// second failure leaves a bare 500.
pub fn render_with(
    status: StatusCode,
    body: &ApiResponse,
    encode: impl Fn(&ApiResponse) -> Result<Vec<u8>, serde_json::Error>,
) -> Response {
    match encode(body) {
        Ok(bytes) => json_response(status, bytes),
        Err(e) => {
            error!(error = %e, status = status.as_u16(), "Failed to encode response");
            match encode(&ApiResponse::failure(ENCODE_FAILED_MESSAGE, None)) {
                Ok(bytes) => json_response(StatusCode::INTERNAL_SERVER_ERROR, bytes),
                Err(e) => {
                    error!(error = %e, "Failed to encode fallback response");
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanning_documents::SetValidationError;
    use scanning_protocol::FieldErrors;
    use scanning_store::{StoreError, TrackerError};
    use serde::ser::Error as _;
    use std::cell::Cell;
    use std::collections::BTreeMap;

    fn status_error(status_code: u16, field: Option<&str>) -> CaseServiceError {
        let validation_errors = field.map(|field| {
            let mut errors = FieldErrors::new();
            errors.insert(
                field.to_string(),
                BTreeMap::from([("notFound".to_string(), "bad".to_string())]),
            );
            errors
        });
        CaseServiceError::Status {
            status_code,
            validation_errors,
        }
    }

    fn attach(status_code: u16, field: Option<&str>) -> IngestError {
        IngestError::Attach {
            uid: "700012341234".to_string(),
            source: status_error(status_code, field),
        }
    }

    #[test]
    fn test_request_shape_errors() {
        let method = public_error(&IngestError::MethodNotAllowed("GET".to_string()));
        assert_eq!(method.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(method.message, "Invalid HTTP method");

        let content = public_error(&IngestError::InvalidContentType("text/plain".to_string()));
        assert_eq!(content.status, StatusCode::BAD_REQUEST);
        assert_eq!(content.message, "Invalid content type");

        let body = public_error(&IngestError::InvalidBody("empty".to_string()));
        assert_eq!((body.status, body.message.as_str()), (StatusCode::BAD_REQUEST, "Invalid request body"));
    }

    #[test]
    fn test_validation_errors_carry_lists() {
        let set = public_error(&IngestError::SetRules(SetValidationError {
            errors: vec!["no Document elements found in Body".to_string()],
        }));
        assert_eq!(set.status, StatusCode::BAD_REQUEST);
        assert_eq!(set.message, "Validate set failed");
        assert_eq!(
            set.validation_errors,
            Some(vec!["no Document elements found in Body".to_string()])
        );

        let unsupported = public_error(&IngestError::Document(DocumentError::UnsupportedType(
            "LP3".to_string(),
        )));
        assert_eq!(unsupported.status, StatusCode::BAD_REQUEST);
        assert_eq!(unsupported.message, "Document type LP3 is not supported");

        let mismatch = public_error(&IngestError::Document(DocumentError::RootMismatch {
            expected: "LP1F".to_string(),
            found: "LP2".to_string(),
        }));
        assert_eq!(mismatch.message, SANITIZE_MESSAGE);
        assert_eq!(mismatch.validation_errors, None);
    }

    #[test]
    fn test_case_creation_errors() {
        let missing = public_error(&IngestError::CreateCase(CaseServiceError::MissingUid {
            url: "http://sirius/api".to_string(),
        }));
        assert_eq!(missing.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(missing.message.contains("missing UID"));

        let failed = public_error(&IngestError::CreateCase(status_error(500, None)));
        assert_eq!(failed.message, "Failed to create case stub in Sirius");
    }

    #[test]
    fn test_attach_errors() {
        let invalid = public_error(&attach(400, Some("caseReference")));
        assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
        assert_eq!(invalid.message, "700012341234 is not a valid case UID");

        let other_field = public_error(&attach(400, Some("scannedDate")));
        assert_eq!(other_field.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(other_field.message, PERSIST_DOCUMENT_MESSAGE);

        let not_found = public_error(&attach(404, None));
        assert_eq!(not_found.status, StatusCode::BAD_REQUEST);
        assert_eq!(not_found.message, "Case not found with UID 700012341234");

        let too_large = public_error(&attach(413, None));
        assert_eq!(too_large.status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(too_large.message, TOO_LARGE_MESSAGE);
    }

    #[test]
    fn test_already_processed_reports_success() {
        let public = public_error(&IngestError::AlreadyProcessed {
            case_no: "7000-1234-1234".to_string(),
        });
        assert_eq!(public.status, StatusCode::ALREADY_REPORTED);
        let body = serde_json::to_value(public.body()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"data": {
                "success": true,
                "uid": "700012341234",
                "message": "Document has already been processed"
            }})
        );
    }

    #[test]
    fn test_internal_errors_fall_back() {
        let errors = [
            IngestError::Tracker(TrackerError::Conflict {
                id: "doc-A".to_string(),
                status: "PROCESSING".to_string(),
            }),
            IngestError::Enqueue(StoreError::Queue {
                queue: "ddc.fifo".to_string(),
                message: "throttled".to_string(),
            }),
            IngestError::Detached("panicked".to_string()),
        ];
        for err in &errors {
            let public = public_error(err);
            assert_eq!(public.status, StatusCode::INTERNAL_SERVER_ERROR, "{err}");
            assert_eq!(public.message, PERSIST_DOCUMENT_MESSAGE);
        }
        let persist = public_error(&IngestError::PersistSet(StoreError::Upload {
            bucket: "b".to_string(),
            key: "k".to_string(),
            message: "down".to_string(),
        }));
        assert_eq!(persist.message, "Could not persist set to S3");
    }

    #[test]
    fn test_error_chain_includes_sources() {
        let err = IngestError::Attach {
            uid: "700012341234".to_string(),
            source: status_error(404, None),
        };
        assert_eq!(
            error_chain(&err),
            "failed to attach document to case 700012341234: case service responded with status 404"
        );
    }

    #[test]
    fn test_encoding_failure_falls_back_once() {
        let calls = Cell::new(0);
        let response = render_with(
            StatusCode::BAD_REQUEST,
            &ApiResponse::failure("Invalid content type", None),
            |body| {
                calls.set(calls.get() + 1);
                if calls.get() == 1 {
                    Err(serde_json::Error::custom("boom"))
                } else {
                    serde_json::to_vec(body)
                }
            },
        );
        assert_eq!(calls.get(), 2);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_second_encoding_failure_is_bare_status() {
        let calls = Cell::new(0);
        let response = render_with(StatusCode::ACCEPTED, &ApiResponse::queued("7"), |_| {
            calls.set(calls.get() + 1);
            Err(serde_json::Error::custom("boom"))
        });
        assert_eq!(calls.get(), 2);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(CONTENT_TYPE).is_none());
    }
}
