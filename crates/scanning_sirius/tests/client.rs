//! SiriusClient against a local stub of the case-service API.

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::routing::post;
use axum::{Json, Router};
use scanning_protocol::{CaseType, ScannedCaseRequest, ScannedDocumentRequest};
use scanning_sirius::{CaseService, CaseServiceError, SiriusClient, SiriusConfig};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct Seen {
    path: String,
    authorization: String,
    content_type: String,
    body: Value,
}

struct Stub {
    status: StatusCode,
    body: &'static str,
    delay: Duration,
    seen: Mutex<Vec<Seen>>,
}

impl Stub {
    fn new(status: StatusCode, body: &'static str) -> Arc<Self> {
        Arc::new(Self {
            status,
            body,
            delay: Duration::ZERO,
            seen: Mutex::new(Vec::new()),
        })
    }
}

async fn handle(
    State(stub): State<Arc<Stub>>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], &'static str) {
    let text = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };
    stub.seen.lock().unwrap().push(Seen {
        path: uri.path().to_string(),
        authorization: text(header::AUTHORIZATION),
        content_type: text(header::CONTENT_TYPE),
        body,
    });
    tokio::time::sleep(stub.delay).await;
    (
        stub.status,
        [(header::CONTENT_TYPE, "application/json")],
        stub.body,
    )
}

async fn client_for(stub: Arc<Stub>, timeout: Duration) -> SiriusClient {
    let app = Router::new()
        .route("/*path", post(handle))
        .with_state(stub);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    SiriusClient::new(SiriusConfig {
        base_url: format!("http://{}", addr),
        case_stub_path: "api/public/v1/scanned-cases".into(),
        attach_doc_path: "api/public/v1/scanned-documents".into(),
        timeout,
    })
    .unwrap()
}

fn case_request() -> ScannedCaseRequest {
    ScannedCaseRequest {
        batch_id: "02-0001112-20160909185000".into(),
        case_type: CaseType::Lpa,
        court_reference: None,
        receipt_date: "2014-09-26T12:38:53Z".into(),
        created_date: "2024-01-01T00:00:00Z".into(),
    }
}

fn document_request() -> ScannedDocumentRequest {
    ScannedDocumentRequest {
        case_reference: "700012341234".into(),
        content: "JVBERi0=".into(),
        document_type: "Correspondence".into(),
        document_sub_type: Some("Legal".into()),
        scanned_date: "2014-09-26T12:38:53Z".into(),
    }
}

// =============================================================================
// Successful calls
// =============================================================================

/// Test that case creation posts JSON with the bearer token and returns the UID
#[tokio::test]
async fn test_create_case_stub() {
    let stub = Stub::new(StatusCode::CREATED, r#"{"uId":"7000-1234-1234"}"#);
    let client = client_for(Arc::clone(&stub), Duration::from_secs(5)).await;

    let response = client
        .create_case_stub("token-abc", &case_request())
        .await
        .unwrap();
    assert_eq!(response.uid, "7000-1234-1234");

    let seen = stub.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].path, "/api/public/v1/scanned-cases");
    assert_eq!(seen[0].authorization, "Bearer token-abc");
    assert_eq!(seen[0].content_type, "application/json");
    assert_eq!(seen[0].body["caseType"], "lpa");
    assert_eq!(seen[0].body["batchId"], "02-0001112-20160909185000");
}

/// Test that attach forwards the document sub type
#[tokio::test]
async fn test_attach_document() {
    let stub = Stub::new(StatusCode::CREATED, r#"{"uuid":"5a8b1a26-8296-4373-ae61-f8d0b250e773"}"#);
    let client = client_for(Arc::clone(&stub), Duration::from_secs(5)).await;

    let response = client
        .attach_document("token-abc", &document_request())
        .await
        .unwrap();
    assert_eq!(response.uuid, "5a8b1a26-8296-4373-ae61-f8d0b250e773");

    let seen = stub.seen.lock().unwrap();
    assert_eq!(seen[0].path, "/api/public/v1/scanned-documents");
    assert_eq!(
        seen[0].body,
        json!({
            "caseReference": "700012341234",
            "content": "JVBERi0=",
            "documentType": "Correspondence",
            "documentSubType": "Legal",
            "scannedDate": "2014-09-26T12:38:53Z"
        })
    );
}

// =============================================================================
// Failures
// =============================================================================

/// Test that a 400 body's validation_errors are carried on the error
#[tokio::test]
async fn test_bad_request_carries_validation_errors() {
    let stub = Stub::new(
        StatusCode::BAD_REQUEST,
        r#"{"validation_errors":{"caseReference":{"notFound":"Case not found"}},"detail":"bad"}"#,
    );
    let client = client_for(stub, Duration::from_secs(5)).await;

    let err = client
        .attach_document("token-abc", &document_request())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(400));
    assert!(err.has_field_error("caseReference"));
}

/// Test that other statuses keep only the code
#[tokio::test]
async fn test_not_found_status() {
    let stub = Stub::new(StatusCode::NOT_FOUND, r#"{"validation_errors":{"x":{"y":"z"}}}"#);
    let client = client_for(stub, Duration::from_secs(5)).await;

    let err = client
        .attach_document("token-abc", &document_request())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CaseServiceError::Status {
            status_code: 404,
            validation_errors: None
        }
    ));
}

/// Test that a 2xx without a UID is rejected
#[tokio::test]
async fn test_missing_uid() {
    let stub = Stub::new(StatusCode::OK, "{}");
    let client = client_for(stub, Duration::from_secs(5)).await;

    let err = client
        .create_case_stub("token-abc", &case_request())
        .await
        .unwrap_err();
    assert!(matches!(err, CaseServiceError::MissingUid { .. }));
    assert!(err
        .to_string()
        .ends_with("scannedCaseResponse is nil or missing UID"));
}

/// Test that the per-call timeout bounds a slow case service
#[tokio::test]
async fn test_timeout() {
    let stub = Arc::new(Stub {
        status: StatusCode::OK,
        body: r#"{"uId":"700012341234"}"#,
        delay: Duration::from_secs(2),
        seen: Mutex::new(Vec::new()),
    });
    let client = client_for(stub, Duration::from_millis(100)).await;

    let err = client
        .create_case_stub("token-abc", &case_request())
        .await
        .unwrap_err();
    assert!(err.is_timeout(), "{err}");
}

/// Test that an empty token never reaches the network
#[tokio::test]
async fn test_missing_token() {
    let stub = Stub::new(StatusCode::OK, r#"{"uId":"700012341234"}"#);
    let client = client_for(Arc::clone(&stub), Duration::from_secs(5)).await;

    let err = client.create_case_stub("", &case_request()).await.unwrap_err();
    assert!(matches!(err, CaseServiceError::MissingToken));
    assert!(stub.seen.lock().unwrap().is_empty());
}
