//! Request and response bodies of the case service (Sirius) public API.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `{field: {code: message}}` as returned in `validation_errors`.
pub type FieldErrors = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseType {
    Lpa,
    Epa,
    Order,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedCaseRequest {
    pub batch_id: String,
    pub case_type: CaseType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court_reference: Option<String>,
    pub receipt_date: String,
    pub created_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedCaseResponse {
    #[serde(rename = "uId", alias = "uid", default)]
    pub uid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedDocumentRequest {
    pub case_reference: String,
    /// Base64 PDF exactly as received in the envelope.
    pub content: String,
    pub document_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_sub_type: Option<String>,
    pub scanned_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedDocumentResponse {
    #[serde(default)]
    pub uuid: String,
}

/// Error body of a 4xx response. Only `validation_errors` is interpreted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub validation_errors: FieldErrors,
    #[serde(default)]
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_request_wire_names() {
        let req = ScannedCaseRequest {
            batch_id: "02-0001112-20160909185000".into(),
            case_type: CaseType::Order,
            court_reference: Some("12345678".into()),
            receipt_date: "2014-09-26T12:38:53Z".into(),
            created_date: "2024-01-01T00:00:00Z".into(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["batchId"], "02-0001112-20160909185000");
        assert_eq!(json["caseType"], "order");
        assert_eq!(json["courtReference"], "12345678");
        assert_eq!(json["receiptDate"], "2014-09-26T12:38:53Z");
    }

    #[test]
    fn test_court_reference_omitted_when_absent() {
        let req = ScannedCaseRequest {
            batch_id: "b".into(),
            case_type: CaseType::Lpa,
            court_reference: None,
            receipt_date: "r".into(),
            created_date: "c".into(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("courtReference").is_none());
    }

    #[test]
    fn test_case_response_accepts_both_uid_spellings() {
        let a: ScannedCaseResponse = serde_json::from_str(r#"{"uId":"7000-1234-1234"}"#).unwrap();
        let b: ScannedCaseResponse = serde_json::from_str(r#"{"uid":"7000-1234-1234"}"#).unwrap();
        assert_eq!(a, b);
        let missing: ScannedCaseResponse = serde_json::from_str("{}").unwrap();
        assert!(missing.uid.is_empty());
    }

    #[test]
    fn test_error_body_validation_errors() {
        let body: ErrorBody = serde_json::from_str(
            r#"{"validation_errors":{"caseReference":{"notFound":"Case not found"}}}"#,
        )
        .unwrap();
        assert!(body.validation_errors.contains_key("caseReference"));
    }
}
