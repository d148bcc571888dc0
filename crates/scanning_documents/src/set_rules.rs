//! Set level rules and the case-creation decision.

use crate::date::{format_scan_time, to_rfc3339};
use crate::error::SetValidationError;
use chrono::{DateTime, Utc};
use scanning_protocol::{CaseCategory, CaseType, DocumentType, ScannedCaseRequest, Set};

/// Check every set rule and report all that were broken.
pub fn validate_set(set: &Set) -> Result<(), SetValidationError> {
    let mut errors: Vec<String> = Vec::new();

    match &set.header {
        None => errors.push("missing required Header element".into()),
        Some(header) if header.schedule.trim().is_empty() => {
            errors.push("missing required Schedule attribute on Header".into())
        }
        Some(_) => {}
    }

    let documents = set.documents();
    if documents.is_empty() {
        errors.push("no Document elements found in Body".into());
    }
    for doc in documents {
        if doc.doc_type.trim().is_empty() {
            errors.push("document Type attribute is missing".into());
        }
        if doc.no_pages == 0 {
            errors.push("document NoPages attribute is missing or invalid".into());
        }
    }

    let creating = documents
        .iter()
        .filter_map(|d| DocumentType::parse(&d.doc_type))
        .filter(|t| t.creates_case())
        .count();
    let has_case_no = !set.case_no().trim().is_empty();

    if creating > 1 {
        errors.push("set cannot contain multiple cases which would create a case".into());
    }
    if creating > 0 && has_case_no {
        errors.push("must not supply a case number when creating a new case".into());
    }
    if creating == 0 && !has_case_no {
        errors.push("must supply a case number when not creating a new case".into());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SetValidationError { errors })
    }
}

/// Case the set asks the case service to create, decided by the first
/// document with a case category. A court order only counts when the
/// envelope carries a case number. `None` means attach to the envelope case.
pub fn case_request(set: &Set, now: DateTime<Utc>) -> Option<ScannedCaseRequest> {
    let case_no = set.case_no().trim();
    let category = set
        .documents()
        .iter()
        .filter_map(|d| DocumentType::parse(&d.doc_type))
        .filter_map(DocumentType::case_category)
        .find(|category| *category != CaseCategory::Order || !case_no.is_empty())?;

    let (case_type, court_reference) = match category {
        CaseCategory::Lpa => (CaseType::Lpa, None),
        CaseCategory::Epa => (CaseType::Epa, None),
        CaseCategory::Order => (CaseType::Order, Some(case_no.to_string())),
    };

    Some(ScannedCaseRequest {
        batch_id: set.schedule().to_string(),
        case_type,
        court_reference,
        receipt_date: format_scan_time(set.scan_time(), now),
        created_date: to_rfc3339(now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use scanning_protocol::{Body, Document, Header};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

    fn set(case_no: &str, types: &[&str]) -> Set {
        Set {
            header: Some(Header {
                case_no: case_no.to_string(),
                scan_time: "2014-09-26 12:38:53".to_string(),
                schedule: "02-0001112-20160909185000".to_string(),
                ..Header::default()
            }),
            body: Body {
                documents: types
                    .iter()
                    .map(|t| Document {
                        doc_type: t.to_string(),
                        no_pages: 1,
                        ..Document::default()
                    })
                    .collect(),
            },
        }
    }

    fn errors(set: &Set) -> Vec<String> {
        validate_set(set).err().map(|e| e.errors).unwrap_or_default()
    }

    #[test]
    fn test_valid_sets() {
        assert!(validate_set(&set("", &["LP1F"])).is_ok());
        assert!(validate_set(&set("700012341234", &["Correspondence", "LPA120"])).is_ok());
        assert!(validate_set(&set("12345678", &["COPORD"])).is_ok());
    }

    #[test]
    fn test_header_and_body_rules() {
        let mut s = set("", &[]);
        s.header = None;
        assert_eq!(
            errors(&s),
            vec![
                "missing required Header element",
                "no Document elements found in Body",
                "must supply a case number when not creating a new case",
            ]
        );

        let mut s = set("7000", &["Correspondence"]);
        s.header.as_mut().unwrap().schedule = " ".into();
        s.body.documents[0].no_pages = 0;
        assert_eq!(
            errors(&s),
            vec![
                "missing required Schedule attribute on Header",
                "document NoPages attribute is missing or invalid",
            ]
        );
    }

    #[test]
    fn test_case_number_rules() {
        assert_eq!(
            errors(&set("700012341234", &["LP1F"])),
            vec!["must not supply a case number when creating a new case"]
        );
        assert_eq!(
            errors(&set("", &["Correspondence"])),
            vec!["must supply a case number when not creating a new case"]
        );
        assert_eq!(
            errors(&set("", &["LP1F", "EP2PG"])),
            vec!["set cannot contain multiple cases which would create a case"]
        );
    }

    #[test]
    fn test_case_request_categories() {
        let lpa = case_request(&set("", &["Correspondence", "LP2"]), now()).unwrap();
        assert_eq!(lpa.case_type, CaseType::Lpa);
        assert_eq!(lpa.batch_id, "02-0001112-20160909185000");
        assert_eq!(lpa.receipt_date, "2014-09-26T12:38:53Z");
        assert_eq!(lpa.created_date, "2024-01-01T09:00:00Z");
        assert_eq!(lpa.court_reference, None);

        let epa = case_request(&set("", &["EPA"]), now()).unwrap();
        assert_eq!(epa.case_type, CaseType::Epa);

        let order = case_request(&set("12345678", &["COPORD"]), now()).unwrap();
        assert_eq!(order.case_type, CaseType::Order);
        assert_eq!(order.court_reference.as_deref(), Some("12345678"));

        assert!(case_request(&set("", &["COPORD"]), now()).is_none());
        assert!(case_request(&set("700012341234", &["Correspondence"]), now()).is_none());
    }

    #[test]
    fn test_court_order_without_case_number_is_skipped() {
        let s = set("", &["COPORD", "LP1F"]);
        assert!(validate_set(&s).is_ok());
        let request = case_request(&s, now()).unwrap();
        assert_eq!(request.case_type, CaseType::Lpa);
        assert_eq!(request.court_reference, None);

        let order = case_request(&set("12345678", &["COPORD", "Correspondence"]), now()).unwrap();
        assert_eq!(order.case_type, CaseType::Order);
    }

    #[test]
    fn test_malformed_scan_time_falls_back_to_now() {
        let mut s = set("", &["LP1F"]);
        s.header.as_mut().unwrap().scan_time = "yesterday".into();
        let request = case_request(&s, now()).unwrap();
        assert_eq!(request.receipt_date, "2024-01-01T09:00:00Z");
    }
}
