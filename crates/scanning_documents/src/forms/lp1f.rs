//! LP1F: lasting power of attorney for property and financial affairs.
//!
//! Only the signature pages are bound. Everything else on the form is left to
//! the schema.

use super::common::{FormCheck, Signed, Witness};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Lp1f {
    #[serde(rename = "Page10")]
    pub page10: DonorPage,
    #[serde(rename = "Page11")]
    pub page11: CertificatePage,
    #[serde(rename = "Page12")]
    pub page12: Vec<AttorneyPage>,
    #[serde(rename = "Page20")]
    pub page20: Vec<ApplicantPage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DonorPage {
    #[serde(rename = "Section9")]
    pub section9: DonorSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DonorSection {
    #[serde(rename = "Donor")]
    pub donor: Signed,
    #[serde(rename = "Witness")]
    pub witness: Witness,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CertificatePage {
    #[serde(rename = "Section10")]
    pub section10: Signed,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AttorneyPage {
    #[serde(rename = "Section11")]
    pub section11: AttorneySection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AttorneySection {
    #[serde(rename = "Attorney")]
    pub attorney: Signed,
    #[serde(rename = "Witness")]
    pub witness: Witness,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApplicantPage {
    #[serde(rename = "Section15")]
    pub section15: ApplicantSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApplicantSection {
    #[serde(rename = "Applicant")]
    pub applicant: Vec<Signed>,
}

/// Certificate provider, attorney and applicant checks shared with LP1H.
pub(crate) fn check_signature_pages(
    check: &mut FormCheck,
    certificate: &CertificatePage,
    attorneys: &[AttorneyPage],
    applicants: &[ApplicantPage],
) {
    check.signature_date(
        "Page11",
        "Section10",
        None,
        "Certificate Provider",
        &certificate.section10,
    );
    for (i, page) in attorneys.iter().enumerate() {
        let label = format!("Page12[{}]", i);
        check.witness(&label, "Section11", &page.section11.witness);
        check.signature_date(
            &label,
            "Section11",
            Some("Attorney"),
            "Attorney",
            &page.section11.attorney,
        );
    }
    for page in applicants {
        check.applicants(&page.section15.applicant);
    }
}

impl Lp1f {
    pub fn validate(&self, now: DateTime<Utc>) -> Vec<String> {
        let mut check = FormCheck::new(now);
        check.witness("Page10", "Section9", &self.page10.section9.witness);
        check.signature_date(
            "Page10",
            "Section9",
            Some("Donor"),
            "Donor",
            &self.page10.section9.donor,
        );
        check_signature_pages(&mut check, &self.page11, &self.page12, &self.page20);
        check.finish()
    }
}
