//! LPA120: application for a fee exemption or remission.

use super::common::Address;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Lpa120 {
    #[serde(rename = "Page3")]
    pub page3: ApplicantPage,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApplicantPage {
    #[serde(rename = "Section1")]
    pub section1: Applicant,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Applicant {
    #[serde(rename = "FullName")]
    pub full_name: String,
    #[serde(rename = "Address")]
    pub address: Address,
    #[serde(rename = "CaseReference")]
    pub case_reference: String,
}
