//! LP1H: lasting power of attorney for health and welfare.
//!
//! Laid out like LP1F, except the donor signs under one of two options
//! about life-sustaining treatment.

use super::common::{FormCheck, Signed, Witness};
use super::lp1f::{check_signature_pages, ApplicantPage, AttorneyPage, CertificatePage};
use crate::date::parse_date;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Lp1h {
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
    pub donor: DonorOptions,
    #[serde(rename = "Witness")]
    pub witness: Witness,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DonorOptions {
    #[serde(rename = "OptionA")]
    pub option_a: Signed,
    #[serde(rename = "OptionB")]
    pub option_b: Signed,
}

impl Lp1h {
    pub fn validate(&self, now: DateTime<Utc>) -> Vec<String> {
        let mut check = FormCheck::new(now);
        check.witness("Page10", "Section9", &self.page10.section9.witness);

        let donor = &self.page10.section9.donor;
        let signed_option = [&donor.option_a, &donor.option_b]
            .into_iter()
            .filter(|option| option.signature.is_set())
            .find_map(|option| parse_date(&option.date));
        match signed_option {
            Some(date) => check.record_date(date),
            None => check.add("donor signature and date are not set in either Option A or Option B"),
        }

        check_signature_pages(&mut check, &self.page11, &self.page12, &self.page20);
        check.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn form(donor: &str) -> Lp1h {
        let xml = format!(
            r#"<LP1H>
  <Page10><Section9>
    <Donor>{donor}</Donor>
    <Witness><Signature>true</Signature><FullName>W</FullName>
      <Address><Address1>1 Road</Address1><Postcode>AB1 2CD</Postcode></Address></Witness>
  </Section9></Page10>
  <Page11><Section10><Signature>true</Signature><Date>02/02/2024</Date></Section10></Page11>
  <Page20><Section15><Applicant><Signature>true</Signature><Date>10/02/2024</Date></Applicant></Section15></Page20>
</LP1H>"#
        );
        quick_xml::de::from_str(&xml).unwrap()
    }

    #[test]
    fn test_option_b_is_enough() {
        let lp1h = form("<OptionB><Signature>true</Signature><Date>01/02/2024</Date></OptionB>");
        assert!(lp1h.validate(now()).is_empty());
    }

    #[test]
    fn test_neither_option_signed() {
        let lp1h = form("<OptionA><Signature>false</Signature><Date>01/02/2024</Date></OptionA>");
        assert_eq!(
            lp1h.validate(now()),
            vec!["donor signature and date are not set in either Option A or Option B"]
        );
    }
}
