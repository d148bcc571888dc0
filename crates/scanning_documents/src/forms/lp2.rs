//! LP2: application to register a lasting power of attorney.

use super::common::{Flag, FormCheck, DATE_FORMAT_ERROR};
use crate::date::parse_date;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Lp2 {
    #[serde(rename = "Page1")]
    pub page1: SubTypePage,
    #[serde(rename = "Page2")]
    pub page2: AttorneyDetailsPage,
    #[serde(rename = "Page5")]
    pub page5: AttorneySignaturePage,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubTypePage {
    #[serde(rename = "Section1")]
    pub section1: SubTypeSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubTypeSection {
    #[serde(rename = "PropertyFinancialAffairs")]
    pub property_financial_affairs: Flag,
    #[serde(rename = "HealthWelfare")]
    pub health_welfare: Flag,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AttorneyDetailsPage {
    #[serde(rename = "Section2")]
    pub section2: AttorneyDetailsSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AttorneyDetailsSection {
    #[serde(rename = "Attorney")]
    pub attorney: Vec<AttorneyDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AttorneyDetails {
    #[serde(rename = "FirstName")]
    pub first_name: String,
    #[serde(rename = "LastName")]
    pub last_name: String,
    #[serde(rename = "DOB")]
    pub dob: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AttorneySignaturePage {
    #[serde(rename = "Section5")]
    pub section5: AttorneySignatureSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AttorneySignatureSection {
    #[serde(rename = "Attorney")]
    pub attorney: Vec<AttorneySignature>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AttorneySignature {
    #[serde(rename = "Signature")]
    pub signature: Flag,
    #[serde(rename = "Date")]
    pub date: String,
}

impl Lp2 {
    /// Blank dates are skipped; only dates that are written and unreadable are reported.
    pub fn validate(&self, now: DateTime<Utc>) -> Vec<String> {
        let mut check = FormCheck::new(now);

        let section1 = &self.page1.section1;
        match (
            section1.property_financial_affairs.is_set(),
            section1.health_welfare.is_set(),
        ) {
            (true, true) => check.add("Both LPA sub-types are selected"),
            (false, false) => check.add("Neither LPA sub-type is selected"),
            _ => {}
        }

        for attorney in &self.page5.section5.attorney {
            if !attorney.date.is_empty() && parse_date(&attorney.date).is_none() {
                check.add(format!(
                    "Failed to parse attorney signature date: {}",
                    DATE_FORMAT_ERROR
                ));
            }
        }

        for attorney in &self.page2.section2.attorney {
            if !attorney.dob.is_empty() && parse_date(&attorney.dob).is_none() {
                check.add(format!(
                    "Failed to parse attorney date of birth: {}",
                    DATE_FORMAT_ERROR
                ));
            }
        }

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

    #[test]
    fn test_exactly_one_sub_type() {
        let both: Lp2 = quick_xml::de::from_str(
            "<LP2><Page1><Section1><PropertyFinancialAffairs>true</PropertyFinancialAffairs><HealthWelfare>true</HealthWelfare></Section1></Page1></LP2>",
        )
        .unwrap();
        assert_eq!(both.validate(now()), vec!["Both LPA sub-types are selected"]);

        let neither: Lp2 = quick_xml::de::from_str("<LP2/>").unwrap();
        assert_eq!(neither.validate(now()), vec!["Neither LPA sub-type is selected"]);
    }

    #[test]
    fn test_attorney_dates() {
        let xml = r#"<LP2>
  <Page1><Section1><HealthWelfare>true</HealthWelfare></Section1></Page1>
  <Page2><Section2>
    <Attorney><FirstName>A</FirstName><DOB>01/01/1960</DOB></Attorney>
    <Attorney><FirstName>B</FirstName><DOB>sometime</DOB></Attorney>
  </Section2></Page2>
  <Page5><Section5>
    <Attorney><Signature>true</Signature><Date>31/13/2024</Date></Attorney>
    <Attorney><Signature>true</Signature><Date></Date></Attorney>
  </Section5></Page5>
</LP2>"#;
        let lp2: Lp2 = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(
            lp2.validate(now()),
            vec![
                format!("Failed to parse attorney signature date: {}", DATE_FORMAT_ERROR),
                format!("Failed to parse attorney date of birth: {}", DATE_FORMAT_ERROR),
            ]
        );
    }
}
