//! LPA116: application to change attorney details.

use super::common::{Address, FormCheck, Signed};
use crate::date::parse_date;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Lpa116 {
    #[serde(rename = "Page1")]
    pub page1: Page1,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Page1 {
    #[serde(rename = "PartC")]
    pub part_c: PartC,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PartC {
    #[serde(rename = "FullName")]
    pub full_name: String,
    #[serde(rename = "Address")]
    pub address: Address,
    #[serde(rename = "CaseReference")]
    pub case_reference: String,
    #[serde(rename = "Declaration")]
    pub declaration: Signed,
}

impl Lpa116 {
    pub fn validate(&self, now: DateTime<Utc>) -> Vec<String> {
        let mut check = FormCheck::new(now);
        let date = &self.page1.part_c.declaration.date;
        if !date.is_empty() && parse_date(date).is_none() {
            check.add(format!("Failed to parse Page 1 Part C declaration date: '{}'", date));
        }
        check.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_declaration_date() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let ok: Lpa116 = quick_xml::de::from_str(
            "<LPA116><Page1><PartC><FullName>A B</FullName><Declaration><Signature>true</Signature><Date>01/03/2024</Date></Declaration></PartC></Page1></LPA116>",
        )
        .unwrap();
        assert_eq!(ok.page1.part_c.full_name, "A B");
        assert!(ok.validate(now).is_empty());

        let bad: Lpa116 = quick_xml::de::from_str(
            "<LPA116><Page1><PartC><Declaration><Date>March</Date></Declaration></PartC></Page1></LPA116>",
        )
        .unwrap();
        assert_eq!(
            bad.validate(now),
            vec!["Failed to parse Page 1 Part C declaration date: 'March'"]
        );
    }
}
