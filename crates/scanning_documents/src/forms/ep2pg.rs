//! EP2PG: application to register an enduring power of attorney.

use super::common::FormCheck;
use crate::date::parse_compact_date;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Ep2pg {
    #[serde(rename = "Page1")]
    pub page1: DonorPage,
    #[serde(rename = "Page4")]
    pub page4: AttorneyPage,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DonorPage {
    #[serde(rename = "Part1")]
    pub part1: Person,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AttorneyPage {
    #[serde(rename = "Part4")]
    pub part4: Person,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Person {
    #[serde(rename = "FirstName")]
    pub first_name: String,
    #[serde(rename = "LastName")]
    pub last_name: String,
    /// `ddmmyyyy`
    #[serde(rename = "DOB")]
    pub dob: String,
}

impl Ep2pg {
    pub fn validate(&self, now: DateTime<Utc>) -> Vec<String> {
        let mut check = FormCheck::new(now);
        for (role, person) in [("Donor", &self.page1.part1), ("Attorney", &self.page4.part4)] {
            if !person.dob.is_empty() && parse_compact_date(&person.dob).is_none() {
                check.add(format!(
                    "Failed to parse date of birth for {}: '{}' is not ddmmyyyy",
                    role, person.dob
                ));
            }
        }
        check.finish()
    }
}
