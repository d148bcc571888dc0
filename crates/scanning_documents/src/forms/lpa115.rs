//! LPA115: application for a refund of fees.

use super::common::FormCheck;
use crate::date::parse_date;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Lpa115 {
    #[serde(rename = "Page3")]
    pub page3: Vec<OptionsPage>,
    #[serde(rename = "Page6")]
    pub page6: Vec<DeclarationPage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OptionsPage {
    #[serde(rename = "PartA")]
    pub part_a: PartA,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PartA {
    #[serde(rename = "OptionA")]
    pub option_a: Dated,
    #[serde(rename = "OptionB")]
    pub option_b: Dated,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeclarationPage {
    #[serde(rename = "PartB")]
    pub part_b: Dated,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Dated {
    #[serde(rename = "Date")]
    pub date: String,
}

fn check_date(check: &mut FormCheck, label: &str, value: &str) {
    if !value.is_empty() && parse_date(value).is_none() {
        check.add(format!("Failed to parse {} date: '{}'", label, value));
    }
}

impl Lpa115 {
    pub fn validate(&self, now: DateTime<Utc>) -> Vec<String> {
        let mut check = FormCheck::new(now);
        for page in &self.page3 {
            check_date(&mut check, "Page 3 Option A", &page.part_a.option_a.date);
            check_date(&mut check, "Page 3 Option B", &page.part_a.option_b.date);
        }
        for page in &self.page6 {
            check_date(&mut check, "Page 6 Part B", &page.part_b.date);
        }
        check.finish()
    }
}
