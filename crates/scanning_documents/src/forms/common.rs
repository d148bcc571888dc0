//! Building blocks shared by the form bindings and their checks.

use crate::date::parse_date;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Error text for a date that matches none of the accepted layouts.
pub const DATE_FORMAT_ERROR: &str = "input was not in an expected date format";

/// Tick box. `true`/`1` is ticked; anything else, including empty, is not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flag(pub bool);

impl Flag {
    pub fn is_set(self) -> bool {
        self.0
    }
}

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Flag(matches!(raw.trim(), "true" | "1")))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Address {
    #[serde(rename = "Address1")]
    pub address1: String,
    #[serde(rename = "Address2")]
    pub address2: String,
    #[serde(rename = "Address3")]
    pub address3: String,
    #[serde(rename = "Postcode")]
    pub postcode: String,
}

/// A signature box with the date written next to it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Signed {
    #[serde(rename = "Signature")]
    pub signature: Flag,
    #[serde(rename = "Date")]
    pub date: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Witness {
    #[serde(rename = "Signature")]
    pub signature: Flag,
    #[serde(rename = "FullName")]
    pub full_name: String,
    #[serde(rename = "Address")]
    pub address: Address,
}

/// Accumulates findings for one document. Never fails: callers only log
/// what it returns.
pub struct FormCheck {
    now: DateTime<Utc>,
    messages: Vec<String>,
    /// Valid signature dates seen so far, compared against applicant dates.
    dates: Vec<DateTime<Utc>>,
}

impl FormCheck {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            messages: Vec::new(),
            dates: Vec::new(),
        }
    }

    pub fn add(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn record_date(&mut self, date: DateTime<Utc>) {
        self.dates.push(date);
    }

    pub fn witness(&mut self, page: &str, section: &str, witness: &Witness) {
        if !witness.signature.is_set() {
            self.add(format!("{} {} Witness Signature not set.", page, section));
        }
        if witness.full_name.is_empty() {
            self.add(format!("{} {} Witness Full Name not set.", page, section));
        }
        if witness.address.address1.is_empty() || witness.address.postcode.is_empty() {
            self.add(format!("{} {} Witness Address not valid.", page, section));
        }
    }

    /// Signature must be ticked and dated with a past date. A valid date is kept
    /// for the applicant ordering check.
    pub fn signature_date(
        &mut self,
        page: &str,
        section: &str,
        field: Option<&str>,
        label: &str,
        signed: &Signed,
    ) {
        let path = match field {
            Some(field) => format!("{} {} {}", page, section, field),
            None => format!("{} {}", page, section),
        };
        if !signed.signature.is_set() {
            self.add(format!("{} signature not set or invalid", path));
            return;
        }
        if signed.date.is_empty() {
            self.add(format!("missing {} date", path));
            return;
        }
        match parse_date(&signed.date) {
            None => self.add(format!("invalid {} date format: {}", label, DATE_FORMAT_ERROR)),
            Some(date) if date > self.now => {
                self.add(format!("{} date cannot be in the future", label))
            }
            Some(date) => self.record_date(date),
        }
    }

    /// Applicants who signed must have dated it, and every other signature on
    /// the form must come no later than the earliest applicant date.
    pub fn applicants(&mut self, applicants: &[Signed]) {
        let mut applicant_dates = Vec::new();
        for applicant in applicants.iter().filter(|a| a.signature.is_set()) {
            match parse_date(&applicant.date) {
                Some(date) => applicant_dates.push(date),
                None => self.add("applicant date is invalid"),
            }
        }

        match applicant_dates.iter().min() {
            None => self.add("no valid applicant signature/dates found"),
            Some(earliest) => {
                if self.dates.iter().any(|d| d > earliest) {
                    self.add("all form dates must be before the earliest applicant signature date");
                }
            }
        }
    }

    pub fn finish(self) -> Vec<String> {
        self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn signed(date: &str) -> Signed {
        Signed {
            signature: Flag(true),
            date: date.to_string(),
        }
    }

    #[test]
    fn test_witness_messages() {
        let mut check = FormCheck::new(now());
        check.witness("Page10", "Section9", &Witness::default());
        assert_eq!(
            check.finish(),
            vec![
                "Page10 Section9 Witness Signature not set.",
                "Page10 Section9 Witness Full Name not set.",
                "Page10 Section9 Witness Address not valid.",
            ]
        );
    }

    #[test]
    fn test_signature_date_messages() {
        let mut check = FormCheck::new(now());
        check.signature_date("Page11", "Section10", None, "Certificate Provider", &Signed::default());
        check.signature_date("Page12[0]", "Section11", Some("Attorney"), "Attorney", &signed(""));
        check.signature_date("Page10", "Section9", Some("Donor"), "Donor", &signed("soon"));
        check.signature_date("Page10", "Section9", Some("Donor"), "Donor", &signed("01/01/2030"));
        assert_eq!(
            check.finish(),
            vec![
                "Page11 Section10 signature not set or invalid".to_string(),
                "missing Page12[0] Section11 Attorney date".to_string(),
                format!("invalid Donor date format: {}", DATE_FORMAT_ERROR),
                "Donor date cannot be in the future".to_string(),
            ]
        );
    }

    #[test]
    fn test_applicant_ordering() {
        let mut check = FormCheck::new(now());
        check.signature_date("Page10", "Section9", Some("Donor"), "Donor", &signed("10/01/2024"));
        check.applicants(&[signed("05/01/2024"), Signed::default()]);
        assert_eq!(
            check.finish(),
            vec!["all form dates must be before the earliest applicant signature date"]
        );
    }

    #[test]
    fn test_no_applicants() {
        let mut check = FormCheck::new(now());
        check.applicants(&[Signed::default()]);
        assert_eq!(check.finish(), vec!["no valid applicant signature/dates found"]);
    }

    #[test]
    fn test_flag_lexical_values() {
        #[derive(Deserialize)]
        struct Ticks {
            #[serde(rename = "A")]
            a: Flag,
            #[serde(rename = "B")]
            b: Flag,
            #[serde(rename = "C", default)]
            c: Flag,
        }
        let parsed: Ticks = quick_xml::de::from_str("<X><A>true</A><B></B></X>").unwrap();
        assert!(parsed.a.is_set());
        assert!(!parsed.b.is_set());
        assert!(!parsed.c.is_set());
    }
}
