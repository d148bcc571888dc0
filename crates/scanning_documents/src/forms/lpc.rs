//! LPC: continuation sheet.

use super::common::{FormCheck, Signed, Witness};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Lpc {
    #[serde(rename = "Page10")]
    pub page10: WitnessPage,
    #[serde(rename = "Page11")]
    pub page11: SignaturePage,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WitnessPage {
    #[serde(rename = "Section9")]
    pub section9: WitnessSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WitnessSection {
    #[serde(rename = "Witness")]
    pub witness: Witness,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignaturePage {
    #[serde(rename = "Section10")]
    pub section10: Signed,
}

impl Lpc {
    pub fn validate(&self, now: DateTime<Utc>) -> Vec<String> {
        let mut check = FormCheck::new(now);
        check.witness("Page10", "Section9", &self.page10.section9.witness);
        check.signature_date(
            "Page11",
            "Section10",
            None,
            "Certificate Provider",
            &self.page11.section10,
        );
        check.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_unsigned_continuation_sheet() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let xml = r#"<LPC>
  <Page10><Section9><Witness><Signature>true</Signature><FullName>W</FullName>
    <Address><Address1>1 Road</Address1></Address></Witness></Section9></Page10>
  <Page11><Section10><Signature>false</Signature></Section10></Page11>
</LPC>"#;
        let lpc: Lpc = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(
            lpc.validate(now),
            vec![
                "Page10 Section9 Witness Address not valid.",
                "Page11 Section10 signature not set or invalid",
            ]
        );
    }
}
