//! Correspondence and SupCorrespondence share one layout.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Correspondence {
    /// Forwarded to the case service as the document sub type.
    #[serde(rename = "SubType")]
    pub sub_type: String,
    #[serde(rename = "CaseNumber")]
    pub case_number: Vec<String>,
}
