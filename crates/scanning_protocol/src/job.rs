//! Body of the FIFO message announcing a form ready for data extraction.
//!
//! The downstream consumer is a PHP worker, so `content` is a PHP
//! `serialize()`d flat array. The output must be byte exact.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Job class the consumer dispatches on.
pub const FORM_JOB_NAME: &str = "Ddc\\Job\\FormJob";

/// Scalar values allowed in a flat serialised array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhpValue {
    Str(String),
    Int(i64),
}

impl From<&str> for PhpValue {
    fn from(value: &str) -> Self {
        PhpValue::Str(value.to_string())
    }
}

impl From<i64> for PhpValue {
    fn from(value: i64) -> Self {
        PhpValue::Int(value)
    }
}

/// Serialise ordered key/value pairs as `a:N:{s:len:"key";s:len:"value";...}`.
///
/// Lengths are byte lengths, matching PHP.
pub fn php_serialize(entries: &[(&str, PhpValue)]) -> String {
    let mut out = String::new();
    let _ = write!(out, "a:{}:{{", entries.len());
    for (key, value) in entries {
        let _ = write!(out, "s:{}:\"{}\";", key.len(), key);
        match value {
            PhpValue::Str(s) => {
                let _ = write!(out, "s:{}:\"{}\";", s.len(), s);
            }
            PhpValue::Int(i) => {
                let _ = write!(out, "i:{};", i);
            }
        }
    }
    out.push('}');
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMetadata {
    #[serde(rename = "__name__")]
    pub name: String,
}

/// `{"content": "<serialised {uid, filename}>", "metadata": {"__name__": "..."}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMessage {
    pub content: String,
    pub metadata: JobMetadata,
}

impl JobMessage {
    pub fn form_job(uid: &str, filename: &str) -> Self {
        Self {
            content: php_serialize(&[("uid", uid.into()), ("filename", filename.into())]),
            metadata: JobMetadata {
                name: FORM_JOB_NAME.to_string(),
            },
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_php_serialize_strings_and_ints() {
        let out = php_serialize(&[("uid", "700012341234".into()), ("pages", 3i64.into())]);
        assert_eq!(out, r#"a:2:{s:3:"uid";s:12:"700012341234";s:5:"pages";i:3;}"#);
    }

    #[test]
    fn test_php_serialize_empty() {
        assert_eq!(php_serialize(&[]), "a:0:{}");
    }

    #[test]
    fn test_php_serialize_uses_byte_lengths() {
        let out = php_serialize(&[("name", "Zoë".into())]);
        assert_eq!(out, r#"a:1:{s:4:"name";s:4:"Zoë";}"#);
    }

    #[test]
    fn test_form_job_body() {
        let msg = JobMessage::form_job("700012341234", "FORM_DDC_abc_LP1F.xml");
        let json: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(
            json["content"],
            r#"a:2:{s:3:"uid";s:12:"700012341234";s:8:"filename";s:21:"FORM_DDC_abc_LP1F.xml";}"#
        );
        assert_eq!(json["metadata"]["__name__"], "Ddc\\Job\\FormJob");
    }
}
