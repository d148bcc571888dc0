//! The `Set` envelope posted to `/api/ddc`.
//!
//! ```xml
//! <Set xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
//!      xsi:noNamespaceSchemaLocation="SET.xsd">
//!   <Header CaseNo="" Scanner="9" ScanTime="2014-09-26 12:38:53"
//!           ScannerOperator="Administrator" Schedule="02-0001112-20160909185000"/>
//!   <Body>
//!     <Document Type="LP1F" Encoding="UTF-8" NoPages="19" ID="doc-A">
//!       <XML>...base64...</XML>
//!       <PDF>...base64...</PDF>
//!     </Document>
//!   </Body>
//! </Set>
//! ```

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

#[derive(Debug, Error)]
pub enum EnvelopeXmlError {
    #[error("failed to bind set XML: {0}")]
    Deserialize(#[from] quick_xml::DeError),

    #[error("failed to write set XML: {0}")]
    Write(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Set {
    #[serde(rename = "Header", default)]
    pub header: Option<Header>,
    #[serde(rename = "Body", default)]
    pub body: Body,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    #[serde(rename = "@CaseNo", default)]
    pub case_no: String,
    #[serde(rename = "@Scanner", default)]
    pub scanner: String,
    #[serde(rename = "@ScanTime", default)]
    pub scan_time: String,
    #[serde(rename = "@ScannerOperator", default)]
    pub scanner_operator: String,
    #[serde(rename = "@Schedule", default)]
    pub schedule: String,
    #[serde(rename = "@FeeNumber", default)]
    pub fee_number: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body {
    #[serde(rename = "Document", default)]
    pub documents: Vec<Document>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "@Type", default)]
    pub doc_type: String,
    #[serde(rename = "@Encoding", default)]
    pub encoding: String,
    #[serde(rename = "@NoPages", default)]
    pub no_pages: u32,
    /// Application supplied identifier. Only identified documents are tracked.
    #[serde(rename = "@ID", default)]
    pub id: String,
    /// Base64 encoded typed document XML.
    #[serde(rename = "XML", default)]
    pub embedded_xml: String,
    /// Base64 encoded scan of the paper form.
    #[serde(rename = "PDF", default)]
    pub embedded_pdf: String,
}

impl Set {
    /// Bind envelope XML into a typed set. Unknown attributes such as the
    /// `xsi` declarations are ignored.
    pub fn from_xml(xml: &str) -> Result<Self, EnvelopeXmlError> {
        Ok(quick_xml::de::from_str(xml)?)
    }

    /// Case number from the header, empty when there is no header.
    pub fn case_no(&self) -> &str {
        self.header.as_ref().map(|h| h.case_no.as_str()).unwrap_or("")
    }

    pub fn scan_time(&self) -> &str {
        self.header.as_ref().map(|h| h.scan_time.as_str()).unwrap_or("")
    }

    pub fn schedule(&self) -> &str {
        self.header.as_ref().map(|h| h.schedule.as_str()).unwrap_or("")
    }

    pub fn documents(&self) -> &[Document] {
        &self.body.documents
    }

    /// Serialise the set back into envelope XML referencing `schema_location`.
    pub fn to_xml(&self, schema_location: &str) -> Result<String, EnvelopeXmlError> {
        let mut writer = Writer::new(Vec::new());
        write(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        )?;

        let mut root = BytesStart::new("Set");
        root.push_attribute(("xmlns:xsi", XSI_NAMESPACE));
        root.push_attribute(("xsi:noNamespaceSchemaLocation", schema_location));
        write(&mut writer, Event::Start(root))?;

        if let Some(header) = &self.header {
            let mut el = BytesStart::new("Header");
            el.push_attribute(("CaseNo", header.case_no.as_str()));
            el.push_attribute(("Scanner", header.scanner.as_str()));
            el.push_attribute(("ScanTime", header.scan_time.as_str()));
            el.push_attribute(("ScannerOperator", header.scanner_operator.as_str()));
            el.push_attribute(("Schedule", header.schedule.as_str()));
            if !header.fee_number.is_empty() {
                el.push_attribute(("FeeNumber", header.fee_number.as_str()));
            }
            write(&mut writer, Event::Empty(el))?;
        }

        write(&mut writer, Event::Start(BytesStart::new("Body")))?;
        for doc in &self.body.documents {
            let no_pages = doc.no_pages.to_string();
            let mut el = BytesStart::new("Document");
            el.push_attribute(("Type", doc.doc_type.as_str()));
            el.push_attribute(("Encoding", doc.encoding.as_str()));
            el.push_attribute(("NoPages", no_pages.as_str()));
            if !doc.id.is_empty() {
                el.push_attribute(("ID", doc.id.as_str()));
            }
            write(&mut writer, Event::Start(el))?;
            write_text_element(&mut writer, "XML", &doc.embedded_xml)?;
            write_text_element(&mut writer, "PDF", &doc.embedded_pdf)?;
            write(&mut writer, Event::End(BytesEnd::new("Document")))?;
        }
        write(&mut writer, Event::End(BytesEnd::new("Body")))?;
        write(&mut writer, Event::End(BytesEnd::new("Set")))?;

        String::from_utf8(writer.into_inner()).map_err(|e| EnvelopeXmlError::Write(e.to_string()))
    }
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), EnvelopeXmlError> {
    writer
        .write_event(event)
        .map_err(|e| EnvelopeXmlError::Write(e.to_string()))
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    text: &str,
) -> Result<(), EnvelopeXmlError> {
    write(writer, Event::Start(BytesStart::new(name)))?;
    write(writer, Event::Text(BytesText::new(text)))?;
    write(writer, Event::End(BytesEnd::new(name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Set xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:noNamespaceSchemaLocation="SET.xsd">
  <Header CaseNo="7000-1234-1234" Scanner="9" ScanTime="2014-09-26 12:38:53" ScannerOperator="Administrator" Schedule="02-0001112-20160909185000"/>
  <Body>
    <Document Type="Correspondence" Encoding="UTF-8" NoPages="1" ID="doc-B">
      <XML>PENvcnJlc3BvbmRlbmNlLz4=</XML>
      <PDF>JVBERi0=</PDF>
    </Document>
  </Body>
</Set>"#;

    #[test]
    fn test_from_xml_binds_header_and_documents() {
        let set = Set::from_xml(SAMPLE).unwrap();
        let header = set.header.as_ref().unwrap();
        assert_eq!(header.case_no, "7000-1234-1234");
        assert_eq!(header.schedule, "02-0001112-20160909185000");
        assert_eq!(header.fee_number, "");

        assert_eq!(set.documents().len(), 1);
        let doc = &set.documents()[0];
        assert_eq!(doc.doc_type, "Correspondence");
        assert_eq!(doc.no_pages, 1);
        assert_eq!(doc.id, "doc-B");
        assert_eq!(doc.embedded_xml, "PENvcnJlc3BvbmRlbmNlLz4=");
        assert_eq!(doc.embedded_pdf, "JVBERi0=");
    }

    #[test]
    fn test_missing_header_binds_to_none() {
        let set = Set::from_xml("<Set><Body></Body></Set>").unwrap();
        assert!(set.header.is_none());
        assert_eq!(set.case_no(), "");
        assert!(set.documents().is_empty());
    }

    #[test]
    fn test_to_xml_parses_back_to_same_set() {
        let set = Set::from_xml(SAMPLE).unwrap();
        let xml = set.to_xml("SET.xsd").unwrap();
        assert!(xml.contains(r#"xsi:noNamespaceSchemaLocation="SET.xsd""#));
        assert_eq!(Set::from_xml(&xml).unwrap(), set);
    }

    #[test]
    fn test_non_numeric_page_count_is_rejected() {
        let xml = r#"<Set><Header Schedule="s"/><Body><Document Type="LP1F" NoPages="many"/></Body></Set>"#;
        assert!(Set::from_xml(xml).is_err());
    }
}
