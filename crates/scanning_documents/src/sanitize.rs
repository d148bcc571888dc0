//! Text clean-up applied before typed binding.
//!
//! Every text node is trimmed, so whitespace-only content binds as an empty
//! string. Comments are dropped. Markup is written back unchanged.

use crate::error::SanitizeError;
use quick_xml::events::{BytesCData, BytesText, Event};
use quick_xml::{Reader, Writer};

pub fn sanitize_xml(xml: &str) -> Result<String, SanitizeError> {
    if xml.trim().is_empty() {
        return Err(SanitizeError("empty XML data provided".to_string()));
    }

    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));

    loop {
        let event = reader.read_event().map_err(|e| SanitizeError(e.to_string()))?;
        match event {
            Event::Eof => break,
            Event::Comment(_) => {}
            Event::Text(text) => {
                let unescaped = text.unescape().map_err(|e| SanitizeError(e.to_string()))?;
                let trimmed = unescaped.trim();
                if !trimmed.is_empty() {
                    write(&mut writer, Event::Text(BytesText::new(trimmed)))?;
                }
            }
            Event::CData(cdata) => {
                let raw = cdata.into_inner();
                let content = std::str::from_utf8(&raw).map_err(|e| SanitizeError(e.to_string()))?;
                let trimmed = content.trim();
                if !trimmed.is_empty() {
                    write(&mut writer, Event::CData(BytesCData::new(trimmed)))?;
                }
            }
            other => write(&mut writer, other)?,
        }
    }

    String::from_utf8(writer.into_inner()).map_err(|e| SanitizeError(e.to_string()))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), SanitizeError> {
    writer
        .write_event(event)
        .map_err(|e| SanitizeError(e.to_string()))
}

/// Local name of the document element, if the text has one.
pub fn root_name(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned())
            }
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => {}
        }
    }
}
