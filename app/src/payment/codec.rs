// ticketing_app/src/payment/codec.rs

//! Flat XML used by the payment provider: a single `<xml>` root whose children
//! are `<key>value</key>` leaves.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::BTreeMap;
use thiserror::Error;

pub const ROOT: &str = "xml";

#[derive(Debug, Error)]
pub enum CodecError {
  #[error("Malformed provider XML: {0}")]
  Xml(String),

  #[error("Provider XML is not flat: element '{0}' is nested")]
  Nested(String),

  #[error("Provider XML has no <{ROOT}> root")]
  MissingRoot,
}

fn xml_err<E: std::fmt::Display>(e: E) -> CodecError {
  CodecError::Xml(e.to_string())
}

pub fn encode(params: &BTreeMap<String, String>) -> Result<String, CodecError> {
  let mut writer = Writer::new(Vec::new());

  writer.write_event(Event::Start(BytesStart::new(ROOT))).map_err(xml_err)?;
  for (key, value) in params {
    writer.write_event(Event::Start(BytesStart::new(key.as_str()))).map_err(xml_err)?;
    writer.write_event(Event::Text(BytesText::new(value))).map_err(xml_err)?;
    writer.write_event(Event::End(BytesEnd::new(key.as_str()))).map_err(xml_err)?;
  }
  writer.write_event(Event::End(BytesEnd::new(ROOT))).map_err(xml_err)?;

  String::from_utf8(writer.into_inner()).map_err(xml_err)
}

/// Decodes a flat document. Text and CDATA leaves are both accepted; an empty
/// leaf (`<k/>` or `<k></k>`) decodes to an empty string.
pub fn decode(xml: &str) -> Result<BTreeMap<String, String>, CodecError> {
  let mut reader = Reader::from_str(xml);
  reader.config_mut().trim_text(true);

  let mut fields = BTreeMap::new();
  let mut seen_root = false;
  let mut current: Option<(String, String)> = None;

  loop {
    match reader.read_event().map_err(xml_err)? {
      Event::Start(e) => {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        if !seen_root {
          if name != ROOT {
            return Err(CodecError::MissingRoot);
          }
          seen_root = true;
        } else if current.is_some() {
          return Err(CodecError::Nested(name));
        } else {
          current = Some((name, String::new()));
        }
      }
      Event::Empty(e) => {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        if !seen_root {
          return Err(CodecError::MissingRoot);
        }
        if current.is_some() {
          return Err(CodecError::Nested(name));
        }
        fields.insert(name, String::new());
      }
      Event::Text(t) => {
        if let Some((_, value)) = current.as_mut() {
          let text = t.unescape().map_err(xml_err)?;
          value.push_str(&text);
        }
      }
      Event::CData(c) => {
        if let Some((_, value)) = current.as_mut() {
          value.push_str(&String::from_utf8_lossy(&c.into_inner()));
        }
      }
      Event::End(_) => {
        if let Some((key, value)) = current.take() {
          fields.insert(key, value);
        }
      }
      Event::Eof => break,
      _ => {}
    }
  }

  if !seen_root {
    return Err(CodecError::MissingRoot);
  }
  Ok(fields)
}
