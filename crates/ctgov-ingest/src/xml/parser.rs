//! Event-driven construction of an [`Element`] tree with `quick-xml`.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

use super::Element;

/// A well-formedness or decoding failure, with the byte offset where it was
/// detected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (at byte {position})")]
pub struct XmlError {
    message: String,
    position: u64,
}

impl XmlError {
    pub fn new(message: impl Into<String>, position: u64) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn position(&self) -> u64 {
        self.position
    }
}

/// Parse a complete document and return its root element.
///
/// Comments, processing instructions, and the XML declaration are skipped.
/// The document must contain exactly one root element and no non-whitespace
/// text outside of it. Line endings are normalized to `\n` before parsing.
pub fn parse_document(xml: &str) -> Result<Element, XmlError> {
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    let xml = normalize_line_endings(xml);
    let mut reader = Reader::from_str(&xml);
    let mut builder = TreeBuilder::default();

    loop {
        let position = reader.buffer_position();
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                let element = open_element(&reader, &start, position)?;
                builder.open(element, position)?;
            }
            Ok(Event::Empty(start)) => {
                let element = open_element(&reader, &start, position)?;
                builder.open(element, position)?;
                builder.close(None, position)?;
            }
            Ok(Event::End(end)) => {
                let name = decode(&reader, end.name().as_ref(), position)?;
                builder.close(Some(&name), position)?;
            }
            Ok(Event::Text(text)) => {
                let text = decode(&reader, &text, position)?;
                builder.push_text(&text, position)?;
            }
            Ok(Event::CData(cdata)) => {
                let text = decode(&reader, &cdata, position)?;
                builder.push_text(&text, position)?;
            }
            Ok(Event::GeneralRef(reference)) => {
                let name = decode(&reader, &reference, position)?;
                let resolved =
                    resolve_reference(&name).map_err(|message| XmlError::new(message, position))?;
                builder.push_text(&resolved, position)?;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(error) => {
                return Err(XmlError::new(error.to_string(), reader.error_position()));
            }
        }
    }

    builder.finish(reader.buffer_position())
}

#[derive(Default)]
struct TreeBuilder {
    stack: Vec<Element>,
    root: Option<Element>,
}

impl TreeBuilder {
    fn open(&mut self, element: Element, position: u64) -> Result<(), XmlError> {
        if self.stack.is_empty() && self.root.is_some() {
            return Err(XmlError::new(
                format!("junk after document element: <{}>", element.name),
                position,
            ));
        }
        self.stack.push(element);
        Ok(())
    }

    /// Pop the innermost open element. `name` is `None` for self-closing tags.
    fn close(&mut self, name: Option<&str>, position: u64) -> Result<(), XmlError> {
        let Some(element) = self.stack.pop() else {
            return Err(XmlError::new(
                format!("unmatched closing tag </{}>", name.unwrap_or_default()),
                position,
            ));
        };
        if let Some(name) = name
            && name != element.name
        {
            return Err(XmlError::new(
                format!("mismatched tag: expected </{}>, found </{name}>", element.name),
                position,
            ));
        }
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None => self.root = Some(element),
        }
        Ok(())
    }

    fn push_text(&mut self, text: &str, position: u64) -> Result<(), XmlError> {
        match self.stack.last_mut() {
            Some(current) => {
                if current.children.is_empty() {
                    current.text.push_str(text);
                }
                Ok(())
            }
            None if text.trim().is_empty() => Ok(()),
            None => Err(XmlError::new("text outside of the root element", position)),
        }
    }

    fn finish(self, position: u64) -> Result<Element, XmlError> {
        if let Some(open) = self.stack.last() {
            return Err(XmlError::new(
                format!("unclosed element <{}>", open.name),
                position,
            ));
        }
        self.root
            .ok_or_else(|| XmlError::new("no element found", position))
    }
}

fn open_element(
    reader: &Reader<&[u8]>,
    start: &BytesStart<'_>,
    position: u64,
) -> Result<Element, XmlError> {
    let name = decode(reader, start.name().as_ref(), position)?;
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|error| XmlError::new(error.to_string(), position))?;
        let key = decode(reader, attribute.key.as_ref(), position)?;
        let raw = decode(reader, &attribute.value, position)?;
        let raw = normalize_attribute_whitespace(&raw);
        let value = unescape(&raw).map_err(|error| XmlError::new(error.to_string(), position))?;
        attributes.push((key, value.into_owned()));
    }
    Ok(Element::new(name, attributes))
}

fn decode(reader: &Reader<&[u8]>, bytes: &[u8], position: u64) -> Result<String, XmlError> {
    reader
        .decoder()
        .decode(bytes)
        .map(Cow::into_owned)
        .map_err(|error| XmlError::new(error.to_string(), position))
}

/// Rewrite `\r\n` and lone `\r` as `\n`.
fn normalize_line_endings(xml: &str) -> Cow<'_, str> {
    if xml.contains('\r') {
        Cow::Owned(xml.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(xml)
    }
}

/// Literal tabs and newlines in attribute values read as spaces. Character
/// references are expanded afterwards and keep their value.
fn normalize_attribute_whitespace(raw: &str) -> Cow<'_, str> {
    if raw.contains(['\t', '\n', '\r']) {
        Cow::Owned(raw.replace(['\t', '\n', '\r'], " "))
    } else {
        Cow::Borrowed(raw)
    }
}

/// Resolve `&name;` to its replacement text. Supports the five predefined
/// entities and decimal/hex character references to legal XML characters.
fn resolve_reference(name: &str) -> Result<String, String> {
    if let Some(code) = name.strip_prefix('#') {
        let value = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => code.parse(),
        }
        .map_err(|_| format!("malformed character reference &{name};"))?;
        return char::from_u32(value)
            .filter(|&ch| is_xml_char(ch))
            .map(String::from)
            .ok_or_else(|| format!("reference to invalid character number &{name};"));
    }
    resolve_predefined_entity(name)
        .map(str::to_string)
        .ok_or_else(|| format!("undefined entity &{name};"))
}

/// The `Char` production of XML 1.0.
fn is_xml_char(ch: char) -> bool {
    matches!(
        ch,
        '\u{9}'
            | '\u{A}'
            | '\u{D}'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements_and_attributes() {
        let root = parse_document(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- generated -->
<clinical_study rank="1">
  <start_date type="Actual">March 2004</start_date>
  <id_info><nct_id>NCT00000102</nct_id></id_info>
  <keyword/>
</clinical_study>"#,
        )
        .expect("parse");

        assert_eq!(root.name(), "clinical_study");
        assert_eq!(root.attribute("rank"), Some("1"));
        assert_eq!(root.children().len(), 3);
        let start = root.find("start_date").expect("start_date");
        assert_eq!(start.text(), "March 2004");
        assert_eq!(start.attribute("type"), Some("Actual"));
        assert_eq!(root.find_text("id_info/nct_id"), Some("NCT00000102"));
        assert_eq!(root.find_text("keyword"), Some(""));
    }

    #[test]
    fn resolves_entities_and_cdata() {
        let root = parse_document(
            "<s><t>A &amp; B &#8805; &#x3b1;</t><c><![CDATA[<raw>]]></c></s>",
        )
        .expect("parse");
        assert_eq!(root.find_text("t"), Some("A & B \u{2265} \u{3b1}"));
        assert_eq!(root.find_text("c"), Some("<raw>"));
    }

    #[test]
    fn text_stops_at_first_child() {
        let root = parse_document("<s><a> lead <b>inner</b> tail </a></s>").expect("parse");
        assert_eq!(root.find_text("a"), Some(" lead "));
        assert_eq!(root.find_text("a/b"), Some("inner"));
    }

    #[test]
    fn line_endings_are_normalized() {
        let root = parse_document(
            "<clinical_study>\r\n<intervention>\r\n\
             <description>line one\r\nline two\rline three</description>\r\n\
             </intervention>\r\n</clinical_study>",
        )
        .expect("parse");
        assert_eq!(
            root.find_text("intervention/description"),
            Some("line one\nline two\nline three")
        );
    }

    #[test]
    fn character_reference_keeps_carriage_return() {
        let root = parse_document("<a>x&#13;\r\ny</a>").expect("parse");
        assert_eq!(root.text(), "x\r\ny");
    }

    #[test]
    fn attribute_whitespace_becomes_spaces() {
        let root = parse_document("<a type=\"Act\tual\r\nDate\" tab=\"x&#9;y\"/>").expect("parse");
        assert_eq!(root.attribute("type"), Some("Act ual Date"));
        assert_eq!(root.attribute("tab"), Some("x\ty"));
    }

    #[test]
    fn rejects_references_to_illegal_characters() {
        for xml in ["<a>&#0;</a>", "<a>&#1;</a>", "<a>&#xFFFE;</a>", "<a>&#xD800;</a>"] {
            assert!(parse_document(xml).is_err(), "{xml}");
        }
        assert_eq!(parse_document("<a>&#9;&#x1F600;</a>").unwrap().text(), "\t\u{1F600}");
    }

    #[test]
    fn character_references_outside_char_range_are_errors() {
        let error = resolve_reference("#0").expect_err("nul");
        assert!(error.contains("invalid character"), "{error}");
        assert!(resolve_reference("#x1").is_err());
        assert!(resolve_reference("#xZZ").is_err());
        assert_eq!(resolve_reference("#x41").as_deref(), Ok("A"));
        assert_eq!(resolve_reference("amp").as_deref(), Ok("&"));
    }

    #[test]
    fn rejects_mismatched_tags() {
        assert!(parse_document("<s><a></b></s>").is_err());
    }

    #[test]
    fn rejects_unclosed_root() {
        let error = parse_document("<s><a>text</a>").expect_err("unclosed");
        assert!(error.message().contains("<s>"), "{error}");
    }

    #[test]
    fn rejects_empty_and_non_xml_input() {
        assert!(parse_document("").is_err());
        assert!(parse_document("   \n").is_err());
        assert!(parse_document("not xml at all").is_err());
    }

    #[test]
    fn rejects_second_root() {
        assert!(parse_document("<a/><b/>").is_err());
    }

    #[test]
    fn rejects_undefined_entity() {
        let error = parse_document("<a>&nbsp;</a>").expect_err("undefined entity");
        assert!(error.message().contains("nbsp"), "{error}");
    }

    #[test]
    fn skips_byte_order_mark() {
        let root = parse_document("\u{feff}<a>x</a>").expect("parse");
        assert_eq!(root.text(), "x");
    }
}
