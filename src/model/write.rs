//! Serialise the object model back to XML

use crate::error::{Error, Result};
use crate::model::types::{Child, Content, Element};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;
use std::path::Path;

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name());
    for (key, value) in element.attributes() {
        let value = value.to_string();
        start.push_attribute((key.as_str(), value.as_str()));
    }

    match element.content() {
        Content::Empty => {
            writer.write_event(Event::Empty(start))?;
        }
        Content::Simple(value) => {
            writer.write_event(Event::Start(start))?;
            writer.write_event(Event::Text(BytesText::new(&value.to_string())))?;
            writer.write_event(Event::End(BytesEnd::new(element.name())))?;
        }
        Content::Complex(children) => {
            writer.write_event(Event::Start(start))?;
            for child in children {
                match child {
                    Child::Single(e) => write_element(writer, e)?,
                    Child::Plural(p) => {
                        for item in p {
                            write_element(writer, item)?;
                        }
                    }
                }
            }
            writer.write_event(Event::End(BytesEnd::new(element.name())))?;
        }
    }
    Ok(())
}

fn into_string(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| Error::Malformed(e.to_string()))
}

/// Compact XML without a declaration, as sent inside SOAP requests
pub fn to_xml(element: &Element) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    write_element(&mut writer, element)?;
    into_string(writer.into_inner())
}

/// Indented XML document with declaration
pub fn to_pretty_xml(element: &Element) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_element(&mut writer, element)?;
    into_string(writer.into_inner())
}

/// Write `element` as an indented XML file
pub fn pretty_save<P: AsRef<Path>>(element: &Element, path: P) -> Result<()> {
    let xml = to_pretty_xml(element)?;
    std::fs::write(path, xml)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{parse_document, Scalar};
    use crate::schema::SchemaVariant;

    #[test]
    fn test_to_xml_escapes_and_repeats_plurals() {
        let log = Element::new("log")
            .with_attribute("uid", "L<1>")
            .with_text("name", "GR & RES")
            .with_plural("logCurveInfo", vec![
                Element::new("logCurveInfo").with_text("mnemonic", "DEPT"),
                Element::new("logCurveInfo").with_text("mnemonic", "GR"),
            ])
            .with_child(Element::new("description"));

        let xml = to_xml(&log).unwrap();
        assert_eq!(
            xml,
            "<log uid=\"L&lt;1&gt;\"><name>GR &amp; RES</name>\
             <logCurveInfo><mnemonic>DEPT</mnemonic></logCurveInfo>\
             <logCurveInfo><mnemonic>GR</mnemonic></logCurveInfo>\
             <description/></log>"
        );
    }

    #[test]
    fn test_pretty_xml_reads_back() {
        let well = Element::new("wells")
            .with_attribute("version", "1.4.1.1")
            .with_child(Element::new("well").with_attribute("uid", "W-1").with_text("name", "Snorre"));

        let xml = to_pretty_xml(&well).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));

        let parsed = parse_document(&xml, SchemaVariant::V1411Read).unwrap();
        assert_eq!(parsed.plural("well").unwrap().items()[0].text("name").as_deref(), Some("Snorre"));
    }

    #[test]
    fn test_pretty_save() {
        let path = std::env::temp_dir().join(format!("witsml-melt-{}.xml", std::process::id()));
        pretty_save(&Element::new("wells"), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<wells/>"));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_date_text_is_written_as_read() {
        let xml = r#"<well><name>2019-03-01T12:00:00Z</name><dTimSpud>2019-03-01T12:00:00Z</dTimSpud><dTimPa>2019-03-01T13:30:00+01:00</dTimPa></well>"#;
        let well = parse_document(xml, SchemaVariant::V1411Read).unwrap();
        assert_eq!(well.scalar_at("name").unwrap(), &Scalar::from("2019-03-01T12:00:00Z"));
        assert_eq!(to_xml(&well).unwrap(), xml);
    }
}
