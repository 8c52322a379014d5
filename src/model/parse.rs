//! Read XML documents into the typed object model

use crate::error::{Error, Result};
use crate::model::types::{Child, Content, Element, Plural, Scalar};
use crate::schema::SchemaVariant;
use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// An element whose end tag has not been seen yet
struct Open {
    name: String,
    attributes: IndexMap<String, Scalar>,
    children: Vec<Element>,
    text: String,
}

impl Open {
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = IndexMap::new();
        for attr in start.attributes() {
            let attr = attr?;
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.insert(key, Scalar::Text(value));
        }
        Ok(Open {
            name,
            attributes,
            children: Vec::new(),
            text: String::new(),
        })
    }

    fn close(self, variant: SchemaVariant) -> Element {
        let content = if !self.children.is_empty() {
            if !self.text.trim().is_empty() {
                log::debug!("dropping mixed text content of <{}>", self.name);
            }
            Content::Complex(group_children(&self.name, self.children, variant))
        } else if self.text.trim().is_empty() {
            Content::Empty
        } else {
            Content::Simple(variant.type_leaf(&self.name, &self.attributes, &self.text))
        };

        let mut element = Element::new(self.name);
        for (k, v) in self.attributes {
            element.set_attribute(k, v);
        }
        element.set_content(content);
        element
    }
}

/// Group children by name in first-occurrence order. A name that repeats,
/// or that the variant declares repeated under `parent`, becomes a plural slot.
fn group_children(parent: &str, children: Vec<Element>, variant: SchemaVariant) -> Vec<Child> {
    let mut groups: IndexMap<String, Vec<Element>> = IndexMap::new();
    for child in children {
        groups.entry(child.name().to_string()).or_default().push(child);
    }

    groups
        .into_iter()
        .map(|(name, mut items)| {
            if items.len() > 1 || variant.is_plural(parent, &name) {
                Child::Plural(Plural::new(name, items))
            } else {
                Child::Single(items.remove(0))
            }
        })
        .collect()
}

/// Parse an XML document into its root element.
///
/// Namespace prefixes are stripped, so `<witsml:log>` and `<log>` read the
/// same. Leaf text is typed by `variant`.
pub fn parse_document(xml: &str, variant: SchemaVariant) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<Open> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                stack.push(Open::from_start(&start)?);
            }
            Event::Empty(start) => {
                let element = Open::from_start(&start)?.close(variant);
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::End(_) => {
                let open = stack
                    .pop()
                    .ok_or_else(|| Error::Malformed("unexpected end tag".to_string()))?;
                let element = open.close(variant);
                attach(&mut stack, &mut root, element)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::Malformed(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| Error::Malformed("document has no root element".to_string()))
}

fn attach(stack: &mut [Open], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(Error::Malformed("more than one root element".to_string())),
    }
    Ok(())
}
