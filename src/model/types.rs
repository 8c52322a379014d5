use crate::error::{Error, Result};
use chrono::{DateTime, FixedOffset, SecondsFormat};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A leaf value of a WITSML document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Double(f64),
    Timestamp(DateTime<FixedOffset>),
    Text(String),
    Bytes(Vec<u8>),
}

impl Scalar {
    pub fn kind(&self) -> &'static str {
        match self {
            Scalar::Bool(_) => "bool",
            Scalar::Int(_) => "int",
            Scalar::Double(_) => "double",
            Scalar::Timestamp(_) => "timestamp",
            Scalar::Text(_) => "text",
            Scalar::Bytes(_) => "bytes",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view; integers widen to f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Double(v) => Some(*v),
            Scalar::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(v) => write!(f, "{}", v),
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::Double(v) => write!(f, "{}", v),
            Scalar::Timestamp(v) => f.write_str(&v.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Scalar::Text(v) => f.write_str(v),
            Scalar::Bytes(v) => f.write_str(&String::from_utf8_lossy(v)),
        }
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(v.into())
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Double(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<DateTime<FixedOffset>> for Scalar {
    fn from(v: DateTime<FixedOffset>) -> Self {
        Scalar::Timestamp(v)
    }
}

/// How an element carries its content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// No text and no child elements
    Empty,
    /// Exactly one scalar value
    Simple,
    /// Named child elements
    Complex,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Empty => "empty",
            ContentKind::Simple => "simple",
            ContentKind::Complex => "complex",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Content {
    #[default]
    Empty,
    Simple(Scalar),
    Complex(Vec<Child>),
}

/// A named child slot of a complex element
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Single(Element),
    Plural(Plural),
}

impl Child {
    pub fn name(&self) -> &str {
        match self {
            Child::Single(e) => &e.name,
            Child::Plural(p) => &p.name,
        }
    }

    pub fn as_node(&self) -> NodeRef<'_> {
        match self {
            Child::Single(e) => NodeRef::Element(e),
            Child::Plural(p) => NodeRef::Plural(p),
        }
    }

    /// The element, or the members of the plural
    pub fn items(&self) -> &[Element] {
        match self {
            Child::Single(e) => std::slice::from_ref(e),
            Child::Plural(p) => &p.items,
        }
    }
}

/// Repeated elements of one declared type, e.g. every `trajectoryStation`
/// inside a `trajectory`
#[derive(Debug, Clone, PartialEq)]
pub struct Plural {
    name: String,
    items: Vec<Element>,
}

impl Plural {
    pub fn new(name: impl Into<String>, items: Vec<Element>) -> Self {
        Plural {
            name: name.into(),
            items,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn items(&self) -> &[Element] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.items.iter()
    }

    pub fn push(&mut self, item: Element) {
        self.items.push(item);
    }

    pub fn into_items(self) -> Vec<Element> {
        self.items
    }
}

impl<'a> IntoIterator for &'a Plural {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// A node of a typed WITSML tree
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    attributes: IndexMap<String, Scalar>,
    content: Content,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            attributes: IndexMap::new(),
            content: Content::Empty,
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Turn this element into a simple-content node holding `value`
    pub fn with_value(mut self, value: impl Into<Scalar>) -> Self {
        self.content = Content::Simple(value.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.push_child(child);
        self
    }

    /// Shorthand for a child holding a single text value
    pub fn with_text(self, name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.with_child(Element::new(name).with_value(value))
    }

    /// Add a plural child; it stays plural even with a single item
    pub fn with_plural(mut self, name: impl Into<String>, items: Vec<Element>) -> Self {
        self.push_plural(Plural::new(name, items));
        self
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<Scalar>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn set_content(&mut self, content: Content) {
        self.content = content;
    }

    /// Append a child element. A second child with an existing name turns
    /// that slot into a plural.
    pub fn push_child(&mut self, child: Element) {
        let children = self.children_mut();
        match children.iter().position(|c| c.name() == child.name) {
            Some(idx) => {
                let slot = &mut children[idx];
                match slot {
                    Child::Plural(p) => p.push(child),
                    Child::Single(first) => {
                        let first = std::mem::replace(first, Element::new(String::new()));
                        let name = first.name.clone();
                        *slot = Child::Plural(Plural::new(name, vec![first, child]));
                    }
                }
            }
            None => children.push(Child::Single(child)),
        }
    }

    pub fn push_plural(&mut self, plural: Plural) {
        let children = self.children_mut();
        match children.iter().position(|c| c.name() == plural.name) {
            Some(idx) => {
                let slot = &mut children[idx];
                match slot {
                    Child::Plural(p) => p.items.extend(plural.items),
                    Child::Single(first) => {
                        let mut items = vec![std::mem::replace(first, Element::new(String::new()))];
                        items.extend(plural.items);
                        *slot = Child::Plural(Plural::new(plural.name, items));
                    }
                }
            }
            None => children.push(Child::Plural(plural)),
        }
    }

    fn children_mut(&mut self) -> &mut Vec<Child> {
        if !matches!(self.content, Content::Complex(_)) {
            self.content = Content::Complex(Vec::new());
        }
        match &mut self.content {
            Content::Complex(children) => children,
            _ => unreachable!(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &IndexMap<String, Scalar> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Scalar> {
        self.attributes.get(name)
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn content_kind(&self) -> ContentKind {
        match self.content {
            Content::Empty => ContentKind::Empty,
            Content::Simple(_) => ContentKind::Simple,
            Content::Complex(_) => ContentKind::Complex,
        }
    }

    /// The scalar of a simple-content node
    pub fn value(&self) -> Option<&Scalar> {
        match &self.content {
            Content::Simple(v) => Some(v),
            _ => None,
        }
    }

    /// Named children in first-occurrence order; empty unless complex
    pub fn children(&self) -> &[Child] {
        match &self.content {
            Content::Complex(children) => children,
            _ => &[],
        }
    }

    pub fn child(&self, name: &str) -> Option<&Child> {
        self.children().iter().find(|c| c.name() == name)
    }

    /// A single child element, or the first item of a plural child
    pub fn element(&self, name: &str) -> Option<&Element> {
        match self.child(name)? {
            Child::Single(e) => Some(e),
            Child::Plural(p) => p.items.first(),
        }
    }

    pub fn plural(&self, name: &str) -> Option<&Plural> {
        match self.child(name)? {
            Child::Plural(p) => Some(p),
            Child::Single(_) => None,
        }
    }

    /// All elements stored under `name`, whether single or plural
    pub fn elements<'a>(&'a self, name: &str) -> &'a [Element] {
        match self.child(name) {
            Some(Child::Single(e)) => std::slice::from_ref(e),
            Some(Child::Plural(p)) => &p.items,
            None => &[],
        }
    }

    /// Text of a simple-content child
    pub fn text(&self, name: &str) -> Option<String> {
        self.element(name)?.value().map(|v| v.to_string())
    }

    /// Follow a `.`-separated chain of child names down to a scalar
    pub fn scalar_at(&self, path: &str) -> Result<&Scalar> {
        let mut node = self;
        let mut walked = String::new();
        for part in path.split('.').filter(|p| !p.is_empty()) {
            if !walked.is_empty() {
                walked.push('.');
            }
            walked.push_str(part);
            node = match node.child(part) {
                Some(Child::Single(e)) => e,
                Some(Child::Plural(_)) => {
                    return Err(Error::TypeMismatch {
                        path: walked,
                        expected: "single element",
                        found: "plural",
                    })
                }
                None => return Err(Error::MissingElement { path: walked }),
            };
        }
        node.value().ok_or_else(|| Error::TypeMismatch {
            path: walked,
            expected: "simple",
            found: node.content_kind().as_str(),
        })
    }
}

/// Borrowed view of either kind of node
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Element(&'a Element),
    Plural(&'a Plural),
}

impl<'a> From<&'a Element> for NodeRef<'a> {
    fn from(e: &'a Element) -> Self {
        NodeRef::Element(e)
    }
}

impl<'a> From<&'a Plural> for NodeRef<'a> {
    fn from(p: &'a Plural) -> Self {
        NodeRef::Plural(p)
    }
}

impl<'a> From<&'a Child> for NodeRef<'a> {
    fn from(c: &'a Child) -> Self {
        c.as_node()
    }
}
