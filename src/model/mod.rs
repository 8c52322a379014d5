//! Typed object model for WITSML documents
//!
//! An [`Element`] is one node of a document: ordered attributes plus either
//! nothing, one scalar value, or named children. Children that repeat are
//! held together in a [`Plural`], so a tree can be walked without caring
//! how the repeated elements were interleaved in the source document.

pub mod parse;
pub mod types;
pub mod write;

pub use parse::parse_document;
pub use types::{Child, Content, ContentKind, Element, NodeRef, Plural, Scalar};
pub use write::{pretty_save, to_pretty_xml, to_xml};
