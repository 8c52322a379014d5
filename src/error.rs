//! Error types for flattening, log decoding and store access.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong in this crate.
///
/// A column that is shorter than its siblings in a non-fill-missing
/// [`Frame`](crate::melt::Frame) is *not* an error; see
/// [`FlattenConfig::fill_missing`](crate::melt::FlattenConfig::fill_missing).
#[derive(Debug, Error)]
pub enum Error {
    /// A node had a different shape than the operation needs.
    #[error("type mismatch at '{path}': expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A delimited log field could not be cast to its curve type.
    #[error("cannot decode '{value}' as {kind} for mnemonic '{mnemonic}'")]
    Decode {
        mnemonic: String,
        value: String,
        kind: &'static str,
    },

    /// A log data row did not have one field per mnemonic.
    #[error("log data row {row} has {found} fields, mnemonic list has {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("missing element '{path}'")]
    MissingElement { path: String },

    /// The object type is unknown or cannot be used with the store.
    #[error("not a queryable WITSML type: {0}")]
    UnqueryableType(String),

    #[error("malformed selector for '{object_type}': {field}")]
    MalformedSelector { object_type: String, field: String },

    #[error("invalid {kind} value: '{value}'")]
    InvalidEnumValue { kind: &'static str, value: String },

    #[error("objects in one request must share a type, found '{first}' and '{other}'")]
    MixedObjectTypes { first: String, other: String },

    #[error("validation failed: {0}")]
    Validation(String),

    /// The store answered with a non-positive result code.
    #[error("{code} : {message} - {supplemental}")]
    Store {
        code: i32,
        message: String,
        supplemental: String,
    },

    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("SOAP error: {0}")]
    Soap(String),

    #[error("frame columns have different lengths; cannot export rows")]
    RaggedFrame,

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::Xml(err.into())
    }
}
