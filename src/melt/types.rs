use crate::error::{Error, Result};
use crate::model::Scalar;
use indexmap::IndexMap;
use serde::Serialize;

/// Flattened path → leaf value of one object. `None` marks an empty element.
pub type FlatMap = IndexMap<String, Option<Scalar>>;

/// One column of a [`Frame`]; `None` is the null marker
pub type Column = Vec<Option<Scalar>>;

/// Column-oriented table: flattened path (or mnemonic) → values, one per
/// member of the source collection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Frame {
    columns: IndexMap<String, Column>,
}

impl Frame {
    pub fn new() -> Self {
        Frame::default()
    }

    /// A frame with every key mapped to `rows` null markers
    pub fn with_null_columns<I>(keys: I, rows: usize) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Frame {
            columns: keys.into_iter().map(|k| (k, vec![None; rows])).collect(),
        }
    }

    pub fn insert_column(&mut self, key: impl Into<String>, column: Column) {
        self.columns.insert(key.into(), column);
    }

    /// Append to a column, creating it on first use
    pub fn push(&mut self, key: impl Into<String>, value: Option<Scalar>) {
        self.columns.entry(key.into()).or_default().push(value);
    }

    /// Overwrite row `idx` of an existing column; returns false if the
    /// column or row does not exist
    pub fn set(&mut self, key: &str, idx: usize, value: Option<Scalar>) -> bool {
        match self.columns.get_mut(key).and_then(|c| c.get_mut(idx)) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn column(&self, key: &str) -> Option<&[Option<Scalar>]> {
        self.columns.get(key).map(|c| c.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|k| k.as_str())
    }

    pub fn columns(&self) -> &IndexMap<String, Column> {
        &self.columns
    }

    pub fn into_columns(self) -> IndexMap<String, Column> {
        self.columns
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Whether all columns have the same length
    pub fn is_aligned(&self) -> bool {
        let mut lens = self.columns.values().map(|c| c.len());
        match lens.next() {
            Some(first) => lens.all(|l| l == first),
            None => true,
        }
    }

    /// Common column length, if the frame is aligned
    pub fn row_count(&self) -> Option<usize> {
        if !self.is_aligned() {
            return None;
        }
        Some(self.columns.values().next().map_or(0, |c| c.len()))
    }

    /// A column as floats. Integers widen; anything else is a type mismatch.
    pub fn column_f64(&self, key: &str) -> Result<Vec<Option<f64>>> {
        let column = self.columns.get(key).ok_or_else(|| Error::MissingElement {
            path: key.to_string(),
        })?;
        column
            .iter()
            .map(|v| match v {
                None => Ok(None),
                Some(s) => s.as_f64().map(Some).ok_or(Error::TypeMismatch {
                    path: key.to_string(),
                    expected: "double",
                    found: s.kind(),
                }),
            })
            .collect()
    }

    /// Row-wise view of an aligned frame
    pub fn rows(&self) -> Result<Vec<IndexMap<&str, Option<&Scalar>>>> {
        let n = self.row_count().ok_or(Error::RaggedFrame)?;
        Ok((0..n)
            .map(|i| {
                self.columns
                    .iter()
                    .map(|(k, c)| (k.as_str(), c[i].as_ref()))
                    .collect()
            })
            .collect())
    }

    /// Same table as a map of lists of plain values
    pub fn to_plain(&self) -> Plain {
        Plain::Map(
            self.columns
                .iter()
                .map(|(k, c)| {
                    let list = c.iter().cloned().map(Plain::from).collect();
                    (k.clone(), Plain::List(list))
                })
                .collect(),
        )
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Nested plain data: maps, lists and primitive values only
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Plain {
    Null,
    Scalar(Scalar),
    List(Vec<Plain>),
    Map(IndexMap<String, Plain>),
}

impl Plain {
    pub fn is_null(&self) -> bool {
        matches!(self, Plain::Null)
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Plain>> {
        match self {
            Plain::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Plain]> {
        match self {
            Plain::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Plain::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a key of a map
    pub fn get(&self, key: &str) -> Option<&Plain> {
        self.as_map()?.get(key)
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl From<Option<Scalar>> for Plain {
    fn from(v: Option<Scalar>) -> Self {
        match v {
            Some(s) => Plain::Scalar(s),
            None => Plain::Null,
        }
    }
}

impl From<Scalar> for Plain {
    fn from(v: Scalar) -> Self {
        Plain::Scalar(v)
    }
}

/// Configuration for flattening objects and building frames
#[derive(Debug, Clone)]
pub struct FlattenConfig {
    /// Also emit attributes
    pub include_attr: bool,

    /// Prefix for attribute names, e.g. "@"
    pub attr_prefix: String,

    /// Separator between nested element names
    pub delimiter: String,

    /// First index used for members of a repeated element
    pub start_idx: usize,

    /// Backfill keys a member lacks with null markers. When false, each
    /// column only holds the values that were present, so columns may
    /// differ in length and rows must not be read across columns.
    pub fill_missing: bool,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        FlattenConfig {
            include_attr: false,
            attr_prefix: String::new(),
            delimiter: String::from("."),
            start_idx: 0,
            fill_missing: true,
        }
    }
}

/// Configuration for converting objects to plain nested data
#[derive(Debug, Clone)]
pub struct PlainConfig {
    /// Also emit attributes
    pub include_attr: bool,

    /// Prefix for attribute names, e.g. "@"
    pub attr_prefix: String,

    /// Separator between a child name and its attribute names
    pub delimiter: String,

    /// Turn repeated elements into a map of lists instead of a list of maps
    pub transpose: bool,
}

impl Default for PlainConfig {
    fn default() -> Self {
        PlainConfig {
            include_attr: false,
            attr_prefix: String::new(),
            delimiter: String::from("."),
            transpose: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_frame_alignment() {
        let mut frame = Frame::new();
        frame.push("a", Some(Scalar::Int(1)));
        frame.push("a", Some(Scalar::Int(2)));
        frame.push("b", None);
        assert!(!frame.is_aligned());
        assert_eq!(frame.row_count(), None);
        assert!(matches!(frame.rows(), Err(Error::RaggedFrame)));

        frame.push("b", Some(Scalar::from("x")));
        assert_eq!(frame.row_count(), Some(2));
        assert_eq!(frame.rows().unwrap()[1]["b"], Some(&Scalar::from("x")));
    }

    #[test]
    fn test_frame_json() {
        let mut frame = Frame::with_null_columns(vec!["md".to_string(), "uid".to_string()], 2);
        assert!(frame.set("md", 0, Some(Scalar::Double(10.5))));
        assert!(!frame.set("md", 5, None));
        assert!(!frame.set("azi", 0, None));
        frame.set("uid", 1, Some(Scalar::from("s2")));

        assert_eq!(
            frame.to_json().unwrap(),
            json!({"md": [10.5, null], "uid": [null, "s2"]})
        );
    }

    #[test]
    fn test_column_f64() {
        let mut frame = Frame::new();
        frame.insert_column("GR", vec![Some(Scalar::Int(3)), None, Some(Scalar::Double(1.5))]);
        frame.insert_column("name", vec![Some(Scalar::from("x"))]);

        assert_eq!(frame.column_f64("GR").unwrap(), vec![Some(3.0), None, Some(1.5)]);
        assert!(matches!(
            frame.column_f64("name"),
            Err(Error::TypeMismatch { ref path, .. }) if path == "name"
        ));
        assert!(matches!(frame.column_f64("RES"), Err(Error::MissingElement { .. })));
    }

    #[test]
    fn test_plain_json() {
        let mut map = IndexMap::new();
        map.insert("name".to_string(), Plain::from(Scalar::from("Snorre")));
        map.insert("depth".to_string(), Plain::Null);
        map.insert(
            "tags".to_string(),
            Plain::List(vec![Plain::from(Scalar::Int(1)), Plain::from(Scalar::Bool(true))]),
        );

        assert_eq!(
            Plain::Map(map).to_json().unwrap(),
            json!({"name": "Snorre", "depth": null, "tags": [1, true]})
        );
    }
}
