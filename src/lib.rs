//! # witsml-melt - WITSML flattening toolkit
//!
//! Turns WITSML documents (wells, logs, trajectories, ...) into data that is
//! easy to analyse, and talks to WITSML stores to fetch them.
//!
//! ## Modules
//!
//! - **model**: typed object tree and XML codec
//! - **schema**: schema variants and queryable object types
//! - **melt**: flatten objects, build frames, decode log data
//! - **store**: SOAP client for WITSML stores
//!
//! ## Quick Start
//!
//! ### Framing trajectory stations
//!
//! ```rust
//! use witsml_melt::melt::{FlattenConfig, Flattener};
//! use witsml_melt::model::parse_document;
//! use witsml_melt::schema::SchemaVariant;
//!
//! # fn main() -> anyhow::Result<()> {
//! let xml = r#"<trajectorys xmlns="http://www.witsml.org/schemas/1series" version="1.4.1.1">
//!   <trajectory uidWell="W-1" uidWellbore="B-1" uid="T-1">
//!     <name>Survey</name>
//!     <trajectoryStation uid="S-1"><md uom="m">100</md><incl uom="dega">0.5</incl></trajectoryStation>
//!     <trajectoryStation uid="S-2"><md uom="m">200</md></trajectoryStation>
//!   </trajectory>
//! </trajectorys>"#;
//!
//! let root = parse_document(xml, SchemaVariant::V1411Read)?;
//! let trajectory = root.element("trajectory").expect("one trajectory");
//! let stations = trajectory.elements("trajectoryStation");
//!
//! let frame = Flattener::new(FlattenConfig::default()).frame(stations);
//! assert_eq!(frame.keys().collect::<Vec<_>>(), vec!["md", "incl"]);
//! assert_eq!(frame.column_f64("incl")?, vec![Some(0.5), None]);
//! # Ok(())
//! # }
//! ```
//!
//! ### Querying a store
//!
//! ```no_run
//! use witsml_melt::config::ClientConfig;
//! use witsml_melt::schema::ObjectType;
//! use witsml_melt::store::{ReturnElements, StoreClient};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = ClientConfig::new("https://store.example.com/witsml/store", "user", "secret");
//! let client = StoreClient::connect(&config)?;
//! let wellbores = client.list(ObjectType::Wellbore, &[("uidWell", "W-1")], ReturnElements::IdOnly)?;
//! println!("{} wellbores", wellbores.len());
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::path::Path;

pub mod config;
pub mod error;
pub mod melt;
pub mod model;
pub mod schema;
pub mod store;

// Re-export commonly used types for convenience
pub use config::{ClientConfig, Verify};
pub use error::Error;
pub use melt::{decode_log, Flattener, FlattenConfig, Frame, Plain, PlainConfig, PlainConverter};
pub use model::{parse_document, Element, Plural, Scalar};
pub use schema::{ObjectType, SchemaVariant};
pub use store::{ReturnElements, StoreClient};

/// Main entry point: read and parse a WITSML document from disk
pub fn read_document<P: AsRef<Path>>(path: P, variant: SchemaVariant) -> Result<Element> {
    let path = path.as_ref();
    let xml = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let root = parse_document(&xml, variant)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(root)
}

/// Members of the first element named `name`, searched depth first in
/// document order. Empty when no such element exists.
pub fn find_members<'a>(root: &'a Element, name: &str) -> &'a [Element] {
    let mut stack = vec![root];
    while let Some(element) = stack.pop() {
        let found = element.elements(name);
        if !found.is_empty() {
            return found;
        }
        for child in element.children().iter().rev() {
            for item in child.items().iter().rev() {
                stack.push(item);
            }
        }
    }
    &[]
}

#[cfg(test)]
mod tests {
    use super::*;

    const MUDLOG: &str = r#"<mudLogs version="1.4.1.1">
  <mudLog uid="M-1">
    <name>ML</name>
    <geologyInterval uid="G-1"><typeLithology>cuttings</typeLithology><mdTop uom="m">10</mdTop></geologyInterval>
    <geologyInterval uid="G-2"><typeLithology>core</typeLithology><mdTop uom="m">20</mdTop></geologyInterval>
  </mudLog>
</mudLogs>"#;

    #[test]
    fn test_find_members() {
        let root = parse_document(MUDLOG, SchemaVariant::V1411Read).unwrap();
        let intervals = find_members(&root, "geologyInterval");
        assert_eq!(intervals.len(), 2);

        let frame = Flattener::default().frame(intervals);
        assert_eq!(frame.column_f64("mdTop").unwrap(), vec![Some(10.0), Some(20.0)]);
        assert!(find_members(&root, "trajectoryStation").is_empty());
    }

    #[test]
    fn test_read_document_reports_path() {
        let err = read_document("/nonexistent/log.xml", SchemaVariant::V1411Read).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/log.xml"));
    }
}
