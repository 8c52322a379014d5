//! Schema variants and leaf typing
//!
//! A document is always read with an explicitly chosen [`SchemaVariant`].
//! The variant decides which namespace and version an envelope carries,
//! which element names are repeated collections even when they occur once,
//! and how leaf text is typed.

use crate::error::{Error, Result};
use crate::model::Scalar;
use chrono::DateTime;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

static ISO_DATETIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})$").unwrap()
});

static INTEGER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?\d+$").unwrap());

/// Objects that repeat only directly inside their plural envelope, e.g. `<logs>`.
/// The same names also occur as single references, like `<tubular uidRef>` in a `bhaRun`.
static OBJECTS_1411: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "well",
        "wellbore",
        "log",
        "trajectory",
        "mudLog",
        "bhaRun",
        "rig",
        "wbGeometry",
        "formationMarker",
        "message",
        "tubular",
        "fluidsReport",
        "opsReport",
        "risk",
        "attachment",
    ]
    .into_iter()
    .collect()
});

/// Children that repeat under any parent in the 1.4.1.1 data schemas
static PLURAL_1411: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "logCurveInfo",
        "logData",
        "logParam",
        "data",
        "trajectoryStation",
        "geologyInterval",
        "lithology",
        "parameter",
        "wellDatum",
        "wellLocation",
        "wellCRS",
        "referencePoint",
        "location",
        "extensionNameValue",
        "wbGeometrySection",
        "chronostratigraphic",
        "lithostratigraphic",
        "tubularComponent",
        "drillingParams",
        "bitRecord",
        "nozzle",
        "connection",
        "pump",
        "pit",
        "shaker",
        "fluid",
        "activity",
        "nameTag",
        "axisDefinition",
    ]
    .into_iter()
    .collect()
});

/// Elements that repeat in the 2.0 data schemas
static PLURAL_20: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "Citation",
        "ExtensionNameValue",
        "LogCurveInfo",
        "TrajectoryStation",
        "GeologyInterval",
        "Lithology",
        "WellDatum",
        "Location",
        "Channel",
        "Data",
    ]
    .into_iter()
    .collect()
});

static INTEGER_ELEMENTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "numRows",
        "numSubStation",
        "numStand",
        "numBitRun",
        "numPlan",
        "numString",
        "numJointStand",
        "numCent",
        "numStab",
        "numNozzle",
        "priority",
        "columnIndex",
        "sequence",
    ]
    .into_iter()
    .collect()
});

/// Elements whose text is decoded later and must stay verbatim
static RAW_TEXT_ELEMENTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["data", "mnemonicList", "unitList", "dataDelimiter", "Data", "XMLout", "QueryIn", "XMLin"]
        .into_iter()
        .collect()
});

/// Date-time elements whose names do not start with `dTim`
static DATETIME_ELEMENTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "startDateTimeIndex",
        "endDateTimeIndex",
        "minDateTimeIndex",
        "maxDateTimeIndex",
        "creationDate",
        "creation",
        "lastUpdate",
        "dateTime",
    ]
    .into_iter()
    .collect()
});

static BOOLEAN_ELEMENTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "objectGrowing",
        "definitive",
        "memory",
        "finalTraj",
        "isActive",
        "stdLog",
        "cleanData",
        "isDefinitive",
    ]
    .into_iter()
    .collect()
});

/// Which WITSML binding governs a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SchemaVariant {
    /// 1.4.1.1 read schemas: everything optional, as returned by a store
    #[default]
    V1411Read,
    /// 1.4.1.1 write schemas: objects must carry their identifiers
    V1411Write,
    /// Energistics 2.0 data objects
    V20,
}

impl SchemaVariant {
    pub fn namespace(self) -> &'static str {
        match self {
            SchemaVariant::V1411Read | SchemaVariant::V1411Write => {
                "http://www.witsml.org/schemas/1series"
            }
            SchemaVariant::V20 => "http://www.energistics.org/energyml/data/witsmlv2",
        }
    }

    pub fn version(self) -> &'static str {
        match self {
            SchemaVariant::V1411Read | SchemaVariant::V1411Write => "1.4.1.1",
            SchemaVariant::V20 => "2.0",
        }
    }

    /// Whether the store API (WMLS 1.4) can carry documents of this variant
    pub fn is_store_compatible(self) -> bool {
        !matches!(self, SchemaVariant::V20)
    }

    /// Whether `name` is declared as a repeated element when it occurs in `parent`
    pub fn is_plural(self, parent: &str, name: &str) -> bool {
        match self {
            SchemaVariant::V1411Read | SchemaVariant::V1411Write => {
                if OBJECTS_1411.contains(name) {
                    parent.strip_suffix('s') == Some(name)
                } else {
                    PLURAL_1411.contains(name)
                }
            }
            SchemaVariant::V20 => PLURAL_20.contains(name),
        }
    }

    /// Type the text content of a leaf element.
    ///
    /// Measures (anything carrying a `uom` attribute) become doubles,
    /// ISO-8601 text in date-time elements (`dTim*` and a few others) becomes
    /// a timestamp, known counters and flags become integers and booleans.
    /// Text that does not cast stays text.
    pub fn type_leaf(self, name: &str, attributes: &IndexMap<String, Scalar>, text: &str) -> Scalar {
        if RAW_TEXT_ELEMENTS.contains(name) {
            return Scalar::Text(text.to_string());
        }

        let trimmed = text.trim();

        if attributes.contains_key("uom") {
            if let Ok(v) = trimmed.parse::<f64>() {
                return Scalar::Double(v);
            }
        }

        let local = match self {
            SchemaVariant::V20 => lower_first(name),
            _ => name.to_string(),
        };

        if is_datetime_element(&local) && ISO_DATETIME_REGEX.is_match(trimmed) {
            if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
                return Scalar::Timestamp(ts);
            }
        }

        if INTEGER_ELEMENTS.contains(local.as_str()) && INTEGER_REGEX.is_match(trimmed) {
            if let Ok(v) = trimmed.parse::<i64>() {
                return Scalar::Int(v);
            }
        }

        if BOOLEAN_ELEMENTS.contains(local.as_str()) {
            match trimmed {
                "true" | "1" => return Scalar::Bool(true),
                "false" | "0" => return Scalar::Bool(false),
                _ => {}
            }
        }

        Scalar::Text(text.to_string())
    }
}

fn is_datetime_element(local: &str) -> bool {
    local.starts_with("dTim") || DATETIME_ELEMENTS.contains(local)
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SchemaVariant::V1411Read => "1.4.1.1-read",
            SchemaVariant::V1411Write => "1.4.1.1-write",
            SchemaVariant::V20 => "2.0",
        };
        f.write_str(s)
    }
}

impl FromStr for SchemaVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "1.4.1.1-read" | "1.4.1.1" | "read" => Ok(SchemaVariant::V1411Read),
            "1.4.1.1-write" | "write" => Ok(SchemaVariant::V1411Write),
            "2.0" | "v20" => Ok(SchemaVariant::V20),
            other => Err(Error::InvalidEnumValue {
                kind: "schema variant",
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_attrs() -> IndexMap<String, Scalar> {
        IndexMap::new()
    }

    #[test]
    fn test_measure_becomes_double() {
        let mut attrs = IndexMap::new();
        attrs.insert("uom".to_string(), Scalar::from("m"));
        let v = SchemaVariant::V1411Read.type_leaf("md", &attrs, "1234.5");
        assert_eq!(v, Scalar::Double(1234.5));
    }

    #[test]
    fn test_timestamp_detection() {
        let v = SchemaVariant::V1411Read.type_leaf("dTimCreation", &no_attrs(), "2019-03-01T10:00:00Z");
        assert!(matches!(v, Scalar::Timestamp(_)));

        // looks like a date but has no offset
        let v = SchemaVariant::V1411Read.type_leaf("comments", &no_attrs(), "2019-03-01T10:00:00");
        assert_eq!(v, Scalar::Text("2019-03-01T10:00:00".to_string()));

        let v = SchemaVariant::V20.type_leaf("DTimStn", &no_attrs(), "2019-03-01T10:00:00+01:00");
        assert!(matches!(v, Scalar::Timestamp(_)));
    }

    #[test]
    fn test_date_text_outside_date_time_elements_stays_text() {
        let variant = SchemaVariant::V1411Read;
        assert_eq!(
            variant.type_leaf("name", &no_attrs(), "2019-03-01T12:00:00Z"),
            Scalar::Text("2019-03-01T12:00:00Z".to_string())
        );
        assert_eq!(
            variant.type_leaf("description", &no_attrs(), "2019-03-01T12:00:00+00:00"),
            Scalar::Text("2019-03-01T12:00:00+00:00".to_string())
        );
        assert!(matches!(
            variant.type_leaf("startDateTimeIndex", &no_attrs(), "2019-03-01T12:00:00Z"),
            Scalar::Timestamp(_)
        ));
    }

    #[test]
    fn test_identifiers_stay_text() {
        let v = SchemaVariant::V1411Read.type_leaf("uid", &no_attrs(), "001");
        assert_eq!(v, Scalar::Text("001".to_string()));
    }

    #[test]
    fn test_raw_text_elements() {
        let v = SchemaVariant::V1411Read.type_leaf("data", &no_attrs(), "2019-03-01T10:00:00Z");
        assert_eq!(v, Scalar::Text("2019-03-01T10:00:00Z".to_string()));
    }

    #[test]
    fn test_counters_and_flags() {
        let variant = SchemaVariant::V1411Read;
        assert_eq!(variant.type_leaf("numRows", &no_attrs(), "42"), Scalar::Int(42));
        assert_eq!(variant.type_leaf("objectGrowing", &no_attrs(), "false"), Scalar::Bool(false));
        assert_eq!(SchemaVariant::V20.type_leaf("ObjectGrowing", &no_attrs(), "true"), Scalar::Bool(true));
    }

    #[test]
    fn test_plurality_tables() {
        let variant = SchemaVariant::V1411Read;
        assert!(variant.is_plural("trajectory", "trajectoryStation"));
        assert!(variant.is_plural("bhaRun", "drillingParams"));
        assert!(variant.is_plural("log", "logParam"));
        assert!(variant.is_plural("well", "wellCRS"));
        assert!(!variant.is_plural("trajectory", "name"));
        assert!(SchemaVariant::V20.is_plural("Trajectory", "TrajectoryStation"));
    }

    #[test]
    fn test_objects_are_plural_only_in_their_envelope() {
        let variant = SchemaVariant::V1411Read;
        assert!(variant.is_plural("tubulars", "tubular"));
        assert!(variant.is_plural("logs", "log"));
        assert!(!variant.is_plural("bhaRun", "tubular"));
        assert!(!variant.is_plural("opsReport", "rig"));
    }

    #[test]
    fn test_variant_from_str() {
        assert_eq!("write".parse::<SchemaVariant>().unwrap(), SchemaVariant::V1411Write);
        assert!(matches!(
            "1.3".parse::<SchemaVariant>(),
            Err(Error::InvalidEnumValue { .. })
        ));
    }
}
