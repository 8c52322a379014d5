//! Queryable WITSML object types and selector rules

use crate::error::{Error, Result};
use crate::model::Element;
use std::fmt;
use std::str::FromStr;

/// Identifier attributes that select an object in a store query
const ID_ATTRIBUTES: &[&str] = &["uid", "uidWell", "uidWellbore"];

/// Top-level query elements accepted by every growing or wellbore object
const COMMON_ELEMENTS: &[&str] = &["nameWell", "nameWellbore", "name", "commonData"];

/// A top-level WITSML 1.4.1.1 data object that a store can serve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Well,
    Wellbore,
    Log,
    Trajectory,
    MudLog,
    BhaRun,
    Rig,
    WbGeometry,
    FormationMarker,
    Message,
    Tubular,
    FluidsReport,
    OpsReport,
    Risk,
    Attachment,
}

impl ObjectType {
    pub const ALL: [ObjectType; 15] = [
        ObjectType::Well,
        ObjectType::Wellbore,
        ObjectType::Log,
        ObjectType::Trajectory,
        ObjectType::MudLog,
        ObjectType::BhaRun,
        ObjectType::Rig,
        ObjectType::WbGeometry,
        ObjectType::FormationMarker,
        ObjectType::Message,
        ObjectType::Tubular,
        ObjectType::FluidsReport,
        ObjectType::OpsReport,
        ObjectType::Risk,
        ObjectType::Attachment,
    ];

    /// Element name of one object, also the `WMLtypeIn` of store calls
    pub fn name(self) -> &'static str {
        match self {
            ObjectType::Well => "well",
            ObjectType::Wellbore => "wellbore",
            ObjectType::Log => "log",
            ObjectType::Trajectory => "trajectory",
            ObjectType::MudLog => "mudLog",
            ObjectType::BhaRun => "bhaRun",
            ObjectType::Rig => "rig",
            ObjectType::WbGeometry => "wbGeometry",
            ObjectType::FormationMarker => "formationMarker",
            ObjectType::Message => "message",
            ObjectType::Tubular => "tubular",
            ObjectType::FluidsReport => "fluidsReport",
            ObjectType::OpsReport => "opsReport",
            ObjectType::Risk => "risk",
            ObjectType::Attachment => "attachment",
        }
    }

    /// Name of the envelope element, e.g. `logs`, `trajectorys`
    pub fn plural_name(self) -> String {
        format!("{}s", self.name())
    }

    /// Identifier attributes this type carries
    pub fn id_attributes(self) -> &'static [&'static str] {
        match self {
            ObjectType::Well => &ID_ATTRIBUTES[..1],
            ObjectType::Wellbore => &ID_ATTRIBUTES[..2],
            _ => ID_ATTRIBUTES,
        }
    }

    /// Type-specific top-level elements usable in a selector
    fn specific_elements(self) -> &'static [&'static str] {
        match self {
            ObjectType::Well => &[
                "field", "country", "state", "county", "region", "district", "operator",
                "statusWell", "purposeWell", "timeZone", "numAPI", "numGovt",
            ],
            ObjectType::Wellbore => &[
                "parentWellbore", "number", "statusWellbore", "isActive", "purposeWellbore",
                "typeWellbore", "shape",
            ],
            ObjectType::Log => &[
                "objectGrowing", "dataRowCount", "serviceCompany", "runNumber", "bhaRunNumber",
                "pass", "creationDate", "description", "indexType", "startIndex", "endIndex",
                "startDateTimeIndex", "endDateTimeIndex", "direction", "indexCurve",
                "nullValue", "logParam", "logCurveInfo", "logData",
            ],
            ObjectType::Trajectory => &[
                "objectGrowing", "parentTrajectory", "dTimTrajStart", "dTimTrajEnd", "mdMn",
                "mdMx", "serviceCompany", "definitive", "memory", "finalTraj", "aziRef",
                "trajectoryStation",
            ],
            ObjectType::MudLog => &[
                "objectGrowing", "dTim", "mudLogCompany", "mudLogEngineers", "startMd",
                "endMd", "geologyInterval",
            ],
            ObjectType::BhaRun => &[
                "tubular", "dTimStart", "dTimStop", "numBitRun", "numStringRun", "reasonTrip",
            ],
            ObjectType::Rig => &["owner", "typeRig", "manufacturer", "yearEntService"],
            ObjectType::WbGeometry => &["dTimReport", "mdBottom", "wbGeometrySection"],
            ObjectType::FormationMarker => &["mdPrognosed", "mdTopSample", "dip", "lithostratigraphic"],
            ObjectType::Message => &["dTim", "typeMessage", "messageText", "severity"],
            ObjectType::Tubular => &["typeTubularAssy", "tubularComponent"],
            ObjectType::FluidsReport => &["dTim", "md", "fluid"],
            ObjectType::OpsReport => &["dTim", "rig", "activity"],
            ObjectType::Risk => &["type", "category", "summary", "severityLevel"],
            ObjectType::Attachment => &["fileName", "fileType", "content"],
        }
    }

    /// Whether `field` may appear in a selector for this type
    pub fn accepts_field(self, field: &str) -> bool {
        self.id_attributes().contains(&field)
            || COMMON_ELEMENTS.contains(&field)
            || self.specific_elements().contains(&field)
    }

    /// Build a query object from `field = value` pairs.
    ///
    /// Identifier fields become attributes, everything else a child element
    /// holding the value as text. An empty value yields an empty element,
    /// which asks the store to return that field.
    pub fn query_object<'a, I>(self, selector: I) -> Result<Element>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut object = Element::new(self.name());
        for (field, value) in selector {
            if !self.accepts_field(field) {
                return Err(Error::MalformedSelector {
                    object_type: self.name().to_string(),
                    field: field.to_string(),
                });
            }
            if self.id_attributes().contains(&field) {
                object.set_attribute(field, value);
            } else if value.is_empty() {
                object.push_child(Element::new(field));
            } else {
                object.push_child(Element::new(field).with_value(value));
            }
        }
        Ok(object)
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ObjectType {
    type Err = Error;

    /// Accepts the element name (`log`) or the binding-style name (`obj_log`)
    fn from_str(s: &str) -> Result<Self> {
        let name = s.strip_prefix("obj_").unwrap_or(s);
        ObjectType::ALL
            .into_iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| Error::UnqueryableType(s.to_string()))
    }
}
