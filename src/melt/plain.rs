use crate::error::Result;
use crate::melt::logdata::{decode_log, is_log_with_data};
use crate::melt::types::{Plain, PlainConfig};
use crate::model::{Child, Content, Element, NodeRef, Plural};
use indexmap::{IndexMap, IndexSet};

/// Converts typed WITSML trees into nested plain data
pub struct PlainConverter {
    config: PlainConfig,
}

impl PlainConverter {
    pub fn new(config: PlainConfig) -> Self {
        PlainConverter { config }
    }

    pub fn config(&self) -> &PlainConfig {
        &self.config
    }

    /// Convert any node into maps, lists and primitive values.
    ///
    /// Logs carrying a `logData` block are decoded into columns by
    /// mnemonic instead of being walked element by element.
    pub fn convert<'a>(&self, node: impl Into<NodeRef<'a>>) -> Result<Plain> {
        self.any_to_plain(node.into())
    }

    fn any_to_plain(&self, node: NodeRef<'_>) -> Result<Plain> {
        match node {
            NodeRef::Plural(plural) => self.plural_to_plain(plural),
            NodeRef::Element(element) if is_log_with_data(element) => {
                Ok(decode_log(element, true)?.to_plain())
            }
            NodeRef::Element(element) => self.singular_to_plain(element),
        }
    }

    fn plural_to_plain(&self, plural: &Plural) -> Result<Plain> {
        let items = plural
            .iter()
            .map(|item| self.any_to_plain(NodeRef::Element(item)))
            .collect::<Result<Vec<_>>>()?;

        if self.config.transpose {
            Ok(pivot(&items))
        } else {
            Ok(Plain::List(items))
        }
    }

    fn singular_to_plain(&self, element: &Element) -> Result<Plain> {
        let children = match element.content() {
            Content::Empty => return Ok(Plain::Null),
            Content::Simple(value) => return Ok(Plain::Scalar(value.clone())),
            Content::Complex(children) => children,
        };

        let mut map = IndexMap::new();
        if self.config.include_attr {
            for (name, value) in element.attributes() {
                let key = format!("{}{}", self.config.attr_prefix, name);
                map.insert(key, Plain::Scalar(value.clone()));
            }
        }

        for child in children {
            if self.config.include_attr {
                if let Child::Single(single) = child {
                    for (name, value) in single.attributes() {
                        let key = format!(
                            "{}{}{}{}",
                            child.name(),
                            self.config.delimiter,
                            self.config.attr_prefix,
                            name
                        );
                        map.insert(key, Plain::Scalar(value.clone()));
                    }
                }
            }
            map.insert(child.name().to_string(), self.any_to_plain(child.as_node())?);
        }

        Ok(Plain::Map(map))
    }
}

impl Default for PlainConverter {
    fn default() -> Self {
        PlainConverter::new(PlainConfig::default())
    }
}

/// Pivot a list of maps into a map of lists.
///
/// Keys appear in first-seen order and members lacking a key contribute
/// `Null`. Members that are not maps contribute no keys.
pub fn pivot(items: &[Plain]) -> Plain {
    let mut keys: IndexSet<&str> = IndexSet::new();
    for item in items {
        if let Some(map) = item.as_map() {
            keys.extend(map.keys().map(|k| k.as_str()));
        }
    }

    let columns = keys
        .into_iter()
        .map(|key| {
            let column = items
                .iter()
                .map(|item| item.get(key).cloned().unwrap_or(Plain::Null))
                .collect();
            (key.to_string(), Plain::List(column))
        })
        .collect();

    Plain::Map(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Scalar;
    use serde_json::json;

    fn wellbore() -> Element {
        Element::new("wellbore")
            .with_attribute("uid", "B-1")
            .with_child(Element::new("well").with_attribute("uid", "W-1").with_value("Snorre"))
            .with_text("name", "wellb1")
            .with_child(Element::new("md").with_attribute("uom", "m").with_value(1200.0))
            .with_child(Element::new("purposeWellbore"))
    }

    #[test]
    fn test_nested_map() {
        let plain = PlainConverter::default().convert(&wellbore()).unwrap();
        assert_eq!(
            plain.to_json().unwrap(),
            json!({"well": "Snorre", "name": "wellb1", "md": 1200.0, "purposeWellbore": null})
        );
    }

    #[test]
    fn test_attributes_as_sibling_keys() {
        let config = PlainConfig {
            include_attr: true,
            attr_prefix: "@".to_string(),
            ..Default::default()
        };
        let plain = PlainConverter::new(config).convert(&wellbore()).unwrap();
        let keys: Vec<&str> = plain.as_map().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(
            keys,
            vec!["@uid", "well.@uid", "well", "name", "md.@uom", "md", "purposeWellbore"]
        );
        assert_eq!(plain.get("well.@uid").unwrap().as_scalar(), Some(&Scalar::from("W-1")));
    }

    #[test]
    fn test_plural_list_and_transpose() {
        let traj = Element::new("trajectory")
            .with_text("name", "T1")
            .with_child(Element::new("trajectoryStation").with_text("md", 1).with_text("incl", 0.5))
            .with_child(Element::new("trajectoryStation").with_text("md", 2));

        let plain = PlainConverter::default().convert(&traj).unwrap();
        assert_eq!(
            plain.to_json().unwrap(),
            json!({"name": "T1", "trajectoryStation": [{"md": 1, "incl": 0.5}, {"md": 2}]})
        );

        let config = PlainConfig {
            transpose: true,
            ..Default::default()
        };
        let plain = PlainConverter::new(config).convert(&traj).unwrap();
        assert_eq!(
            plain.to_json().unwrap(),
            json!({"name": "T1", "trajectoryStation": {"md": [1, 2], "incl": [0.5, null]}})
        );
    }

    #[test]
    fn test_logs_decode_as_columns() {
        let log = Element::new("log")
            .with_text("name", "GR run")
            .with_child(
                Element::new("logCurveInfo")
                    .with_text("mnemonic", "DEPT")
                    .with_text("typeLogData", "double"),
            )
            .with_child(
                Element::new("logData")
                    .with_text("mnemonicList", "DEPT")
                    .with_plural("data", vec![Element::new("data").with_value("1.5")]),
            );
        let logs = Element::new("logs").with_plural("log", vec![log]);

        let plain = PlainConverter::default().convert(&logs).unwrap();
        assert_eq!(plain.to_json().unwrap(), json!({"log": [{"DEPT": [1.5]}]}));

        // without data the log is walked like any other element
        let header = Element::new("log").with_text("name", "GR run");
        let plain = PlainConverter::default().convert(&header).unwrap();
        assert_eq!(plain.to_json().unwrap(), json!({"name": "GR run"}));
    }

    #[test]
    fn test_pivot_skips_non_maps() {
        let mut a = IndexMap::new();
        a.insert("x".to_string(), Plain::from(Scalar::Int(1)));
        let items = vec![Plain::Map(a), Plain::Null];
        assert_eq!(pivot(&items).to_json().unwrap(), json!({"x": [1, null]}));
    }
}
