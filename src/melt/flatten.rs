use crate::melt::types::{FlatMap, FlattenConfig, Frame};
use crate::model::{Content, Element, NodeRef};
use indexmap::IndexSet;

/// Flattens typed WITSML trees into path → value maps and frames
pub struct Flattener {
    config: FlattenConfig,
}

impl Flattener {
    pub fn new(config: FlattenConfig) -> Self {
        Flattener { config }
    }

    pub fn config(&self) -> &FlattenConfig {
        &self.config
    }

    /// Flatten one object into an ordered map from flattened path to leaf
    /// value.
    ///
    /// Nested element names are joined with the configured delimiter and
    /// members of repeated elements get an `[n]` suffix. Keys come out in
    /// document order. Uses an explicit work list, so deep trees do not
    /// grow the call stack.
    pub fn flatten<'a>(&self, node: impl Into<NodeRef<'a>>) -> FlatMap {
        let mut flat = FlatMap::new();
        let mut work: Vec<(String, NodeRef<'a>)> = vec![(String::new(), node.into())];

        while let Some((path, node)) = work.pop() {
            match node {
                NodeRef::Plural(plural) => {
                    // pushed in reverse so members pop in order
                    for (i, item) in plural.iter().enumerate().rev() {
                        let indexed = format!("{}[{}]", path, self.config.start_idx + i);
                        work.push((indexed, NodeRef::Element(item)));
                    }
                }
                NodeRef::Element(element) => {
                    if self.config.include_attr {
                        for (name, value) in element.attributes() {
                            let attr = format!("{}{}", self.config.attr_prefix, name);
                            flat.insert(self.join(&path, &attr), Some(value.clone()));
                        }
                    }

                    match element.content() {
                        Content::Complex(children) => {
                            for child in children.iter().rev() {
                                work.push((self.join(&path, child.name()), child.as_node()));
                            }
                        }
                        Content::Simple(value) => {
                            flat.insert(path, Some(value.clone()));
                        }
                        Content::Empty => {
                            flat.insert(path, None);
                        }
                    }
                }
            }
        }

        flat
    }

    /// Flatten every member of a repeated element and merge the results
    /// into one column per flattened path.
    ///
    /// Columns appear in the order their keys were first seen. With
    /// `fill_missing` every column has one entry per member; without it a
    /// column only holds the values of members that had the key.
    pub fn frame(&self, members: &[Element]) -> Frame {
        let flats: Vec<FlatMap> = members.iter().map(|m| self.flatten(m)).collect();

        let frame = if self.config.fill_missing {
            let mut keys: IndexSet<String> = IndexSet::new();
            for flat in &flats {
                for key in flat.keys() {
                    if !keys.contains(key) {
                        keys.insert(key.clone());
                    }
                }
            }

            let mut frame = Frame::with_null_columns(keys, members.len());
            for (idx, flat) in flats.into_iter().enumerate() {
                for (key, value) in flat {
                    frame.set(&key, idx, value);
                }
            }
            frame
        } else {
            let mut frame = Frame::new();
            for flat in flats {
                for (key, value) in flat {
                    frame.push(key, value);
                }
            }
            frame
        };

        log::debug!(
            "built frame with {} columns from {} members",
            frame.width(),
            members.len()
        );
        frame
    }

    fn join(&self, base: &str, name: &str) -> String {
        if base.is_empty() {
            name.to_string()
        } else {
            format!("{}{}{}", base, self.config.delimiter, name)
        }
    }
}

impl Default for Flattener {
    fn default() -> Self {
        Flattener::new(FlattenConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Plural, Scalar};
    use serde_json::json;

    fn station(uid: &str, md: f64) -> Element {
        Element::new("trajectoryStation")
            .with_attribute("uid", uid)
            .with_child(Element::new("md").with_attribute("uom", "m").with_value(md))
    }

    #[test]
    fn test_flatten_singular() {
        let well = Element::new("well")
            .with_attribute("uid", "W-1")
            .with_text("name", "Snorre")
            .with_child(
                Element::new("wellDatum")
                    .with_text("name", "KB")
                    .with_text("code", "KB"),
            )
            .with_child(Element::new("timeZone"));

        let flat = Flattener::default().flatten(&well);
        let keys: Vec<&str> = flat.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["name", "wellDatum.name", "wellDatum.code", "timeZone"]);
        assert_eq!(flat["wellDatum.code"], Some(Scalar::from("KB")));
        assert_eq!(flat["timeZone"], None);
    }

    #[test]
    fn test_flatten_indexes_plurals() {
        let traj = Element::new("trajectory")
            .with_text("name", "T1")
            .with_child(station("s1", 100.0))
            .with_child(station("s2", 200.0));

        let config = FlattenConfig {
            start_idx: 1,
            delimiter: "/".to_string(),
            ..Default::default()
        };
        let flat = Flattener::new(config).flatten(&traj);
        let keys: Vec<&str> = flat.keys().map(|k| k.as_str()).collect();
        assert_eq!(
            keys,
            vec!["name", "trajectoryStation[1]/md", "trajectoryStation[2]/md"]
        );
        assert_eq!(flat["trajectoryStation[2]/md"], Some(Scalar::Double(200.0)));
    }

    #[test]
    fn test_flatten_attributes() {
        let wellbore = Element::new("wellbore")
            .with_attribute("uid", "B-1")
            .with_child(Element::new("well").with_attribute("uid", "W-1").with_value("Snorre"));

        let config = FlattenConfig {
            include_attr: true,
            attr_prefix: "@".to_string(),
            ..Default::default()
        };
        let flat = Flattener::new(config).flatten(&wellbore);

        assert_eq!(flat["@uid"], Some(Scalar::from("B-1")));
        assert_eq!(flat["well.@uid"], Some(Scalar::from("W-1")));
        assert_eq!(flat["well"], Some(Scalar::from("Snorre")));
    }

    #[test]
    fn test_flatten_root_plural_and_leaf() {
        let plural = Plural::new("data", vec![
            Element::new("data").with_value("1,2"),
            Element::new("data").with_value("3,4"),
        ]);
        let flat = Flattener::default().flatten(&plural);
        assert_eq!(flat["[0]"], Some(Scalar::from("1,2")));
        assert_eq!(flat["[1]"], Some(Scalar::from("3,4")));

        let leaf = Element::new("name").with_value("x");
        let flat = Flattener::default().flatten(&leaf);
        assert_eq!(flat[""], Some(Scalar::from("x")));
    }

    #[test]
    fn test_frame_fill_missing() {
        let members = vec![
            Element::new("s").with_text("a", 1).with_text("b", 2),
            Element::new("s").with_text("a", 3).with_text("c", 4),
        ];

        let frame = Flattener::default().frame(&members);
        assert_eq!(
            frame.to_json().unwrap(),
            json!({"a": [1, 3], "b": [2, null], "c": [null, 4]})
        );
        assert_eq!(frame.row_count(), Some(2));
    }

    #[test]
    fn test_frame_ragged() {
        let members = vec![
            Element::new("s").with_text("a", 1).with_text("b", 2),
            Element::new("s").with_text("a", 3).with_text("c", 4),
        ];

        let config = FlattenConfig {
            fill_missing: false,
            ..Default::default()
        };
        let frame = Flattener::new(config).frame(&members);
        assert_eq!(
            frame.to_json().unwrap(),
            json!({"a": [1, 3], "b": [2], "c": [4]})
        );
        assert!(!frame.is_aligned());
    }

    #[test]
    fn test_frame_of_stations() {
        let traj = Element::new("trajectory")
            .with_child(station("s1", 100.0))
            .with_child(station("s2", 200.0));

        let config = FlattenConfig {
            include_attr: true,
            attr_prefix: "@".to_string(),
            ..Default::default()
        };
        let stations = traj.plural("trajectoryStation").unwrap();
        let frame = Flattener::new(config).frame(stations.items());

        let keys: Vec<&str> = frame.keys().collect();
        assert_eq!(keys, vec!["@uid", "md.@uom", "md"]);
        assert_eq!(frame.column_f64("md").unwrap(), vec![Some(100.0), Some(200.0)]);
    }
}
