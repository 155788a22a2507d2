//! Orchestration: extract declared frames, normalize every occurrence,
//! concatenate, and apply column naming.
//!
//! A flatten call is a pure transform of (document, query model, options);
//! the engine owns no state across calls. Frames are mutually independent.

use serde_json::Value;

use crate::flatten::columns::{apply_naming, resolve_names, NamingOptions};
use crate::flatten::error::FrameError;
use crate::flatten::extractor::extract_frames;
use crate::flatten::normalize::{normalize, NormalizeOptions, Row};
use crate::query::{FieldPath, QueryModel, SelectionSet, DEFAULT_FRAME};

/// Options governing one flatten call.
#[derive(Debug, Clone)]
pub struct FlattenOptions {
    /// Joins field-path segments into column names. Must be non-empty.
    pub separator: String,

    /// Column naming strategy, global or per frame.
    pub naming: NamingOptions,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        FlattenOptions {
            separator: String::from("."),
            naming: NamingOptions::default(),
        }
    }
}

impl FlattenOptions {
    pub fn new() -> Self {
        FlattenOptions::default()
    }
}

/// One flattened frame: its name and ordered rows.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FrameTable {
    pub name: String,
    pub rows: Vec<Row>,
}

impl FrameTable {
    /// Column names of the table, from its first row.
    pub fn columns(&self) -> Vec<&str> {
        self.rows
            .first()
            .map(|row| row.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// The flattening engine.
pub struct Flattener {
    options: FlattenOptions,
}

impl Flattener {
    pub fn new(options: FlattenOptions) -> Self {
        let options = if options.separator.is_empty() {
            FlattenOptions {
                separator: String::from("."),
                ..options
            }
        } else {
            options
        };
        Flattener { options }
    }

    /// Flatten `document` into one table per declared frame, in declared
    /// order. In implicit mode the whole document becomes a single synthetic
    /// frame named `default`, selected by the model's query-wide selection.
    pub fn flatten(
        &self,
        document: &Value,
        model: &QueryModel,
    ) -> Result<Vec<FrameTable>, FrameError> {
        model.validate()?;

        if model.is_implicit_mode() {
            let rows = self.normalize_occurrences(DEFAULT_FRAME, &[document], &model.selection)?;
            return Ok(vec![self.rename(DEFAULT_FRAME, rows, &model.selection)]);
        }

        let mut tables = Vec::with_capacity(model.frames.len());
        for (spec, occurrences) in extract_frames(document, model)? {
            let rows = self.normalize_occurrences(&spec.name, &occurrences, &spec.selection)?;
            tables.push(self.rename(&spec.name, rows, &spec.selection));
        }
        Ok(tables)
    }

    /// Normalize each occurrence and concatenate, occurrence-major.
    fn normalize_occurrences(
        &self,
        frame: &str,
        occurrences: &[&Value],
        selection: &SelectionSet,
    ) -> Result<Vec<Row>, FrameError> {
        let options = NormalizeOptions {
            separator: self.options.separator.clone(),
            fallback: frame.to_string(),
            selection: Some(selection.clone()),
            frame: frame.to_string(),
        };

        let mut rows = Vec::new();
        for occurrence in occurrences {
            rows.extend(normalize(occurrence, &options)?);
        }
        Ok(rows)
    }

    fn rename(&self, frame: &str, rows: Vec<Row>, selection: &SelectionSet) -> FrameTable {
        let strategy = self.options.naming.strategy_for(frame);
        let paths: Vec<FieldPath> = if selection.is_empty() {
            discovered_paths(&rows, &self.options.separator)
        } else {
            selection.iter().cloned().collect()
        };
        let mapping = resolve_names(&paths, &self.options.separator, strategy);

        FrameTable {
            name: frame.to_string(),
            rows: apply_naming(rows, &mapping),
        }
    }
}

/// Column paths of an unrestricted normalization, recovered from the rows.
fn discovered_paths(rows: &[Row], separator: &str) -> Vec<FieldPath> {
    let mut paths = Vec::new();
    for row in rows {
        for name in row.keys() {
            let path = FieldPath::parse(name, separator);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::columns::NamingStrategy;
    use crate::query::FrameSpec;
    use serde_json::json;

    fn flattener() -> Flattener {
        Flattener::new(FlattenOptions::new())
    }

    fn table_json(table: &FrameTable) -> Value {
        serde_json::to_value(&table.rows).unwrap()
    }

    #[test]
    fn test_implicit_mode_single_default_frame() {
        let doc = json!({
            "launches": [
                {"mission_name": "FalconSat", "rocket": {"rocket_name": "Falcon 1"}}
            ]
        });
        let model = QueryModel::implicit(SelectionSet::from_dotted(
            ["launches.mission_name", "launches.rocket.rocket_name"],
            ".",
        ));

        let tables = flattener().flatten(&doc, &model).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, DEFAULT_FRAME);
        assert_eq!(
            table_json(&tables[0]),
            json!([{
                "launches.mission_name": "FalconSat",
                "launches.rocket.rocket_name": "Falcon 1"
            }])
        );
    }

    #[test]
    fn test_declared_frames_in_declared_order() {
        let doc = json!({
            "ships": [{"name": "GO Quest"}],
            "launches": [{"mission_name": "CRS-20"}]
        });
        let model = QueryModel::with_frames(
            [
                FrameSpec {
                    name: "launches".to_string(),
                    root: FieldPath::new(["launches"]),
                    selection: SelectionSet::from_dotted(["mission_name"], "."),
                },
                FrameSpec {
                    name: "ships".to_string(),
                    root: FieldPath::new(["ships"]),
                    selection: SelectionSet::from_dotted(["name"], "."),
                },
            ],
            SelectionSet::default(),
        );

        let tables = flattener().flatten(&doc, &model).unwrap();
        assert_eq!(tables[0].name, "launches");
        assert_eq!(table_json(&tables[0]), json!([{"mission_name": "CRS-20"}]));
        assert_eq!(tables[1].name, "ships");
        assert_eq!(table_json(&tables[1]), json!([{"name": "GO Quest"}]));
    }

    #[test]
    fn test_nested_frame_concatenates_parent_major() {
        let doc = json!({
            "capsules": [
                {"serial": "C101", "missions": [{"name": "m1"}]},
                {"serial": "C102", "missions": [{"name": "m2"}]},
                {"serial": "C103", "missions": [{"name": "m3"}]},
                {"serial": "C104", "missions": [{"name": "m4"}, {"name": "m5"}]},
                {"serial": "C105", "missions": [{"name": "m6"}, {"name": "m7"}, {"name": "m8"}]}
            ]
        });
        let model = QueryModel::with_frames(
            [
                FrameSpec {
                    name: "capsules".to_string(),
                    root: FieldPath::new(["capsules"]),
                    selection: SelectionSet::from_dotted(["serial", "missions.name"], "."),
                },
                FrameSpec {
                    name: "missions".to_string(),
                    root: FieldPath::new(["capsules", "missions"]),
                    selection: SelectionSet::from_dotted(["name"], "."),
                },
            ],
            SelectionSet::default(),
        );

        let tables = flattener().flatten(&doc, &model).unwrap();

        // The capsule frame cross-joins its mission list: 1+1+1+2+3 rows.
        assert_eq!(tables[0].rows.len(), 8);
        assert_eq!(
            serde_json::to_value(&tables[0].rows[7]).unwrap(),
            json!({"serial": "C105", "missions.name": "m8"})
        );

        // The nested frame combines five occurrences, outer-item-major.
        let names: Vec<&Value> = tables[1].rows.iter().map(|r| &r["name"]).collect();
        assert_eq!(tables[1].rows.len(), 8);
        assert_eq!(
            names,
            [
                &json!("m1"),
                &json!("m2"),
                &json!("m3"),
                &json!("m4"),
                &json!("m5"),
                &json!("m6"),
                &json!("m7"),
                &json!("m8"),
            ]
        );
    }

    #[test]
    fn test_absent_frame_root_yields_empty_table() {
        let doc = json!({"launches": null});
        let model = QueryModel::with_frames(
            [FrameSpec {
                name: "launches".to_string(),
                root: FieldPath::new(["launches"]),
                selection: SelectionSet::from_dotted(["mission_name"], "."),
            }],
            SelectionSet::default(),
        );

        let tables = flattener().flatten(&doc, &model).unwrap();
        assert_eq!(tables[0].name, "launches");
        assert!(tables[0].rows.is_empty());
    }

    #[test]
    fn test_scalar_list_frame_uses_frame_name_column() {
        let doc = json!({"roadster": {"wikipedia": ["en", "de"]}});
        let model = QueryModel::with_frames(
            [FrameSpec {
                name: "wikipedia".to_string(),
                root: FieldPath::new(["roadster", "wikipedia"]),
                selection: SelectionSet::default(),
            }],
            SelectionSet::default(),
        );

        let tables = flattener().flatten(&doc, &model).unwrap();
        assert_eq!(
            table_json(&tables[0]),
            json!([{"wikipedia": "en"}, {"wikipedia": "de"}])
        );
    }

    #[test]
    fn test_short_naming_applied_per_frame() {
        let doc = json!({
            "launches": [{"rocket": {"rocket_name": "Falcon 9"}}],
            "ships": [{"home_port": {"name": "Port Canaveral"}}]
        });
        let model = QueryModel::with_frames(
            [
                FrameSpec {
                    name: "launches".to_string(),
                    root: FieldPath::new(["launches"]),
                    selection: SelectionSet::from_dotted(["rocket.rocket_name"], "."),
                },
                FrameSpec {
                    name: "ships".to_string(),
                    root: FieldPath::new(["ships"]),
                    selection: SelectionSet::from_dotted(["home_port.name"], "."),
                },
            ],
            SelectionSet::default(),
        );

        let options = FlattenOptions {
            separator: String::from("."),
            naming: NamingOptions::short().with_frame("ships", NamingStrategy::Full),
        };
        let tables = Flattener::new(options).flatten(&doc, &model).unwrap();

        assert_eq!(table_json(&tables[0]), json!([{"rocket_name": "Falcon 9"}]));
        assert_eq!(
            table_json(&tables[1]),
            json!([{"home_port.name": "Port Canaveral"}])
        );
    }

    #[test]
    fn test_duplicate_frame_names_fail_fast() {
        let doc = json!({"a": []});
        let spec = FrameSpec {
            name: "a".to_string(),
            root: FieldPath::new(["a"]),
            selection: SelectionSet::default(),
        };
        let model = QueryModel::with_frames([spec.clone(), spec], SelectionSet::default());

        assert!(matches!(
            flattener().flatten(&doc, &model),
            Err(FrameError::DuplicateFrame { .. })
        ));
    }

    #[test]
    fn test_implicit_unrestricted_discovers_columns() {
        let doc = json!({"a": 1, "b": {"c": [true, false]}});
        let model = QueryModel::implicit(SelectionSet::default());

        let options = FlattenOptions {
            separator: String::from("."),
            naming: NamingOptions::short(),
        };
        let tables = Flattener::new(options).flatten(&doc, &model).unwrap();

        assert_eq!(
            table_json(&tables[0]),
            json!([{"a": 1, "c": true}, {"a": 1, "c": false}])
        );
    }

    #[test]
    fn test_flatten_is_deterministic() {
        let doc = json!({"xs": [{"a": 1, "b": [2, 3]}]});
        let model = QueryModel::implicit(SelectionSet::from_dotted(["xs.a", "xs.b"], "."));

        let first = flattener().flatten(&doc, &model).unwrap();
        let second = flattener().flatten(&doc, &model).unwrap();
        assert_eq!(first, second);
    }
}
