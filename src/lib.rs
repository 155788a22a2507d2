//! # Quarry - GraphQL Response Flattening
//!
//! A library for turning nested, partially-null JSON documents (GraphQL
//! responses) into flat tabular row-sets ("frames"), driven by a query model
//! describing which sub-trees are frames and which field paths were requested.
//!
//! ## Modules
//!
//! - **flatten**: the extraction/normalization engine (walker, extractor,
//!   normalizer, column namer, executor)
//! - **query**: the query-model interface produced by an external compiler
//! - **infer**: derive a selection set from sample documents
//!
//! ## Quick Start
//!
//! ```rust
//! use quarry::{FlattenOptions, Flattener, QueryModel, SelectionSet};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), quarry::FrameError> {
//! let data = json!({
//!     "launches": [
//!         {"mission_name": "FalconSat", "rocket": {"rocket_name": "Falcon 1"}}
//!     ]
//! });
//!
//! let model = QueryModel::implicit(SelectionSet::from_dotted(
//!     ["launches.mission_name", "launches.rocket.rocket_name"],
//!     ".",
//! ));
//!
//! let tables = Flattener::new(FlattenOptions::new()).flatten(&data, &model)?;
//!
//! // tables[0] = the "default" frame: one row per launch, nested rocket
//! // fields joined into dotted column names
//! assert_eq!(tables[0].rows.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Selection inference
//!
//! ```rust
//! use quarry::{infer_selection, FlattenOptions, Flattener, QueryModel};
//! use serde_json::json;
//!
//! let data = json!({"ships": [{"name": "GO Quest", "port": {"name": "LA"}}]});
//!
//! let selection = infer_selection(std::slice::from_ref(&data));
//! let tables = Flattener::new(FlattenOptions::new())
//!     .flatten(&data, &QueryModel::implicit(selection))
//!     .unwrap();
//! assert_eq!(tables[0].columns(), ["ships.name", "ships.port.name"]);
//! ```
//!
//! Cross-joining independent sibling lists multiplies row counts; see the
//! `flatten::normalize` module docs for the amplification caveat.

use std::io::Read;

use anyhow::{Context, Result};
use serde_json::Value;

pub mod flatten;
pub mod infer;
pub mod query;

// Re-export commonly used types for convenience
pub use flatten::{
    normalize, FlattenOptions, Flattener, FrameError, FrameTable, FrameWriter, NamingOptions,
    NamingStrategy, NormalizeOptions, Row, SingleWriter,
};
pub use infer::infer_selection;
pub use query::{FieldPath, FrameSpec, GraphQlResponse, QueryModel, SelectionSet, DEFAULT_FRAME};

/// Main entry point: decode a GraphQL response stream, flatten it against
/// `model`, and write one JSON Lines file per frame.
///
/// Returns the upstream GraphQL errors, passed through verbatim and never
/// interpreted.
pub fn flatten_response<R: Read>(
    reader: R,
    writer: &mut FrameWriter,
    model: &QueryModel,
    options: FlattenOptions,
) -> Result<Option<Value>> {
    let body: Value = serde_json::from_reader(reader).context("Failed to parse JSON")?;
    let response = GraphQlResponse::from_value(body)?;

    let tables = Flattener::new(options).flatten(&response.data, model)?;
    writer.write_tables(&tables)?;
    writer.flush()?;

    Ok(response.errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_response_end_to_end() {
        let body = json!({
            "data": {
                "launches": [
                    {"mission_name": "FalconSat"},
                    {"mission_name": "DemoSat"}
                ]
            },
            "errors": [{"message": "partial failure"}]
        });
        let model: QueryModel = serde_json::from_value(json!({
            "frames": [
                {"name": "launches", "root": ["launches"], "selection": [["mission_name"]]}
            ]
        }))
        .unwrap();

        let dir = std::env::temp_dir().join(format!("quarry-lib-test-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let mut writer = FrameWriter::new(&dir).unwrap();

        let errors = flatten_response(
            serde_json::to_vec(&body).unwrap().as_slice(),
            &mut writer,
            &model,
            FlattenOptions::new(),
        )
        .unwrap();

        // Upstream errors ride along unmodified.
        assert_eq!(errors, Some(json!([{"message": "partial failure"}])));

        let written = std::fs::read_to_string(dir.join("launches.jsonl")).unwrap();
        assert_eq!(written.lines().count(), 2);
        assert!(written.contains("FalconSat"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
