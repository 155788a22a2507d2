//! Selection-set inference from sample documents.
//!
//! When no query model is available, a usable selection set can be derived
//! from one or more sample responses by collecting every leaf path. The
//! inferred set selects exactly the columns unrestricted flattening would
//! produce for the same documents.

use serde_json::Value;

use crate::flatten::walker::{walk, JsonVisitor};
use crate::query::{FieldPath, SelectionSet};

/// Infer a selection set covering every leaf path in `samples`.
pub fn infer_selection(samples: &[Value]) -> SelectionSet {
    let mut collector = LeafCollector(SelectionSet::default());
    for sample in samples {
        walk(sample, &mut collector, None);
    }
    collector.0
}

struct LeafCollector(SelectionSet);

impl LeafCollector {
    fn record(&mut self, path: &FieldPath) {
        // A leaf at the document root has no name to select.
        if !path.is_empty() {
            self.0.insert(path.clone());
        }
    }
}

impl<'a> JsonVisitor<'a> for LeafCollector {
    fn on_scalar(&mut self, path: &FieldPath, _: &'a Value) {
        self.record(path);
    }

    fn on_null(&mut self, path: &FieldPath) {
        self.record(path);
    }
}
