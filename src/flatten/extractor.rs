//! Locating declared frame roots within a document.
//!
//! A single walker pass tracks the current path and captures each node whose
//! path matches a declared frame root. Subtrees with no nested frames are
//! pruned once captured; otherwise traversal continues so nested frame roots
//! accumulate one occurrence per enclosing item, in document order. The
//! capture record is released on leave so sibling occurrences (array elements
//! share their array's path) are collected independently.

use std::collections::HashMap;

use serde_json::Value;

use crate::flatten::error::FrameError;
use crate::flatten::walker::{walk, JsonVisitor, VisitorAction};
use crate::query::{FieldPath, FrameSpec, QueryModel};

/// Collect the ordered occurrences of every declared frame.
///
/// Output order follows the declared-frame list, not document layout. A root
/// path absent from the document (or resolved to null) yields an empty
/// occurrence list; a scalar at a root path is a fault.
pub fn extract_frames<'doc, 'model>(
    document: &'doc Value,
    model: &'model QueryModel,
) -> Result<Vec<(&'model FrameSpec, Vec<&'doc Value>)>, FrameError> {
    let mut collector = FrameCollector {
        model,
        found: vec![Vec::new(); model.frames.len()],
        captured: HashMap::new(),
        fault: None,
    };
    walk(document, &mut collector, None);

    if let Some(fault) = collector.fault {
        return Err(fault);
    }
    Ok(model.frames.iter().zip(collector.found).collect())
}

struct FrameCollector<'doc, 'model> {
    model: &'model QueryModel,
    found: Vec<Vec<&'doc Value>>,
    captured: HashMap<FieldPath, &'doc Value>,
    fault: Option<FrameError>,
}

impl<'doc, 'model> FrameCollector<'doc, 'model> {
    fn frame_index(&self, path: &FieldPath) -> Option<usize> {
        self.model.frames.iter().position(|f| f.root == *path)
    }

    fn try_capture(&mut self, path: &FieldPath, value: &'doc Value) -> VisitorAction {
        if self.fault.is_some() {
            return VisitorAction::Prune;
        }
        if self.captured.contains_key(path) {
            // Inside an already-captured frame; only nested roots matter here.
            return VisitorAction::Descend;
        }
        if let Some(index) = self.frame_index(path) {
            self.found[index].push(value);
            if !self.model.has_nested_frame(path) {
                return VisitorAction::Prune;
            }
            self.captured.insert(path.clone(), value);
        }
        VisitorAction::Descend
    }
}

impl<'doc, 'model> JsonVisitor<'doc> for FrameCollector<'doc, 'model> {
    fn enter_object(&mut self, path: &FieldPath, value: &'doc Value) -> VisitorAction {
        self.try_capture(path, value)
    }

    fn enter_array(&mut self, path: &FieldPath, value: &'doc Value) -> VisitorAction {
        self.try_capture(path, value)
    }

    fn on_scalar(&mut self, path: &FieldPath, _: &'doc Value) {
        if self.fault.is_none() && !self.captured.contains_key(path) {
            if let Some(index) = self.frame_index(path) {
                self.fault = Some(FrameError::ScalarFrameRoot {
                    frame: self.model.frames[index].name.clone(),
                    path: path.join("."),
                });
            }
        }
    }

    fn leave(&mut self, path: &FieldPath, value: &'doc Value) {
        if let Some(captured) = self.captured.get(path) {
            if std::ptr::eq(*captured, value) {
                self.captured.remove(path);
            }
        }
    }
}
