//! Generic pre-order traversal over a JSON document.
//!
//! The walk is driven from an explicit work stack of (path, node) tasks, so
//! traversal depth is bounded by heap memory rather than call-stack depth.
//! Object members are visited in received order and array elements in array
//! order; elements are visited at the array's own path (arrays do not add a
//! path segment). The walker never mutates the document.

use serde_json::Value;

use crate::query::FieldPath;

/// Returned by `enter_*` hooks to control traversal of the entered node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitorAction {
    /// Visit the node's children.
    Descend,
    /// Skip the subtree; `leave` is not called for a pruned node.
    Prune,
}

/// Callbacks for [`walk`]. Every hook has a no-op default so visitors
/// implement only what they observe. The `enter_*` hooks receive the whole
/// node (guaranteed to be of the matching kind) so it can be captured.
pub trait JsonVisitor<'a> {
    fn enter_object(&mut self, _path: &FieldPath, _value: &'a Value) -> VisitorAction {
        VisitorAction::Descend
    }

    fn enter_array(&mut self, _path: &FieldPath, _value: &'a Value) -> VisitorAction {
        VisitorAction::Descend
    }

    fn on_scalar(&mut self, _path: &FieldPath, _value: &'a Value) {}

    fn on_null(&mut self, _path: &FieldPath) {}

    /// Called after all children of a descended object or array.
    fn leave(&mut self, _path: &FieldPath, _value: &'a Value) {}
}

enum Task<'a> {
    Visit(FieldPath, &'a Value),
    Leave(FieldPath, &'a Value),
}

/// Depth-first pre-order walk of `root`, starting at `initial_path`.
pub fn walk<'a, V: JsonVisitor<'a>>(root: &'a Value, visitor: &mut V, initial_path: Option<FieldPath>) {
    let mut stack: Vec<Task<'a>> = vec![Task::Visit(initial_path.unwrap_or_default(), root)];

    while let Some(task) = stack.pop() {
        match task {
            Task::Leave(path, value) => visitor.leave(&path, value),
            Task::Visit(path, value) => match value {
                Value::Null => visitor.on_null(&path),
                Value::Object(members) => {
                    if visitor.enter_object(&path, value) == VisitorAction::Descend {
                        stack.push(Task::Leave(path.clone(), value));
                        for (key, child) in members.iter().rev() {
                            stack.push(Task::Visit(path.child(key), child));
                        }
                    }
                }
                Value::Array(items) => {
                    if visitor.enter_array(&path, value) == VisitorAction::Descend {
                        stack.push(Task::Leave(path.clone(), value));
                        for child in items.iter().rev() {
                            stack.push(Task::Visit(path.clone(), child));
                        }
                    }
                }
                scalar => visitor.on_scalar(&path, scalar),
            },
        }
    }
}
