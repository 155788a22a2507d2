//! Flattening of one sub-tree into rows.
//!
//! Recursive rules: a scalar leaf contributes a single column; sibling
//! branches of an object are combined by full cross join; an array
//! concatenates its per-element row-groups in array order before joining them
//! against the rows accumulated so far; null, missing, or empty branches under
//! selected paths fill null into the affected columns instead of dropping rows
//! or columns. Leaf values pass through unchanged.
//!
//! Cross-joining k independent sibling list branches of lengths n1..nk yields
//! the product n1*...*nk rows at that nesting level. That amplification is the
//! contract, not a defect; callers bound input size.

use serde_json::{Map, Value};

use crate::flatten::error::FrameError;
use crate::query::{FieldPath, SelectionSet, DEFAULT_FRAME};

/// One output row: column name to scalar-or-null, in column order.
pub type Row = Map<String, Value>;

/// Options for one normalization pass.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Joins field-path segments into column names.
    pub separator: String,

    /// Column name used when the field path is empty (a frame rooted directly
    /// at scalars). The executor sets this to the frame name.
    pub fallback: String,

    /// Paths allowed to become columns. `None` or an empty set disables
    /// filtering: every leaf becomes a column.
    pub selection: Option<SelectionSet>,

    /// Frame label used in faults.
    pub frame: String,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        NormalizeOptions {
            separator: String::from("."),
            fallback: String::from("?"),
            selection: None,
            frame: String::from(DEFAULT_FRAME),
        }
    }
}

/// Flatten `node` into rows. Every row carries the same column set; the
/// output is deterministic for identical inputs.
pub fn normalize(node: &Value, options: &NormalizeOptions) -> Result<Vec<Row>, FrameError> {
    let selection = options.selection.as_ref().filter(|s| !s.is_empty());
    let mut rows = vec![Row::new()];
    merge_value(&mut rows, node, &FieldPath::root(), selection, options)?;
    Ok(rows)
}

/// Normalize `node` in isolation and merge the outcome into `rows`.
fn merge_value(
    rows: &mut Vec<Row>,
    node: &Value,
    path: &FieldPath,
    selection: Option<&SelectionSet>,
    options: &NormalizeOptions,
) -> Result<(), FrameError> {
    match node {
        Value::Object(members) => merge_object(rows, members, path, selection, options),
        Value::Array(items) => merge_array(rows, items, path, selection, options),
        Value::Null => {
            match selection {
                None => set_column(rows, path, Value::Null, options),
                // Null stands in for the whole branch: fill every selected
                // leaf beneath it so sibling cardinality is preserved.
                Some(sel) => {
                    for leaf in sel.leaves_under(path) {
                        set_column(rows, leaf, Value::Null, options);
                    }
                }
            }
            Ok(())
        }
        scalar => {
            match selection {
                None => set_column(rows, path, scalar.clone(), options),
                Some(sel) => {
                    if sel.contains(path) {
                        set_column(rows, path, scalar.clone(), options);
                    } else if sel.prefixes(path) {
                        return Err(mismatch(path, scalar, options));
                    }
                }
            }
            Ok(())
        }
    }
}

fn merge_object(
    rows: &mut Vec<Row>,
    members: &Map<String, Value>,
    path: &FieldPath,
    selection: Option<&SelectionSet>,
    options: &NormalizeOptions,
) -> Result<(), FrameError> {
    if let Some(sel) = selection {
        if sel.contains(path) && !sel.prefixes(path) {
            // An object sitting exactly on a selected leaf is ungrounded.
            return Err(mismatch(path, &Value::Object(Map::new()), options));
        }
    }

    for (key, child) in members {
        let child_path = path.child(key);
        match selection {
            Some(sel) if !sel.covers(&child_path) => continue,
            _ => merge_value(rows, child, &child_path, selection, options)?,
        }
    }

    // Selected branches absent from this object still yield columns.
    if let Some(sel) = selection {
        for leaf in sel.leaves_under(path) {
            if leaf.len() <= path.len() {
                continue;
            }
            let next = &leaf.segments()[path.len()];
            if !members.contains_key(next) {
                set_column(rows, leaf, Value::Null, options);
            }
        }
    }

    Ok(())
}

fn merge_array(
    rows: &mut Vec<Row>,
    items: &[Value],
    path: &FieldPath,
    selection: Option<&SelectionSet>,
    options: &NormalizeOptions,
) -> Result<(), FrameError> {
    // One row-group per element, concatenated in array order.
    let mut group: Vec<Row> = Vec::new();
    for item in items {
        let mut item_rows = vec![Row::new()];
        merge_value(&mut item_rows, item, path, selection, options)?;
        group.extend(item_rows);
    }

    if group.is_empty() {
        // Empty list: treat like an absent branch rather than erasing the
        // rows contributed by sibling branches.
        if let Some(sel) = selection {
            for leaf in sel.leaves_under(path) {
                set_column(rows, leaf, Value::Null, options);
            }
        }
        return Ok(());
    }

    cross_join(rows, &group);
    Ok(())
}

/// Replace `rows` with the Cartesian product of `rows` and `group`,
/// existing-row-major.
fn cross_join(rows: &mut Vec<Row>, group: &[Row]) {
    let mut joined = Vec::with_capacity(rows.len() * group.len());
    for existing in rows.iter() {
        for addition in group {
            let mut merged = existing.clone();
            for (name, value) in addition {
                merged.insert(name.clone(), value.clone());
            }
            joined.push(merged);
        }
    }
    *rows = joined;
}

fn set_column(rows: &mut [Row], path: &FieldPath, value: Value, options: &NormalizeOptions) {
    let name = column_name(path, options);
    for row in rows.iter_mut() {
        row.insert(name.clone(), value.clone());
    }
}

fn column_name(path: &FieldPath, options: &NormalizeOptions) -> String {
    if path.is_empty() {
        options.fallback.clone()
    } else {
        path.join(&options.separator)
    }
}

fn mismatch(path: &FieldPath, node: &Value, options: &NormalizeOptions) -> FrameError {
    FrameError::SelectionMismatch {
        frame: options.frame.clone(),
        path: column_name(path, options),
        found: kind_name(node),
    }
}

fn kind_name(node: &Value) -> &'static str {
    match node {
        Value::Null => "null",
        Value::Bool(_) | Value::Number(_) | Value::String(_) => "a scalar",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
