//! Query-model types produced by an external query compiler.
//!
//! The engine never parses query text itself. A compiler (or any caller)
//! supplies a [`QueryModel`] describing which sub-trees of the response are
//! frames and which field paths were explicitly requested. All types are
//! serde-(de)serializable so the model can be handed over as JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::flatten::FrameError;

/// Frame name used when a query declares no frames (implicit mode).
pub const DEFAULT_FRAME: &str = "default";

/// An ordered sequence of post-alias field names, from a frame root down to a
/// leaf or nested-frame boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// The empty path (the document root).
    pub fn root() -> Self {
        FieldPath(Vec::new())
    }

    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldPath(segments.into_iter().map(Into::into).collect())
    }

    /// Parse a separator-joined path, e.g. `rocket.rocket_name`.
    pub fn parse(dotted: &str, separator: &str) -> Self {
        if dotted.is_empty() {
            return FieldPath::root();
        }
        FieldPath(dotted.split(separator).map(str::to_string).collect())
    }

    /// A new path with `name` appended.
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        FieldPath(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// True when `prefix` is an initial segment run of this path.
    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }

    /// Join the segments into a column name.
    pub fn join(&self, separator: &str) -> String {
        self.0.join(separator)
    }
}

/// The set of field paths explicitly requested beneath a frame root.
///
/// A leaf value becomes a column only if its path is a member; a branch is
/// descended only if some member lies beneath it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet(HashSet<FieldPath>);

impl SelectionSet {
    pub fn new<I>(paths: I) -> Self
    where
        I: IntoIterator<Item = FieldPath>,
    {
        SelectionSet(paths.into_iter().collect())
    }

    /// Build from separator-joined path strings.
    pub fn from_dotted<I, S>(paths: I, separator: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        SelectionSet(
            paths
                .into_iter()
                .map(|p| FieldPath::parse(p.as_ref(), separator))
                .collect(),
        )
    }

    pub fn insert(&mut self, path: FieldPath) {
        self.0.insert(path);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Membership test for a leaf path.
    pub fn contains(&self, path: &FieldPath) -> bool {
        self.0.contains(path)
    }

    /// True when some member strictly extends `path`.
    pub fn prefixes(&self, path: &FieldPath) -> bool {
        self.0.iter().any(|p| p.len() > path.len() && p.starts_with(path))
    }

    /// True when `path` is a member or an ancestor of a member. Branches for
    /// which this is false are skipped entirely during normalization.
    pub fn covers(&self, path: &FieldPath) -> bool {
        self.contains(path) || self.prefixes(path)
    }

    /// All members at or beneath `prefix`, sorted, for deterministic fill
    /// order of absent branches.
    pub fn leaves_under(&self, prefix: &FieldPath) -> Vec<&FieldPath> {
        let mut leaves: Vec<&FieldPath> = self.0.iter().filter(|p| p.starts_with(prefix)).collect();
        leaves.sort();
        leaves
    }

    /// All members, sorted by path.
    pub fn sorted(&self) -> Vec<&FieldPath> {
        let mut paths: Vec<&FieldPath> = self.0.iter().collect();
        paths.sort();
        paths
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldPath> {
        self.0.iter()
    }
}

impl FromIterator<FieldPath> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = FieldPath>>(iter: I) -> Self {
        SelectionSet(iter.into_iter().collect())
    }
}

/// One declared frame: a named, flattenable view of a response sub-tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSpec {
    /// Frame name (the field alias, or the field name).
    pub name: String,

    /// Path of the frame root within the document.
    pub root: FieldPath,

    /// Paths requested beneath the root, relative to it.
    pub selection: SelectionSet,
}

/// The per-query configuration handed over by the query compiler. Immutable
/// for the duration of one flatten call; threaded explicitly, never ambient.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryModel {
    /// Declared frames, in declaration order. Empty means implicit mode.
    #[serde(default)]
    pub frames: Vec<FrameSpec>,

    /// The whole query's selection set, relative to the document root.
    #[serde(default)]
    pub selection: SelectionSet,
}

impl QueryModel {
    /// A model with no declared frames: the entire response is flattened as a
    /// single synthetic frame named [`DEFAULT_FRAME`].
    pub fn implicit(selection: SelectionSet) -> Self {
        QueryModel {
            frames: Vec::new(),
            selection,
        }
    }

    pub fn with_frames<I>(frames: I, selection: SelectionSet) -> Self
    where
        I: IntoIterator<Item = FrameSpec>,
    {
        QueryModel {
            frames: frames.into_iter().collect(),
            selection,
        }
    }

    pub fn is_implicit_mode(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, name: &str) -> Option<&FrameSpec> {
        self.frames.iter().find(|f| f.name == name)
    }

    pub fn is_frame_at(&self, path: &FieldPath) -> bool {
        self.frames.iter().any(|f| f.root == *path)
    }

    /// True when another declared frame root lies strictly beneath `path`.
    /// Nested frames are derived from the declared list; there is no separate
    /// registry to fall out of sync.
    pub fn has_nested_frame(&self, path: &FieldPath) -> bool {
        self.frames
            .iter()
            .any(|f| f.root.len() > path.len() && f.root.starts_with(path))
    }

    /// Reject models the engine cannot ground, naming the offender.
    pub fn validate(&self) -> Result<(), FrameError> {
        let mut seen = HashSet::new();
        for frame in &self.frames {
            if !seen.insert(frame.name.as_str()) {
                return Err(FrameError::DuplicateFrame {
                    frame: frame.name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// The `{data, errors}` envelope of a GraphQL response.
///
/// Errors are carried through verbatim; the engine never interprets them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlResponse {
    pub data: Value,
    pub errors: Option<Value>,
}

impl GraphQlResponse {
    /// Split a decoded response body. A body with neither `data` nor `errors`
    /// is not a GraphQL response.
    pub fn from_value(body: Value) -> Result<Self, FrameError> {
        let Value::Object(mut map) = body else {
            return Err(FrameError::EmptyResponse);
        };
        let data = map.remove("data");
        let errors = map.remove("errors").filter(|e| !e.is_null());
        if data.is_none() && errors.is_none() {
            return Err(FrameError::EmptyResponse);
        }
        Ok(GraphQlResponse {
            data: data.unwrap_or(Value::Null),
            errors,
        })
    }
}
