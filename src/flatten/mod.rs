//! Flattening nested JSON responses into tabular frames.
//!
//! This module holds the extraction/normalization engine: a generic tree
//! walker, the frame extractor that collects annotated sub-trees, the
//! normalizer that flattens a sub-tree into rows by cross-join expansion,
//! and the column namer. The [`executor`] ties them together behind
//! [`Flattener`].

pub mod columns;
pub mod error;
pub mod executor;
pub mod extractor;
pub mod normalize;
pub mod walker;
pub mod writer;

pub use columns::{apply_naming, resolve_names, NamingOptions, NamingStrategy};
pub use error::FrameError;
pub use executor::{FlattenOptions, Flattener, FrameTable};
pub use extractor::extract_frames;
pub use normalize::{normalize, NormalizeOptions, Row};
pub use walker::{walk, JsonVisitor, VisitorAction};
pub use writer::{FrameWriter, SingleWriter};
