use thiserror::Error;

/// Structural faults that make a requested selection ungrounded.
///
/// Absent or null branches are ordinary data and never produce one of these;
/// they resolve to zero frame occurrences or null-filled columns instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// A declared frame root resolved to a scalar, which cannot anchor a
    /// tabular view.
    #[error("frame '{frame}': root path '{path}' is a scalar and cannot be a frame root")]
    ScalarFrameRoot { frame: String, path: String },

    /// A selection-set path could not be reconciled with the document: the
    /// document holds `found` where the selection expected something else.
    #[error("frame '{frame}': selection path '{path}' does not match the document (found {found})")]
    SelectionMismatch {
        frame: String,
        path: String,
        found: &'static str,
    },

    /// Two declared frames share a name.
    #[error("duplicate frame name '{frame}'")]
    DuplicateFrame { frame: String },

    /// A response body carrying neither `data` nor `errors`.
    #[error("response contains neither data nor errors")]
    EmptyResponse,
}
