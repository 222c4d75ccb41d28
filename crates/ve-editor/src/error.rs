//! Error type for the editor pipeline.

use thiserror::Error;
use ve_core::CoreError;

pub type EditorResult<T> = std::result::Result<T, EditorError>;

#[derive(Debug, Error)]
pub enum EditorError {
    /// An element-tree invariant was violated while applying a command.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("running {actions} resulted in duplicate UIDs {duplicates}")]
    DuplicateUids { actions: String, duplicates: String },

    #[error("invalid editor config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("failed to encode persistent model: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
}
