//! Error type for the core model.
//!
//! Everything here is an invariant violation: a caller asked the element tree
//! to do something its shape does not allow. Missing geometry is not an
//! error; those lookups return `Option`.

use thiserror::Error;

pub type CoreResult<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("invalid element path `{input}`: {reason}")]
    InvalidElementPath { input: String, reason: String },

    #[error("invalid CSS length `{0}`")]
    InvalidCssLength(String),

    #[error("did not find element to transform at {0}")]
    ElementNotFound(String),

    #[error("target parent for child element insertion doesn't support children")]
    ParentDoesNotSupportChildren,

    #[error("target parent for conditional insertion is not a conditional expression")]
    ParentNotConditional,

    #[error("attempting to insert an empty array of elements")]
    EmptyInsertion,

    #[error("conditional slots only support a single child")]
    ConditionalSlotTakesSingleChild,

    #[error("attempting to wrap a `null` with a fragment")]
    WrapNullInFragment,

    #[error(
        "rearrange children: target parent's children count ({existing}) does not match input length ({requested})"
    )]
    RearrangeCountMismatch { existing: usize, requested: usize },

    #[error("rearrange children: no child with uid {0}")]
    RearrangeMissingChild(String),

    #[error("cannot set attribute `{0}`: an enclosing value is not an object literal")]
    AttributeNotSettable(String),
}
