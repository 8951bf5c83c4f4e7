use std::ops::Range;
use thiserror::Error;

/// Result type for markup operations
pub type Result<T> = std::result::Result<T, MarkupError>;

/// Errors raised while parsing or editing markup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkupError {
    /// The parser produced no tree
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Tree-sitter refused the grammar
    #[error("Tree-sitter error: {0}")]
    TreeSitterError(String),

    /// Selector text could not be understood
    #[error("Invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// Two edits touch the same bytes
    #[error("Overlapping edits at {first:?} and {second:?}")]
    OverlappingSplices {
        first: Range<usize>,
        second: Range<usize>,
    },

    /// Edit range falls outside the document or splits a character
    #[error("Edit range {0:?} is not valid for this document")]
    InvalidRange(Range<usize>),
}

impl MarkupError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    pub fn selector(selector: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
            reason: reason.into(),
        }
    }
}
