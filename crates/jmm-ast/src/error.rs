//! Structural errors found while decoding the frontend's node tree

use crate::span::Span;
use thiserror::Error;

/// A structural problem in the generic node tree
///
/// The decoder reports these and skips the offending node, so one malformed
/// statement does not hide problems in the rest of the method.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("{kind} node is missing its {child} child")]
    MissingChild {
        kind: String,
        child: &'static str,
        span: Span,
    },

    #[error("Unknown node kind '{kind}'")]
    UnknownKind { kind: String, span: Span },

    #[error("Invalid attribute '{attribute}' on {kind} node: {reason}")]
    BadAttribute {
        kind: String,
        attribute: &'static str,
        reason: String,
        span: Span,
    },
}

impl DecodeError {
    /// Source position of the offending node
    pub fn span(&self) -> Span {
        match self {
            DecodeError::MissingChild { span, .. }
            | DecodeError::UnknownKind { span, .. }
            | DecodeError::BadAttribute { span, .. } => *span,
        }
    }

    /// Stable diagnostic code
    pub fn code(&self) -> &'static str {
        match self {
            DecodeError::MissingChild { .. } => "E1001",
            DecodeError::UnknownKind { .. } => "E1002",
            DecodeError::BadAttribute { .. } => "E1003",
        }
    }
}
