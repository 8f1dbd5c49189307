//! Type resolution errors

use crate::error::CompileError;
use jmm_ast::{Span, Type};
use thiserror::Error;

/// A user-facing type error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    #[error("Type mismatch in {context}: expected {expected}, found '{found}'")]
    TypeMismatch {
        context: String,
        expected: String,
        found: Type,
        span: Span,
    },

    #[error("Cannot index a value of non-array type '{ty}'")]
    NonArrayAccess { ty: Type, span: Span },

    #[error("Array {position} must be 'int', found '{ty}'")]
    IndexNotInt {
        position: &'static str,
        ty: Type,
        span: Span,
    },

    #[error("Operator '{op}' cannot be applied to type '{ty}'")]
    InvalidUnaryOperand { op: String, ty: Type, span: Span },
}

impl SemanticError {
    pub fn span(&self) -> Span {
        match self {
            SemanticError::TypeMismatch { span, .. }
            | SemanticError::NonArrayAccess { span, .. }
            | SemanticError::IndexNotInt { span, .. }
            | SemanticError::InvalidUnaryOperand { span, .. } => *span,
        }
    }
}

/// Why a type could not be produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The program is ill-typed; report it
    Semantic(SemanticError),
    /// Nothing is known about the node; use a conservative default
    Unresolved,
    /// The walk itself failed (recursion limit)
    Fatal(CompileError),
}

impl From<SemanticError> for ResolveError {
    fn from(error: SemanticError) -> Self {
        ResolveError::Semantic(error)
    }
}

impl From<CompileError> for ResolveError {
    fn from(error: CompileError) -> Self {
        ResolveError::Fatal(error)
    }
}
