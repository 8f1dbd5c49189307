//! Compilation errors
//!
//! These abort the compilation unit. User-facing type errors are not
//! reported here but collected as diagnostics (see [`crate::diagnostic`]).

use thiserror::Error;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("Recursion limit of {limit} exceeded in method '{method}'")]
    RecursionLimit { method: String, limit: usize },

    #[error("Label counter exhausted for '{kind}' labels in method '{method}'")]
    LabelsExhausted { method: String, kind: &'static str },

    #[error("Optimizer did not reach a fixpoint after {iterations} iterations")]
    FixpointDiverged { iterations: usize },
}
