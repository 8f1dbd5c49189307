//! Recursion depth guard shared by every recursive tree walk

use crate::error::{CompileError, CompileResult};

/// Maximum nesting depth for one method's walk
#[derive(Debug, Clone)]
pub struct DepthLimit {
    max: usize,
    method: String,
}

impl DepthLimit {
    pub fn new(max: usize, method: impl Into<String>) -> Self {
        Self {
            max,
            method: method.into(),
        }
    }

    /// Step one level deeper, failing once the limit is passed
    pub fn descend(&self, depth: usize) -> CompileResult<usize> {
        let next = depth + 1;
        if next > self.max {
            return Err(CompileError::RecursionLimit {
                method: self.method.clone(),
                limit: self.max,
            });
        }
        Ok(next)
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn method(&self) -> &str {
        &self.method
    }
}
