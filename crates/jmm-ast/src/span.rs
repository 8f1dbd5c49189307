//! Source positions

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in the source file (1-based line and column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Line number, starting at 1
    pub line: u32,
    /// Column number, starting at 1
    pub column: u32,
}

impl Span {
    /// Create a new span
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Span used for nodes synthesized by the backend itself
    pub fn synthetic() -> Self {
        Self::default()
    }

    /// Check whether this span points into real source
    pub fn is_synthetic(&self) -> bool {
        self.line == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_display() {
        assert_eq!(format!("{}", Span::new(3, 14)), "3:14");
    }

    #[test]
    fn test_synthetic_span() {
        assert!(Span::synthetic().is_synthetic());
        assert!(!Span::new(1, 1).is_synthetic());
    }
}
