//! Label allocation
//!
//! Counters are kept per (method, structure kind), so `if` and `while`
//! labels never share a sequence and numbering is reproducible for a given
//! tree. A control structure reserves one index and derives all of its
//! labels from it, so nested structures can never collide.

use crate::error::{CompileError, CompileResult};
use crate::ir::{Label, LabelKind};
use rustc_hash::FxHashMap;

/// Hands out label indices for the method being lowered
#[derive(Debug)]
pub struct LabelManager {
    counters: FxHashMap<(String, LabelKind), u32>,
    current_method: String,
    /// Largest index that may be handed out
    limit: u32,
}

impl LabelManager {
    pub fn new() -> Self {
        Self::with_limit(u32::MAX)
    }

    /// Create a manager that fails after `limit + 1` labels of one kind
    pub fn with_limit(limit: u32) -> Self {
        Self {
            counters: FxHashMap::default(),
            current_method: String::new(),
            limit,
        }
    }

    /// Switch to another method; its counters start at zero
    pub fn set_current_method(&mut self, name: &str) {
        self.current_method = name.to_string();
    }

    pub fn current_method(&self) -> &str {
        &self.current_method
    }

    /// Forget every counter
    pub fn reset(&mut self) {
        self.counters.clear();
    }

    /// Take the next index for a structure kind in the current method
    pub fn next_label(&mut self, kind: LabelKind) -> CompileResult<u32> {
        let exhausted = || CompileError::LabelsExhausted {
            method: self.current_method.clone(),
            kind: kind.prefix(),
        };
        let index = self
            .counters
            .get(&(self.current_method.clone(), kind))
            .copied()
            .unwrap_or(0);
        if index > self.limit {
            return Err(exhausted());
        }
        let next = index.checked_add(1).ok_or_else(exhausted)?;
        self.counters.insert((self.current_method.clone(), kind), next);
        Ok(index)
    }

    /// Reserve the labels of one control structure
    pub fn reserve(&mut self, kind: LabelKind) -> CompileResult<LabelBlock> {
        let index = self.next_label(kind)?;
        Ok(LabelBlock { kind, index })
    }
}

impl Default for LabelManager {
    fn default() -> Self {
        Self::new()
    }
}

/// The labels of one control structure, sharing a single index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelBlock {
    kind: LabelKind,
    index: u32,
}

impl LabelBlock {
    fn label(&self, role: &'static str) -> Label {
        Label {
            kind: self.kind,
            role,
            index: self.index,
        }
    }

    /// `if_then_N`
    pub fn then_label(&self) -> Label {
        self.label("then")
    }

    /// `if_else_N`
    pub fn else_label(&self) -> Label {
        self.label("else")
    }

    /// `while_cond_N`
    pub fn cond_label(&self) -> Label {
        self.label("cond")
    }

    /// `and_rhs_N`
    pub fn rhs_label(&self) -> Label {
        self.label("rhs")
    }

    /// `or_true_N`
    pub fn true_label(&self) -> Label {
        self.label("true")
    }

    /// Reconvergence point of every structure
    pub fn end_label(&self) -> Label {
        self.label("end")
    }
}
