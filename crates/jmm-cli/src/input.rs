//! Input document loading
//!
//! The frontend hands over one JSON document:
//!
//! ```json
//! { "tree": { "kind": "Program", "children": [...] }, "symbols": { "class_name": "Foo", ... } }
//! ```

use anyhow::Context;
use jmm_ast::{decode_program, from_json_bounded, DecodeError, Program, RawNode, SymbolTable};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct InputDocument {
    pub tree: RawNode,
    pub symbols: SymbolTable,
}

/// A decoded compilation unit
pub struct Unit {
    pub program: Program,
    pub symbols: SymbolTable,
    pub decode_errors: Vec<DecodeError>,
}

impl InputDocument {
    /// Load a document whose tree may be up to `max_depth` levels deep
    pub fn from_file(path: &Path, max_depth: usize) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        from_json_bounded(&text, max_depth).with_context(|| format!("Invalid input document {}", path.display()))
    }

    pub fn decode(self) -> Unit {
        let (program, decode_errors) = decode_program(&self.tree);
        log::debug!(
            "decoded '{}': {} expressions, {} structural errors",
            program.class.name,
            program.expr_count(),
            decode_errors.len()
        );
        Unit {
            program,
            symbols: self.symbols,
            decode_errors,
        }
    }
}
