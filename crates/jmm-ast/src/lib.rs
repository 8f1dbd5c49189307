//! jmm Syntax Tree
//!
//! Input contract of the jmm backend: the typed syntax tree, static types,
//! the symbol table, and the decoder for the frontend's generic JSON node
//! format.

pub mod ast;
pub mod builder;
pub mod decode;
pub mod error;
pub mod span;
pub mod symbols;
pub mod types;

pub use ast::{
    BinaryOp, ClassDecl, Expr, ExprKind, Literal, MethodDecl, NodeId, Program, Stmt, StmtKind,
    UnaryOp, Visitor,
};
pub use decode::{decode_program, from_json_bounded, RawNode};
pub use error::DecodeError;
pub use span::Span;
pub use symbols::{Binding, MethodSymbol, Param, Symbol, SymbolTable};
pub use types::Type;
