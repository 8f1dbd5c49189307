//! Statement nodes

use super::Expr;
use crate::span::Span;
use serde::{Deserialize, Serialize};

/// Statement (does not produce a value)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub span: Span,
    pub kind: StmtKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    /// Block statement: { ... }
    Block(Vec<Stmt>),

    /// If statement: if (cond) then else other
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// While loop: while (cond) body
    While { cond: Expr, body: Box<Stmt> },

    /// Assignment to a named variable or field: x = value
    Assign { target: String, value: Expr },

    /// Assignment to an array element: a[index] = value
    IndexAssign {
        target: String,
        index: Expr,
        value: Expr,
    },

    /// Expression evaluated for its side effects
    Expr(Expr),

    /// Return statement
    Return(Option<Expr>),
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { span, kind }
    }

    /// Empty block used where a statement is removed
    pub fn empty(span: Span) -> Self {
        Self::new(StmtKind::Block(Vec::new()), span)
    }

    /// Check whether control can never fall through the end of this
    /// statement
    pub fn always_returns(&self) -> bool {
        match &self.kind {
            StmtKind::Return(_) => true,
            StmtKind::Block(stmts) => stmts.last().is_some_and(Stmt::always_returns),
            StmtKind::If {
                then_branch,
                else_branch: Some(else_branch),
                ..
            } => then_branch.always_returns() && else_branch.always_returns(),
            _ => false,
        }
    }
}
