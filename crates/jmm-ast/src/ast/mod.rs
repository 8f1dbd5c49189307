//! Typed syntax tree
//!
//! The frontend hands the backend a generic node tree (see [`crate::decode`]);
//! it is converted once into these closed enums so every pass can match
//! exhaustively on node kinds.

mod expression;
mod statement;
mod visitor;

pub use expression::*;
pub use statement::*;
pub use visitor::*;

use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an expression node, unique within a program after
/// [`Program::renumber`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Id carried by nodes that have not been numbered yet
    pub const UNASSIGNED: NodeId = NodeId(u32::MAX);

    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A compilation unit: one class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub class: ClassDecl,
}

/// Class declaration (only method bodies live in the tree; the signature
/// information is in the symbol table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    pub methods: Vec<MethodDecl>,
    pub span: Span,
}

/// Method declaration with its body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl Program {
    pub fn new(class: ClassDecl) -> Self {
        let mut program = Self { class };
        program.renumber();
        program
    }

    /// Look up a method body by name
    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.class.methods.iter().find(|m| m.name == name)
    }

    /// Assign fresh, sequential ids to every expression node
    ///
    /// Ids follow a pre-order walk of the methods in declaration order, so
    /// the numbering is deterministic for a given tree.
    pub fn renumber(&mut self) {
        let mut next = 0u32;
        for method in &mut self.class.methods {
            for stmt in &mut method.body {
                renumber_stmt(stmt, &mut next);
            }
        }
    }

    /// Total number of expression nodes
    pub fn expr_count(&self) -> usize {
        struct Counter(usize);
        impl Visitor for Counter {
            fn visit_expr(&mut self, expr: &Expr) {
                self.0 += 1;
                walk_expr(self, expr);
            }
        }
        let mut counter = Counter(0);
        for method in &self.class.methods {
            counter.visit_method(method);
        }
        counter.0
    }
}

fn renumber_stmt(stmt: &mut Stmt, next: &mut u32) {
    match &mut stmt.kind {
        StmtKind::Block(stmts) => {
            for s in stmts {
                renumber_stmt(s, next);
            }
        }
        StmtKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            renumber_expr(cond, next);
            renumber_stmt(then_branch, next);
            if let Some(else_branch) = else_branch {
                renumber_stmt(else_branch, next);
            }
        }
        StmtKind::While { cond, body } => {
            renumber_expr(cond, next);
            renumber_stmt(body, next);
        }
        StmtKind::Assign { value, .. } => renumber_expr(value, next),
        StmtKind::IndexAssign { index, value, .. } => {
            renumber_expr(index, next);
            renumber_expr(value, next);
        }
        StmtKind::Expr(expr) => renumber_expr(expr, next),
        StmtKind::Return(value) => {
            if let Some(value) = value {
                renumber_expr(value, next);
            }
        }
    }
}

fn renumber_expr(expr: &mut Expr, next: &mut u32) {
    expr.id = NodeId(*next);
    *next += 1;
    for child in expr.children_mut() {
        renumber_expr(child, next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::*;

    #[test]
    fn test_renumber_assigns_unique_ids() {
        let program = program(
            "Foo",
            vec![method(
                "bar",
                vec![
                    assign("x", binary(BinaryOp::Add, int(1), int(2))),
                    ret(Some(var("x"))),
                ],
            )],
        );

        let body = &program.method("bar").unwrap().body;
        let StmtKind::Assign { value, .. } = &body[0].kind else {
            panic!("expected assignment");
        };
        assert_eq!(value.id, NodeId(0));
        let ExprKind::Binary { left, right, .. } = &value.kind else {
            panic!("expected binary");
        };
        assert_eq!(left.id, NodeId(1));
        assert_eq!(right.id, NodeId(2));
        assert_eq!(program.expr_count(), 4);
    }
}
