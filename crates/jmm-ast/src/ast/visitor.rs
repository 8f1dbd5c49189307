//! AST visitor pattern for traversing the syntax tree
//!
//! Each visit method has a default implementation that calls the
//! corresponding walk function, so an implementor only overrides the nodes
//! it cares about.
//!
//! # Example
//!
//! ```rust
//! use jmm_ast::ast::*;
//!
//! struct CountVars {
//!     count: usize,
//! }
//!
//! impl Visitor for CountVars {
//!     fn visit_expr(&mut self, expr: &Expr) {
//!         if let ExprKind::Var(_) = expr.kind {
//!             self.count += 1;
//!         }
//!         walk_expr(self, expr);
//!     }
//! }
//! ```

use super::*;

/// AST visitor trait
pub trait Visitor: Sized {
    fn visit_method(&mut self, method: &MethodDecl) {
        walk_method(self, method);
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    /// Called for the target of `x = ...` and `x[i] = ...`
    fn visit_assign_target(&mut self, _name: &str) {}
}

pub fn walk_method<V: Visitor>(visitor: &mut V, method: &MethodDecl) {
    for stmt in &method.body {
        visitor.visit_stmt(stmt);
    }
}

pub fn walk_stmt<V: Visitor>(visitor: &mut V, stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::Block(stmts) => {
            for stmt in stmts {
                visitor.visit_stmt(stmt);
            }
        }
        StmtKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            visitor.visit_expr(cond);
            visitor.visit_stmt(then_branch);
            if let Some(else_branch) = else_branch {
                visitor.visit_stmt(else_branch);
            }
        }
        StmtKind::While { cond, body } => {
            visitor.visit_expr(cond);
            visitor.visit_stmt(body);
        }
        StmtKind::Assign { target, value } => {
            visitor.visit_expr(value);
            visitor.visit_assign_target(target);
        }
        StmtKind::IndexAssign {
            target,
            index,
            value,
        } => {
            visitor.visit_expr(index);
            visitor.visit_expr(value);
            visitor.visit_assign_target(target);
        }
        StmtKind::Expr(expr) => visitor.visit_expr(expr),
        StmtKind::Return(value) => {
            if let Some(value) = value {
                visitor.visit_expr(value);
            }
        }
    }
}

pub fn walk_expr<V: Visitor>(visitor: &mut V, expr: &Expr) {
    for child in expr.children() {
        visitor.visit_expr(child);
    }
}
