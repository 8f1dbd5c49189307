//! Loop-sensitive variable analysis
//!
//! A variable read in a loop condition or written anywhere in a loop body
//! may change between iterations. Folding and propagation never replace such
//! a variable with a literal, anywhere in the method.

use crate::depth::DepthLimit;
use crate::error::{CompileError, CompileResult};
use jmm_ast::ast::{walk_expr, walk_stmt, Expr, ExprKind, MethodDecl, Stmt, StmtKind, Visitor};
use rustc_hash::FxHashSet;

/// Variables read and written by a subtree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarUse {
    pub reads: FxHashSet<String>,
    pub writes: FxHashSet<String>,
}

impl VarUse {
    pub fn of_expr(expr: &Expr, limit: &DepthLimit) -> CompileResult<Self> {
        let mut collector = UseCollector::new(limit);
        collector.visit_expr(expr);
        collector.finish()
    }

    pub fn of_stmt(stmt: &Stmt, limit: &DepthLimit) -> CompileResult<Self> {
        let mut collector = UseCollector::new(limit);
        collector.visit_stmt(stmt);
        collector.finish()
    }
}

struct UseCollector<'l> {
    uses: VarUse,
    limit: &'l DepthLimit,
    depth: usize,
    error: Option<CompileError>,
}

impl<'l> UseCollector<'l> {
    fn new(limit: &'l DepthLimit) -> Self {
        Self {
            uses: VarUse::default(),
            limit,
            depth: 0,
            error: None,
        }
    }

    fn enter(&mut self) -> bool {
        if self.error.is_some() {
            return false;
        }
        match self.limit.descend(self.depth) {
            Ok(depth) => {
                self.depth = depth;
                true
            }
            Err(error) => {
                self.error = Some(error);
                false
            }
        }
    }

    fn finish(self) -> CompileResult<VarUse> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.uses),
        }
    }
}

impl Visitor for UseCollector<'_> {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        if self.enter() {
            walk_stmt(self, stmt);
            self.depth -= 1;
        }
    }

    fn visit_expr(&mut self, expr: &Expr) {
        if self.enter() {
            if let ExprKind::Var(name) = &expr.kind {
                self.uses.reads.insert(name.clone());
            }
            walk_expr(self, expr);
            self.depth -= 1;
        }
    }

    fn visit_assign_target(&mut self, name: &str) {
        self.uses.writes.insert(name.to_string());
    }
}

/// Loop-sensitive variables of one method
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopVars {
    /// Variables read by some loop condition
    condition: FxHashSet<String>,
    /// Variables written inside some loop body
    assigned: FxHashSet<String>,
}

impl LoopVars {
    /// Scan every `while` of a method, nested ones included
    pub fn collect(method: &MethodDecl, limit: &DepthLimit) -> CompileResult<Self> {
        let mut vars = LoopVars::default();
        for stmt in &method.body {
            vars.scan(stmt, limit, 0)?;
        }
        Ok(vars)
    }

    fn scan(&mut self, stmt: &Stmt, limit: &DepthLimit, depth: usize) -> CompileResult<()> {
        let depth = limit.descend(depth)?;
        match &stmt.kind {
            StmtKind::Block(stmts) => {
                for stmt in stmts {
                    self.scan(stmt, limit, depth)?;
                }
            }
            StmtKind::If {
                then_branch,
                else_branch,
                ..
            } => {
                self.scan(then_branch, limit, depth)?;
                if let Some(else_branch) = else_branch {
                    self.scan(else_branch, limit, depth)?;
                }
            }
            StmtKind::While { cond, body } => {
                self.condition.extend(VarUse::of_expr(cond, limit)?.reads);
                self.assigned.extend(VarUse::of_stmt(body, limit)?.writes);
                self.scan(body, limit, depth)?;
            }
            StmtKind::Assign { .. }
            | StmtKind::IndexAssign { .. }
            | StmtKind::Expr(_)
            | StmtKind::Return(_) => {}
        }
        Ok(())
    }

    /// Check if a variable is read by a loop condition or written in a loop
    pub fn is_sensitive(&self, name: &str) -> bool {
        self.condition.contains(name) || self.assigned.contains(name)
    }

    /// Check if a variable is both tested by a loop and written in one
    pub fn is_modified(&self, name: &str) -> bool {
        self.condition.contains(name) && self.assigned.contains(name)
    }

    /// Check if an expression reads any loop-sensitive variable
    pub fn touches(&self, expr: &Expr, limit: &DepthLimit) -> CompileResult<bool> {
        if self.is_empty() {
            return Ok(false);
        }
        Ok(VarUse::of_expr(expr, limit)?
            .reads
            .iter()
            .any(|name| self.is_sensitive(name)))
    }

    pub fn is_empty(&self) -> bool {
        self.condition.is_empty() && self.assigned.is_empty()
    }
}
