//! Constant Propagation Optimization
//!
//! Forward, flow-sensitive substitution of variable reads by literals.
//!
//! One constant environment is carried through each statement list. Branches
//! get their own copies and are merged afterwards; loops drop everything
//! their body assigns. Only method parameters and locals are tracked.

use super::loop_vars::{LoopVars, VarUse};
use crate::depth::DepthLimit;
use crate::error::CompileResult;
use jmm_ast::ast::{BinaryOp, Expr, ExprKind, Literal, MethodDecl, Stmt, StmtKind};
use jmm_ast::{MethodSymbol, SymbolTable};
use rustc_hash::{FxHashMap, FxHashSet};

/// Known literal values at one program point
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstEnv {
    values: FxHashMap<String, Literal>,
}

impl ConstEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Literal> {
        self.values.get(name).copied()
    }

    pub fn set(&mut self, name: impl Into<String>, value: Literal) {
        self.values.insert(name.into(), value);
    }

    pub fn remove(&mut self, name: &str) {
        self.values.remove(name);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Join two branch environments
    ///
    /// A variable survives only if both sides hold the same value. Returns the
    /// merged environment and the names that were dropped, sorted.
    pub fn merge(&self, other: &ConstEnv) -> (ConstEnv, Vec<String>) {
        let mut merged = ConstEnv::new();
        let mut dropped = Vec::new();

        for (name, value) in &self.values {
            if other.values.get(name) == Some(value) {
                merged.values.insert(name.clone(), *value);
            } else {
                dropped.push(name.clone());
            }
        }
        for name in other.values.keys() {
            if !self.values.contains_key(name) {
                dropped.push(name.clone());
            }
        }

        dropped.sort();
        (merged, dropped)
    }
}

/// Constant propagation over one method
pub struct ConstantPropagator<'a> {
    symbols: &'a SymbolTable,
    method: Option<&'a MethodSymbol>,
    loop_vars: &'a LoopVars,
    limit: &'a DepthLimit,
    /// Variables whose value disagreed at some join
    multiply_assigned: FxHashSet<String>,
    /// Number of reads replaced
    replaced: usize,
}

impl<'a> ConstantPropagator<'a> {
    pub fn new(
        symbols: &'a SymbolTable,
        method: Option<&'a MethodSymbol>,
        loop_vars: &'a LoopVars,
        limit: &'a DepthLimit,
    ) -> Self {
        Self {
            symbols,
            method,
            loop_vars,
            limit,
            multiply_assigned: FxHashSet::default(),
            replaced: 0,
        }
    }

    pub fn replaced(&self) -> usize {
        self.replaced
    }

    pub fn is_multiply_assigned(&self, name: &str) -> bool {
        self.multiply_assigned.contains(name)
    }

    /// Propagate constants through a whole method body
    pub fn propagate_method(&mut self, method: &MethodDecl) -> CompileResult<MethodDecl> {
        let mut env = ConstEnv::new();
        Ok(MethodDecl {
            name: method.name.clone(),
            body: self.propagate_stmts(&method.body, &mut env, 0)?,
            span: method.span,
        })
    }

    fn propagate_stmts(&mut self, stmts: &[Stmt], env: &mut ConstEnv, depth: usize) -> CompileResult<Vec<Stmt>> {
        stmts
            .iter()
            .map(|stmt| self.propagate_stmt(stmt, env, depth))
            .collect()
    }

    fn propagate_stmt(&mut self, stmt: &Stmt, env: &mut ConstEnv, depth: usize) -> CompileResult<Stmt> {
        let depth = self.limit.descend(depth)?;
        let kind = match &stmt.kind {
            StmtKind::Block(stmts) => StmtKind::Block(self.propagate_stmts(stmts, env, depth)?),

            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let cond = self.propagate_expr(cond, env, depth)?;

                let mut then_env = env.clone();
                let mut else_env = env.clone();
                self.refine(&cond, &mut then_env, &mut else_env);

                let then_branch = Box::new(self.propagate_stmt(then_branch, &mut then_env, depth)?);
                let else_branch = match else_branch {
                    Some(else_branch) => Some(Box::new(self.propagate_stmt(else_branch, &mut else_env, depth)?)),
                    None => None,
                };

                let (merged, dropped) = then_env.merge(&else_env);
                for name in dropped {
                    log::trace!("'{}' disagrees across branches", name);
                    self.multiply_assigned.insert(name);
                }
                *env = merged;

                StmtKind::If {
                    cond,
                    then_branch,
                    else_branch,
                }
            }

            StmtKind::While { cond, body } => {
                let assigned = VarUse::of_stmt(body, self.limit)?.writes;
                for name in &assigned {
                    env.remove(name);
                }

                let cond = self.propagate_expr(cond, env, depth)?;
                let mut body_env = env.clone();
                let body = Box::new(self.propagate_stmt(body, &mut body_env, depth)?);
                // values set inside the body do not hold after the loop
                StmtKind::While { cond, body }
            }

            StmtKind::Assign { target, value } => {
                let value = self.propagate_expr(value, env, depth)?;
                match self.assigned_value(&value, env) {
                    Some(lit) if self.is_tracked(target) => env.set(target.clone(), lit),
                    _ => env.remove(target),
                }
                StmtKind::Assign {
                    target: target.clone(),
                    value,
                }
            }

            StmtKind::IndexAssign { target, index, value } => {
                let index = self.propagate_expr(index, env, depth)?;
                let value = self.propagate_expr(value, env, depth)?;
                env.remove(target);
                StmtKind::IndexAssign {
                    target: target.clone(),
                    index,
                    value,
                }
            }

            StmtKind::Expr(expr) => StmtKind::Expr(self.propagate_expr(expr, env, depth)?),

            StmtKind::Return(value) => StmtKind::Return(match value {
                Some(value) => Some(self.propagate_expr(value, env, depth)?),
                None => None,
            }),
        };
        Ok(Stmt::new(kind, stmt.span))
    }

    /// Replace substitutable reads inside an expression
    fn propagate_expr(&mut self, expr: &Expr, env: &ConstEnv, depth: usize) -> CompileResult<Expr> {
        let depth = self.limit.descend(depth)?;
        if let ExprKind::Var(name) = &expr.kind {
            if let Some(lit) = self.substitutable(name, env) {
                self.replaced += 1;
                return Ok(expr.replaced_by_literal(lit));
            }
            return Ok(expr.clone());
        }

        let mut propagated = expr.clone();
        for child in propagated.children_mut() {
            *child = self.propagate_expr(child, env, depth)?;
        }
        Ok(propagated)
    }

    /// The literal a read of `name` may be replaced with
    ///
    /// Loop and branch exclusions come first: the environment can still hold
    /// a value recorded before the structure was analyzed.
    fn substitutable(&self, name: &str, env: &ConstEnv) -> Option<Literal> {
        if self.loop_vars.is_sensitive(name) || self.multiply_assigned.contains(name) {
            return None;
        }
        if !self.is_tracked(name) {
            return None;
        }
        env.get(name)
    }

    /// Value recorded for `target := value`
    fn assigned_value(&self, value: &Expr, env: &ConstEnv) -> Option<Literal> {
        match &value.kind {
            ExprKind::Literal(lit) => Some(*lit),
            ExprKind::Var(other) => self.substitutable(other, env),
            _ => None,
        }
    }

    /// Seed branch environments from `v == lit` / `v != lit` conditions
    fn refine(&self, cond: &Expr, then_env: &mut ConstEnv, else_env: &mut ConstEnv) {
        let ExprKind::Binary { op, left, right } = &cond.kind else {
            return;
        };
        let (name, lit) = match (left.as_var(), right.as_literal(), left.as_literal(), right.as_var()) {
            (Some(name), Some(lit), _, _) | (_, _, Some(lit), Some(name)) => (name, lit),
            _ => return,
        };
        if !self.is_tracked(name)
            || self.loop_vars.is_sensitive(name)
            || self.multiply_assigned.contains(name)
        {
            return;
        }
        match op {
            BinaryOp::Equal => then_env.set(name, lit),
            BinaryOp::NotEqual => else_env.set(name, lit),
            _ => {}
        }
    }

    /// Check if a name is a parameter or local of the current method
    fn is_tracked(&self, name: &str) -> bool {
        self.method.is_some()
            && self
                .symbols
                .lookup(self.method, name)
                .is_some_and(|binding| binding.is_method_scoped())
    }
}
