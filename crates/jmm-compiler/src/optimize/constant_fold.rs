//! Constant Folding Optimization
//!
//! Evaluates constant expressions at compile time and applies algebraic
//! identities. The pass builds a new tree; the driver decides whether
//! anything changed by comparing it with the old one.
//!
//! A binary node is left alone when either operand reads a loop-sensitive
//! variable, so code regenerated for loop counters stays per-iteration.

use super::loop_vars::LoopVars;
use crate::depth::DepthLimit;
use crate::error::CompileResult;
use jmm_ast::ast::{BinaryOp, Expr, ExprKind, Literal, MethodDecl, Stmt, StmtKind, UnaryOp};

/// Constant folding optimizer
pub struct ConstantFolder<'a> {
    loop_vars: &'a LoopVars,
    limit: &'a DepthLimit,
    /// Number of nodes rewritten
    folded: usize,
}

impl<'a> ConstantFolder<'a> {
    pub fn new(loop_vars: &'a LoopVars, limit: &'a DepthLimit) -> Self {
        Self {
            loop_vars,
            limit,
            folded: 0,
        }
    }

    pub fn folded(&self) -> usize {
        self.folded
    }

    /// Fold a whole method body
    pub fn fold_method(&mut self, method: &MethodDecl) -> CompileResult<MethodDecl> {
        Ok(MethodDecl {
            name: method.name.clone(),
            body: self.fold_stmts(&method.body, 0)?,
            span: method.span,
        })
    }

    fn fold_stmts(&mut self, stmts: &[Stmt], depth: usize) -> CompileResult<Vec<Stmt>> {
        let mut folded = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            if let Some(stmt) = self.fold_stmt(stmt, depth)? {
                folded.push(stmt);
            }
        }
        Ok(folded)
    }

    /// Fold a statement nested directly under another one, where removal
    /// leaves an empty block behind
    fn fold_nested(&mut self, stmt: &Stmt, depth: usize) -> CompileResult<Stmt> {
        Ok(self
            .fold_stmt(stmt, depth)?
            .unwrap_or_else(|| Stmt::empty(stmt.span)))
    }

    /// Fold a statement; `None` means it was removed
    fn fold_stmt(&mut self, stmt: &Stmt, depth: usize) -> CompileResult<Option<Stmt>> {
        let depth = self.limit.descend(depth)?;
        let kind = match &stmt.kind {
            StmtKind::Block(stmts) => StmtKind::Block(self.fold_stmts(stmts, depth)?),
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let cond = self.fold_expr(cond, depth)?;
                match cond.as_literal() {
                    Some(Literal::Bool(true)) => {
                        self.folded += 1;
                        return self.fold_stmt(then_branch, depth);
                    }
                    Some(Literal::Bool(false)) => {
                        self.folded += 1;
                        return match else_branch {
                            Some(else_branch) => self.fold_stmt(else_branch, depth),
                            None => Ok(None),
                        };
                    }
                    _ => {}
                }
                let then_branch = Box::new(self.fold_nested(then_branch, depth)?);
                let else_branch = match else_branch {
                    Some(else_branch) => Some(Box::new(self.fold_nested(else_branch, depth)?)),
                    None => None,
                };
                StmtKind::If {
                    cond,
                    then_branch,
                    else_branch,
                }
            }
            StmtKind::While { cond, body } => {
                let cond = self.fold_expr(cond, depth)?;
                // `while (true)` stays a loop
                if cond.as_literal() == Some(Literal::Bool(false)) {
                    self.folded += 1;
                    return Ok(None);
                }
                StmtKind::While {
                    cond,
                    body: Box::new(self.fold_nested(body, depth)?),
                }
            }
            StmtKind::Assign { target, value } => StmtKind::Assign {
                target: target.clone(),
                value: self.fold_expr(value, depth)?,
            },
            StmtKind::IndexAssign {
                target,
                index,
                value,
            } => StmtKind::IndexAssign {
                target: target.clone(),
                index: self.fold_expr(index, depth)?,
                value: self.fold_expr(value, depth)?,
            },
            StmtKind::Expr(expr) => StmtKind::Expr(self.fold_expr(expr, depth)?),
            StmtKind::Return(value) => StmtKind::Return(match value {
                Some(value) => Some(self.fold_expr(value, depth)?),
                None => None,
            }),
        };
        Ok(Some(Stmt::new(kind, stmt.span)))
    }

    /// Fold an expression bottom-up
    pub fn fold_expr(&mut self, expr: &Expr, depth: usize) -> CompileResult<Expr> {
        let depth = self.limit.descend(depth)?;
        let mut folded = expr.clone();
        for child in folded.children_mut() {
            *child = self.fold_expr(child, depth)?;
        }
        if matches!(folded.kind, ExprKind::Binary { .. }) {
            return self.fold_binary(folded);
        }
        let unary = match &folded.kind {
            ExprKind::Unary { op, operand } => operand.as_literal().and_then(|lit| eval_unary(*op, lit)),
            _ => None,
        };
        Ok(match unary {
            Some(lit) => {
                self.folded += 1;
                folded.replaced_by_literal(lit)
            }
            None => folded,
        })
    }

    fn fold_binary(&mut self, expr: Expr) -> CompileResult<Expr> {
        let rewritten = match &expr.kind {
            ExprKind::Binary { op, left, right } => {
                if self.loop_vars.touches(left, self.limit)?
                    || self.loop_vars.touches(right, self.limit)?
                {
                    log::trace!("not folding '{}' over a loop-sensitive operand", op);
                    None
                } else {
                    match (left.as_literal(), right.as_literal()) {
                        (Some(l), Some(r)) => {
                            eval_binary(*op, l, r).map(|lit| expr.replaced_by_literal(lit))
                        }
                        (Some(l), None) => literal_left_identity(&expr, *op, l, right),
                        (None, Some(r)) => literal_right_identity(&expr, *op, left, r),
                        (None, None) => None,
                    }
                }
            }
            _ => None,
        };
        Ok(match rewritten {
            Some(rewritten) => {
                self.folded += 1;
                rewritten
            }
            None => expr,
        })
    }
}

/// Identities with a literal left operand: `0+x`, `1*x`, `0*x`, `0-x`,
/// `true&&x`, `false&&x`, `false||x`, `true||x`
fn literal_left_identity(expr: &Expr, op: BinaryOp, lit: Literal, other: &Expr) -> Option<Expr> {
    match (op, lit) {
        (BinaryOp::Add, Literal::Int(0))
        | (BinaryOp::Mul, Literal::Int(1))
        | (BinaryOp::And, Literal::Bool(true))
        | (BinaryOp::Or, Literal::Bool(false)) => Some(other.clone()),
        (BinaryOp::Mul, Literal::Int(0)) if !other.has_side_effects() => {
            Some(expr.replaced_by_literal(Literal::Int(0)))
        }
        (BinaryOp::Sub, Literal::Int(0)) => Some(Expr {
            id: expr.id,
            span: expr.span,
            ty: None,
            kind: ExprKind::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(other.clone()),
            },
        }),
        // the right operand would never be evaluated
        (BinaryOp::And, Literal::Bool(false)) => Some(expr.replaced_by_literal(Literal::Bool(false))),
        (BinaryOp::Or, Literal::Bool(true)) => Some(expr.replaced_by_literal(Literal::Bool(true))),
        _ => None,
    }
}

/// Identities with a literal right operand: `x+0`, `x-0`, `x*1`, `x*0`,
/// `x&&true`, `x&&false`, `x||false`, `x||true`
fn literal_right_identity(expr: &Expr, op: BinaryOp, other: &Expr, lit: Literal) -> Option<Expr> {
    match (op, lit) {
        (BinaryOp::Add, Literal::Int(0))
        | (BinaryOp::Sub, Literal::Int(0))
        | (BinaryOp::Mul, Literal::Int(1))
        | (BinaryOp::And, Literal::Bool(true))
        | (BinaryOp::Or, Literal::Bool(false)) => Some(other.clone()),
        (BinaryOp::Mul, Literal::Int(0)) | (BinaryOp::And, Literal::Bool(false)) | (BinaryOp::Or, Literal::Bool(true))
            if !other.has_side_effects() =>
        {
            Some(expr.replaced_by_literal(lit))
        }
        _ => None,
    }
}

/// Evaluate a binary operation on literals
///
/// Integer arithmetic wraps like the target's 32-bit integers. Division and
/// remainder by zero are left for run time.
pub fn eval_binary(op: BinaryOp, left: Literal, right: Literal) -> Option<Literal> {
    use Literal::{Bool, Int};

    match (op, left, right) {
        // Integer arithmetic
        (BinaryOp::Add, Int(a), Int(b)) => Some(Int(a.wrapping_add(b))),
        (BinaryOp::Sub, Int(a), Int(b)) => Some(Int(a.wrapping_sub(b))),
        (BinaryOp::Mul, Int(a), Int(b)) => Some(Int(a.wrapping_mul(b))),
        (BinaryOp::Div, Int(a), Int(b)) if b != 0 => Some(Int(a.wrapping_div(b))),
        (BinaryOp::Mod, Int(a), Int(b)) if b != 0 => Some(Int(a.wrapping_rem(b))),

        // Integer comparisons
        (BinaryOp::Less, Int(a), Int(b)) => Some(Bool(a < b)),
        (BinaryOp::LessEqual, Int(a), Int(b)) => Some(Bool(a <= b)),
        (BinaryOp::Greater, Int(a), Int(b)) => Some(Bool(a > b)),
        (BinaryOp::GreaterEqual, Int(a), Int(b)) => Some(Bool(a >= b)),

        // Equality on values of the same kind
        (BinaryOp::Equal, Int(a), Int(b)) => Some(Bool(a == b)),
        (BinaryOp::Equal, Bool(a), Bool(b)) => Some(Bool(a == b)),
        (BinaryOp::NotEqual, Int(a), Int(b)) => Some(Bool(a != b)),
        (BinaryOp::NotEqual, Bool(a), Bool(b)) => Some(Bool(a != b)),

        // Boolean operations
        (BinaryOp::And, Bool(a), Bool(b)) => Some(Bool(a && b)),
        (BinaryOp::Or, Bool(a), Bool(b)) => Some(Bool(a || b)),

        _ => None,
    }
}

/// Evaluate a unary operation on a literal
pub fn eval_unary(op: UnaryOp, operand: Literal) -> Option<Literal> {
    match (op, operand) {
        (UnaryOp::Neg, Literal::Int(v)) => Some(Literal::Int(v.wrapping_neg())),
        (UnaryOp::Not, Literal::Bool(v)) => Some(Literal::Bool(!v)),
        _ => None,
    }
}
