//! Statement lowering
//!
//! Structured control flow becomes labels and jumps:
//!
//! ```text
//! if, else-first:              if, then-first:
//!     if (c) goto if_then_N;       if (!c) goto if_else_N;
//!     <else>                       <then>
//!     goto if_end_N;               goto if_end_N;
//! if_then_N:                   if_else_N:
//!     <then>                       <else>
//! if_end_N:                    if_end_N:
//!
//! while:
//! while_cond_N:
//!     if (!c) goto while_end_N;
//!     <body>
//!     goto while_cond_N;
//! while_end_N:
//! ```

use super::context::MethodContext;
use super::expr::Instrs;
use crate::config::BranchLayout;
use crate::error::CompileResult;
use crate::ir::{IrExpr, IrInstr, IrType, LabelKind, Operand};
use jmm_ast::{Binding, Expr, ExprKind, Stmt, StmtKind, UnaryOp};

impl MethodContext<'_> {
    pub fn lower_stmts(&mut self, stmts: &[Stmt], depth: usize) -> CompileResult<Instrs> {
        let mut instrs = Vec::new();
        for stmt in stmts {
            instrs.extend(self.lower_stmt(stmt, depth)?);
        }
        Ok(instrs)
    }

    pub fn lower_stmt(&mut self, stmt: &Stmt, depth: usize) -> CompileResult<Instrs> {
        let depth = self.limit.descend(depth)?;
        match &stmt.kind {
            StmtKind::Block(stmts) => self.lower_stmts(stmts, depth),

            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => match self.layout {
                BranchLayout::ElseFirst => self.lower_if_else_first(cond, then_branch, else_branch.as_deref(), depth),
                BranchLayout::ThenFirst => self.lower_if_then_first(cond, then_branch, else_branch.as_deref(), depth),
            },

            StmtKind::While { cond, body } => self.lower_while(cond, body, depth),

            StmtKind::Assign { target, value } => self.lower_assign(target, value, depth),

            StmtKind::IndexAssign { target, index, value } => self.lower_index_assign(target, index, value, depth),

            StmtKind::Expr(expr) => match &expr.kind {
                ExprKind::Call {
                    receiver,
                    method,
                    args,
                } => {
                    let ret = self.statement_type_of(expr);
                    let (call, mut instrs) = self.lower_call(receiver.as_deref(), method, args, ret, depth)?;
                    instrs.push(IrInstr::Call(call));
                    Ok(instrs)
                }
                _ => {
                    // evaluated for its side effects only
                    let (_, instrs) = self.lower_expr(expr, depth)?;
                    Ok(instrs)
                }
            },

            StmtKind::Return(Some(value)) => {
                let (value, mut instrs) = self.lower_expr(value, depth)?;
                instrs.push(IrInstr::Return {
                    ty: self.return_type(),
                    value: Some(value),
                });
                Ok(instrs)
            }

            StmtKind::Return(None) => Ok(vec![IrInstr::Return {
                ty: IrType::Void,
                value: None,
            }]),
        }
    }

    fn lower_if_else_first(
        &mut self,
        cond: &Expr,
        then_branch: &Stmt,
        else_branch: Option<&Stmt>,
        depth: usize,
    ) -> CompileResult<Instrs> {
        let block = self.labels.reserve(LabelKind::If)?;
        let (cond, mut instrs) = self.lower_expr(cond, depth)?;

        instrs.push(IrInstr::Branch {
            cond: IrExpr::Value(cond),
            target: block.then_label(),
        });
        if let Some(else_branch) = else_branch {
            instrs.extend(self.lower_stmt(else_branch, depth)?);
        }
        instrs.push(IrInstr::Goto(block.end_label()));
        instrs.push(IrInstr::Label(block.then_label()));
        instrs.extend(self.lower_stmt(then_branch, depth)?);
        instrs.push(IrInstr::Label(block.end_label()));
        Ok(instrs)
    }

    fn lower_if_then_first(
        &mut self,
        cond: &Expr,
        then_branch: &Stmt,
        else_branch: Option<&Stmt>,
        depth: usize,
    ) -> CompileResult<Instrs> {
        let block = self.labels.reserve(LabelKind::If)?;
        let (cond, mut instrs) = self.lower_expr(cond, depth)?;

        let skip = if else_branch.is_some() {
            block.else_label()
        } else {
            block.end_label()
        };
        instrs.push(IrInstr::Branch {
            cond: negate(cond),
            target: skip,
        });
        instrs.extend(self.lower_stmt(then_branch, depth)?);
        if let Some(else_branch) = else_branch {
            instrs.push(IrInstr::Goto(block.end_label()));
            instrs.push(IrInstr::Label(block.else_label()));
            instrs.extend(self.lower_stmt(else_branch, depth)?);
        }
        instrs.push(IrInstr::Label(block.end_label()));
        Ok(instrs)
    }

    fn lower_while(&mut self, cond: &Expr, body: &Stmt, depth: usize) -> CompileResult<Instrs> {
        let block = self.labels.reserve(LabelKind::While)?;
        let mut instrs = vec![IrInstr::Label(block.cond_label())];

        let (cond, cond_instrs) = self.lower_expr(cond, depth)?;
        instrs.extend(cond_instrs);
        instrs.push(IrInstr::Branch {
            cond: negate(cond),
            target: block.end_label(),
        });
        instrs.extend(self.lower_stmt(body, depth)?);
        instrs.push(IrInstr::Goto(block.cond_label()));
        instrs.push(IrInstr::Label(block.end_label()));
        Ok(instrs)
    }

    fn lower_assign(&mut self, target: &str, value: &Expr, depth: usize) -> CompileResult<Instrs> {
        let field_ty = match self.binding(target) {
            Some(Binding::Field(field)) => Some(IrType::from(&field.ty)),
            _ => None,
        };
        if let Some(ty) = field_ty {
            let (value, mut instrs) = self.lower_expr(value, depth)?;
            instrs.push(IrInstr::PutField {
                object: self.this(),
                field: target.to_string(),
                ty,
                value,
            });
            return Ok(instrs);
        }

        let (value, mut instrs) = self.lower_value(value, depth)?;
        let ty = self.variable_type(target).unwrap_or_else(|| {
            log::debug!("assignment to undeclared '{}'", target);
            value.ty()
        });
        instrs.push(IrInstr::assign(target, ty, value));
        Ok(instrs)
    }

    fn lower_index_assign(&mut self, target: &str, index: &Expr, value: &Expr, depth: usize) -> CompileResult<Instrs> {
        let array_ty = self
            .variable_type(target)
            .unwrap_or_else(|| IrType::array_of(IrType::I32));
        let elem_ty = array_ty.element().cloned().unwrap_or(IrType::I32);

        let is_field = matches!(self.binding(target), Some(Binding::Field(_)));

        let mut instrs = Vec::new();
        let array = match is_field {
            true => {
                let temp = self.fresh_temp();
                instrs.push(IrInstr::assign(
                    temp.clone(),
                    array_ty.clone(),
                    IrExpr::GetField {
                        object: self.this(),
                        field: target.to_string(),
                        ty: array_ty.clone(),
                    },
                ));
                Operand::var(temp, array_ty)
            }
            false => Operand::var(target, array_ty),
        };

        let (index, index_instrs) = self.lower_expr(index, depth)?;
        instrs.extend(index_instrs);
        let (value, value_instrs) = self.lower_expr(value, depth)?;
        instrs.extend(value_instrs);
        instrs.push(IrInstr::ArrayStore {
            array,
            index,
            ty: elem_ty,
            value,
        });
        Ok(instrs)
    }
}

/// `!.bool c`
fn negate(cond: Operand) -> IrExpr {
    IrExpr::Unary {
        op: UnaryOp::Not,
        operand: cond,
        ty: IrType::Bool,
    }
}
