//! Expression lowering
//!
//! Operands are evaluated left to right and their instructions are
//! concatenated in that order before the instruction of the expression
//! itself.

use super::context::MethodContext;
use super::dispatch::{self, Dispatch};
use crate::error::CompileResult;
use crate::ir::{InvokeKind, IrExpr, IrInstr, IrType, LabelKind, Operand};
use jmm_ast::{BinaryOp, Binding, Expr, ExprKind, Type, UnaryOp};

/// Instructions of a lowered subexpression
pub type Instrs = Vec<IrInstr>;

impl MethodContext<'_> {
    /// Lower an expression to an operand
    ///
    /// Anything that is not already a plain operand is computed into a fresh
    /// temporary.
    pub fn lower_expr(&mut self, expr: &Expr, depth: usize) -> CompileResult<(Operand, Instrs)> {
        let (value, mut instrs) = self.lower_value(expr, depth)?;
        match value {
            IrExpr::Value(operand) => Ok((operand, instrs)),
            value => {
                let ty = value.ty();
                let temp = self.fresh_temp();
                instrs.push(IrInstr::assign(temp.clone(), ty.clone(), value));
                Ok((Operand::var(temp, ty), instrs))
            }
        }
    }

    /// Lower an expression to a right-hand side
    ///
    /// The result can be stored directly by an assignment, without an extra
    /// temporary.
    pub fn lower_value(&mut self, expr: &Expr, depth: usize) -> CompileResult<(IrExpr, Instrs)> {
        let depth = self.limit.descend(depth)?;
        match &expr.kind {
            ExprKind::Literal(lit) => Ok((IrExpr::Value((*lit).into()), Vec::new())),

            ExprKind::Var(name) => Ok((self.lower_name(expr, name), Vec::new())),

            ExprKind::This => Ok((IrExpr::Value(self.this()), Vec::new())),

            ExprKind::Binary { op, left, right } if op.is_logical() => {
                let (result, instrs) = self.lower_short_circuit(*op, left, right, depth)?;
                Ok((IrExpr::Value(result), instrs))
            }

            ExprKind::Binary { op, left, right } => {
                let (left, mut instrs) = self.lower_expr(left, depth)?;
                let (right, right_instrs) = self.lower_expr(right, depth)?;
                instrs.extend(right_instrs);
                let ty = if op.is_arithmetic() { IrType::I32 } else { IrType::Bool };
                Ok((
                    IrExpr::Binary {
                        op: *op,
                        left,
                        right,
                        ty,
                    },
                    instrs,
                ))
            }

            ExprKind::Unary { op, operand } => {
                let (operand, instrs) = self.lower_expr(operand, depth)?;
                let value = match op {
                    // -x is 0 - x
                    UnaryOp::Neg => IrExpr::Binary {
                        op: BinaryOp::Sub,
                        left: Operand::Int(0),
                        right: operand,
                        ty: IrType::I32,
                    },
                    UnaryOp::Not => IrExpr::Unary {
                        op: UnaryOp::Not,
                        operand,
                        ty: IrType::Bool,
                    },
                };
                Ok((value, instrs))
            }

            ExprKind::Index { array, index } => {
                let (array, mut instrs) = self.lower_expr(array, depth)?;
                let (index, index_instrs) = self.lower_expr(index, depth)?;
                instrs.extend(index_instrs);
                let ty = self.type_of(expr);
                Ok((IrExpr::ArrayLoad { array, index, ty }, instrs))
            }

            ExprKind::Length(array) => {
                let (array, instrs) = self.lower_expr(array, depth)?;
                Ok((IrExpr::ArrayLength(array), instrs))
            }

            ExprKind::Field { object, name } => {
                let (object, instrs) = self.lower_expr(object, depth)?;
                let ty = self.type_of(expr);
                Ok((
                    IrExpr::GetField {
                        object,
                        field: name.clone(),
                        ty,
                    },
                    instrs,
                ))
            }

            ExprKind::Call {
                receiver,
                method,
                args,
            } => {
                let ret = self.type_of(expr);
                self.lower_call(receiver.as_deref(), method, args, ret, depth)
            }

            ExprKind::NewObject(class) => {
                let ty = IrType::Class(class.clone());
                let temp = self.fresh_temp();
                let object = Operand::var(temp.clone(), ty.clone());
                let instrs = vec![
                    IrInstr::assign(temp, ty, IrExpr::New(class.clone())),
                    IrInstr::Call(IrExpr::Invoke {
                        kind: InvokeKind::Special,
                        receiver: object.clone(),
                        method: "<init>".to_string(),
                        args: Vec::new(),
                        ret: IrType::Void,
                    }),
                ];
                Ok((IrExpr::Value(object), instrs))
            }

            ExprKind::NewArray { elem, size } => {
                let (size, instrs) = self.lower_expr(size, depth)?;
                let ty = IrType::from(&elem.array_of());
                Ok((IrExpr::NewArray { size, ty }, instrs))
            }

            ExprKind::ArrayInit { elem, elements } => {
                let (array, instrs) = self.lower_array_init(elem, elements, depth)?;
                Ok((IrExpr::Value(array), instrs))
            }
        }
    }

    /// A name read: locals and parameters are used directly, fields are
    /// loaded from `this`
    fn lower_name(&self, expr: &Expr, name: &str) -> IrExpr {
        match self.binding(name) {
            Some(Binding::Field(field)) => IrExpr::GetField {
                object: self.this(),
                field: name.to_string(),
                ty: IrType::from(&field.ty),
            },
            Some(Binding::Param(..)) | Some(Binding::Local(_)) => {
                IrExpr::Value(Operand::var(name, self.type_of(expr)))
            }
            Some(Binding::Import(_)) | None => {
                if !self.symbols.is_known_class(name) {
                    log::debug!("unbound name '{}' lowered as a class reference", name);
                }
                IrExpr::Value(Operand::Class(name.to_string()))
            }
        }
    }

    /// `a && b` / `a || b` with the right operand evaluated only when needed
    ///
    /// The result temporary is written on both paths and read after the end
    /// label.
    fn lower_short_circuit(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        depth: usize,
    ) -> CompileResult<(Operand, Instrs)> {
        let kind = if op == BinaryOp::And { LabelKind::And } else { LabelKind::Or };
        let block = self.labels.reserve(kind)?;

        let (left, mut instrs) = self.lower_expr(left, depth)?;
        let result = self.fresh_temp();
        let set = |value: Operand| IrInstr::assign(result.clone(), IrType::Bool, IrExpr::Value(value));

        if op == BinaryOp::And {
            instrs.push(IrInstr::Branch {
                cond: IrExpr::Value(left),
                target: block.rhs_label(),
            });
            instrs.push(set(Operand::Bool(false)));
            instrs.push(IrInstr::Goto(block.end_label()));
            instrs.push(IrInstr::Label(block.rhs_label()));
            let (right, right_instrs) = self.lower_expr(right, depth)?;
            instrs.extend(right_instrs);
            instrs.push(set(right));
        } else {
            instrs.push(IrInstr::Branch {
                cond: IrExpr::Value(left),
                target: block.true_label(),
            });
            let (right, right_instrs) = self.lower_expr(right, depth)?;
            instrs.extend(right_instrs);
            instrs.push(set(right));
            instrs.push(IrInstr::Goto(block.end_label()));
            instrs.push(IrInstr::Label(block.true_label()));
            instrs.push(set(Operand::Bool(true)));
        }
        instrs.push(IrInstr::Label(block.end_label()));

        Ok((Operand::var(result, IrType::Bool), instrs))
    }

    /// Build an invocation; the caller decides whether its result is stored
    pub(super) fn lower_call(
        &mut self,
        receiver: Option<&Expr>,
        method: &str,
        args: &[Expr],
        ret: IrType,
        depth: usize,
    ) -> CompileResult<(IrExpr, Instrs)> {
        let dispatch = dispatch::classify(self.symbols, self.method, receiver, method);
        let kind = dispatch.kind();
        let (receiver, mut instrs) = match dispatch {
            Dispatch::Static(class) => (Operand::Class(class.to_string()), Vec::new()),
            Dispatch::VirtualThis | Dispatch::Special(_) => (self.this(), Vec::new()),
            Dispatch::Virtual(receiver) => self.lower_expr(receiver, depth)?,
        };

        let mut operands = Vec::with_capacity(args.len());
        for arg in args {
            let (operand, arg_instrs) = self.lower_expr(arg, depth)?;
            instrs.extend(arg_instrs);
            operands.push(operand);
        }

        Ok((
            IrExpr::Invoke {
                kind,
                receiver,
                method: method.to_string(),
                args: operands,
                ret,
            },
            instrs,
        ))
    }

    /// `new(array, N)` followed by one store per element, in order
    fn lower_array_init(&mut self, elem: &Type, elements: &[Expr], depth: usize) -> CompileResult<(Operand, Instrs)> {
        let elem_ty = IrType::from(elem);
        let array_ty = IrType::array_of(elem_ty.clone());
        let temp = self.fresh_temp();
        let array = Operand::var(temp.clone(), array_ty.clone());

        let mut instrs = vec![IrInstr::assign(
            temp,
            array_ty.clone(),
            IrExpr::NewArray {
                size: Operand::Int(elements.len() as i32),
                ty: array_ty,
            },
        )];
        for (i, element) in elements.iter().enumerate() {
            let (value, element_instrs) = self.lower_expr(element, depth)?;
            instrs.extend(element_instrs);
            instrs.push(IrInstr::ArrayStore {
                array: array.clone(),
                index: Operand::Int(i as i32),
                ty: elem_ty.clone(),
                value,
            });
        }
        Ok((array, instrs))
    }
}
