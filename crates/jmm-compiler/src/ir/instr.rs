//! IR Instructions
//!
//! Three-address code: every instruction reads operands and writes at most
//! one destination.

use super::value::{IrType, Operand};
use jmm_ast::{BinaryOp, UnaryOp};
use serde::Serialize;
use std::fmt;

/// Control structure a label belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum LabelKind {
    If,
    While,
    /// Short-circuit `&&`
    And,
    /// Short-circuit `||`
    Or,
}

impl LabelKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            LabelKind::If => "if",
            LabelKind::While => "while",
            LabelKind::And => "and",
            LabelKind::Or => "or",
        }
    }
}

impl fmt::Display for LabelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

/// A jump target, rendered as `<kind>_<role>_<index>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Label {
    pub kind: LabelKind,
    pub role: &'static str,
    pub index: u32,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.kind.prefix(), self.role, self.index)
    }
}

/// Invocation kind of a call site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InvokeKind {
    /// Class-level call: imported classes, static methods
    Static,
    /// Instance call through the receiver's class
    Virtual,
    /// Non-virtual call: constructors and superclass methods
    Special,
}

impl InvokeKind {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            InvokeKind::Static => "invokestatic",
            InvokeKind::Virtual => "invokevirtual",
            InvokeKind::Special => "invokespecial",
        }
    }
}

/// Right-hand side of an assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum IrExpr {
    /// Plain operand
    Value(Operand),

    /// `left OP.ty right`
    Binary {
        op: BinaryOp,
        left: Operand,
        right: Operand,
        ty: IrType,
    },

    /// `OP.ty operand`
    Unary {
        op: UnaryOp,
        operand: Operand,
        ty: IrType,
    },

    /// `invokeX(receiver, "method", args...).ret`
    Invoke {
        kind: InvokeKind,
        receiver: Operand,
        method: String,
        args: Vec<Operand>,
        ret: IrType,
    },

    /// `new(Class).Class`
    New(String),

    /// `new(array, size.i32).ty`
    NewArray { size: Operand, ty: IrType },

    /// `getfield(object, field.ty).ty`
    GetField {
        object: Operand,
        field: String,
        ty: IrType,
    },

    /// `array[index.i32].ty`
    ArrayLoad {
        array: Operand,
        index: Operand,
        ty: IrType,
    },

    /// `arraylength(array).i32`
    ArrayLength(Operand),
}

impl IrExpr {
    /// Type of the value the expression produces
    pub fn ty(&self) -> IrType {
        match self {
            IrExpr::Value(operand) => operand.ty(),
            IrExpr::Binary { ty, .. }
            | IrExpr::Unary { ty, .. }
            | IrExpr::NewArray { ty, .. }
            | IrExpr::GetField { ty, .. }
            | IrExpr::ArrayLoad { ty, .. } => ty.clone(),
            IrExpr::Invoke { ret, .. } => ret.clone(),
            IrExpr::New(class) => IrType::Class(class.clone()),
            IrExpr::ArrayLength(_) => IrType::I32,
        }
    }
}

/// An IR instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum IrInstr {
    /// `dest.ty :=.ty value;`
    Assign {
        dest: String,
        ty: IrType,
        value: IrExpr,
    },

    /// `putfield(object, field.ty, value).V;`
    PutField {
        object: Operand,
        field: String,
        ty: IrType,
        value: Operand,
    },

    /// `array[index.i32].ty :=.ty value;`
    ArrayStore {
        array: Operand,
        index: Operand,
        ty: IrType,
        value: Operand,
    },

    /// Invocation whose result is not used
    Call(IrExpr),

    /// `if (cond) goto target;`
    Branch { cond: IrExpr, target: Label },

    /// `goto target;`
    Goto(Label),

    /// `label:`
    Label(Label),

    /// `ret.ty value;` / `ret.V;`
    Return { ty: IrType, value: Option<Operand> },
}

impl IrInstr {
    pub fn assign(dest: impl Into<String>, ty: IrType, value: IrExpr) -> Self {
        IrInstr::Assign {
            dest: dest.into(),
            ty,
            value,
        }
    }

    /// Check if this instruction is a jump target
    pub fn is_label(&self) -> bool {
        matches!(self, IrInstr::Label(_))
    }

    /// Labels this instruction may transfer control to
    pub fn jump_target(&self) -> Option<&Label> {
        match self {
            IrInstr::Branch { target, .. } | IrInstr::Goto(target) => Some(target),
            _ => None,
        }
    }
}
