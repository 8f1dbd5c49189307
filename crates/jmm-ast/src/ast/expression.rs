//! Expression nodes

use super::NodeId;
use crate::span::Span;
use crate::types::Type;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Expression (produces a value)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub id: NodeId,
    pub span: Span,
    /// Resolved type recorded by the frontend, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<Type>,
    pub kind: ExprKind,
}

/// Compile-time literal value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Literal {
    Int(i32),
    Bool(bool),
}

impl Literal {
    /// Static type of the literal
    pub fn ty(&self) -> Type {
        match self {
            Literal::Int(_) => Type::int(),
            Literal::Bool(_) => Type::boolean(),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(v) => write!(f, "{}", v),
            Literal::Bool(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    /// Integer or boolean literal: 42, true
    Literal(Literal),

    /// Variable reference (parameter, local, field or imported class name)
    Var(String),

    /// The current object
    This,

    /// Binary expression: a + b, a < b, a && b
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Unary expression: -a, !a
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// Array element access: a[i]
    Index { array: Box<Expr>, index: Box<Expr> },

    /// Array length: a.length
    Length(Box<Expr>),

    /// Field access: obj.field
    Field { object: Box<Expr>, name: String },

    /// Method call; `receiver` is `None` for calls with an implicit `this`
    Call {
        receiver: Option<Box<Expr>>,
        method: String,
        args: Vec<Expr>,
    },

    /// Object construction: new Foo()
    NewObject(String),

    /// Array allocation: new int[n]; `elem` is the element type
    NewArray { elem: Type, size: Box<Expr> },

    /// Array initializer: [a, b, c]; `elem` is the element type
    ArrayInit { elem: Type, elements: Vec<Expr> },
}

impl Expr {
    /// Create a node with an unassigned id
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self {
            id: NodeId::UNASSIGNED,
            span,
            ty: None,
            kind,
        }
    }

    /// Create a literal node that replaces `self`, keeping its id and span
    pub fn replaced_by_literal(&self, lit: Literal) -> Expr {
        Expr {
            id: self.id,
            span: self.span,
            ty: None,
            kind: ExprKind::Literal(lit),
        }
    }

    pub fn as_literal(&self) -> Option<Literal> {
        match &self.kind {
            ExprKind::Literal(lit) => Some(*lit),
            _ => None,
        }
    }

    pub fn as_var(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Var(name) => Some(name),
            _ => None,
        }
    }

    /// Check if this expression is a literal
    pub fn is_literal(&self) -> bool {
        matches!(self.kind, ExprKind::Literal(_))
    }

    /// Direct children in evaluation order
    pub fn children(&self) -> Vec<&Expr> {
        match &self.kind {
            ExprKind::Literal(_) | ExprKind::Var(_) | ExprKind::This | ExprKind::NewObject(_) => {
                vec![]
            }
            ExprKind::Binary { left, right, .. } => vec![&**left, &**right],
            ExprKind::Unary { operand, .. } => vec![&**operand],
            ExprKind::Index { array, index } => vec![&**array, &**index],
            ExprKind::Length(array) => vec![&**array],
            ExprKind::Field { object, .. } => vec![&**object],
            ExprKind::Call { receiver, args, .. } => {
                let mut children: Vec<&Expr> = Vec::with_capacity(args.len() + 1);
                if let Some(receiver) = receiver {
                    children.push(&**receiver);
                }
                children.extend(args.iter());
                children
            }
            ExprKind::NewArray { size, .. } => vec![&**size],
            ExprKind::ArrayInit { elements, .. } => elements.iter().collect(),
        }
    }

    /// Direct children in evaluation order, mutably
    pub fn children_mut(&mut self) -> Vec<&mut Expr> {
        match &mut self.kind {
            ExprKind::Literal(_) | ExprKind::Var(_) | ExprKind::This | ExprKind::NewObject(_) => {
                vec![]
            }
            ExprKind::Binary { left, right, .. } => vec![&mut **left, &mut **right],
            ExprKind::Unary { operand, .. } => vec![&mut **operand],
            ExprKind::Index { array, index } => vec![&mut **array, &mut **index],
            ExprKind::Length(array) => vec![&mut **array],
            ExprKind::Field { object, .. } => vec![&mut **object],
            ExprKind::Call { receiver, args, .. } => {
                let mut children: Vec<&mut Expr> = Vec::with_capacity(args.len() + 1);
                if let Some(receiver) = receiver {
                    children.push(&mut **receiver);
                }
                children.extend(args.iter_mut());
                children
            }
            ExprKind::NewArray { size, .. } => vec![&mut **size],
            ExprKind::ArrayInit { elements, .. } => elements.iter_mut().collect(),
        }
    }

    /// Check whether evaluating this expression may have side effects
    /// (calls and allocations anywhere in the subtree)
    pub fn has_side_effects(&self) -> bool {
        match &self.kind {
            ExprKind::Call { .. }
            | ExprKind::NewObject(_)
            | ExprKind::NewArray { .. }
            | ExprKind::ArrayInit { .. } => true,
            _ => self.children().into_iter().any(Expr::has_side_effects),
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Relational
    Less,
    LessEqual,
    Greater,
    GreaterEqual,

    // Equality
    Equal,
    NotEqual,

    // Logical (short-circuit)
    And,
    Or,
}

impl BinaryOp {
    /// Check if this is an arithmetic operator
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod
        )
    }

    /// Check if this is an ordering comparison
    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual
        )
    }

    pub fn is_equality(&self) -> bool {
        matches!(self, BinaryOp::Equal | BinaryOp::NotEqual)
    }

    /// Check if this is a logical operator
    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    /// Parse an operator symbol
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Mod,
            "<" => BinaryOp::Less,
            "<=" => BinaryOp::LessEqual,
            ">" => BinaryOp::Greater,
            ">=" => BinaryOp::GreaterEqual,
            "==" => BinaryOp::Equal,
            "!=" => BinaryOp::NotEqual,
            "&&" => BinaryOp::And,
            "||" => BinaryOp::Or,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Numeric negation (-)
    Neg,
    /// Logical not (!)
    Not,
}

impl UnaryOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "-" => Some(UnaryOp::Neg),
            "!" => Some(UnaryOp::Not),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
