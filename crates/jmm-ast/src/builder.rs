//! Tree construction helpers
//!
//! Short constructors for building trees in tests and in backend passes that
//! synthesize nodes. Every node gets a synthetic span and an unassigned id;
//! [`program`] renumbers the finished tree.

use crate::ast::*;
use crate::span::Span;
use crate::types::Type;

fn expr(kind: ExprKind) -> Expr {
    Expr::new(kind, Span::synthetic())
}

fn stmt(kind: StmtKind) -> Stmt {
    Stmt::new(kind, Span::synthetic())
}

/// Build a numbered program with a single class
pub fn program(class: &str, methods: Vec<MethodDecl>) -> Program {
    Program::new(ClassDecl {
        name: class.to_string(),
        methods,
        span: Span::synthetic(),
    })
}

pub fn method(name: &str, body: Vec<Stmt>) -> MethodDecl {
    MethodDecl {
        name: name.to_string(),
        body,
        span: Span::synthetic(),
    }
}

// ============================================================================
// Statements
// ============================================================================

pub fn assign(target: &str, value: Expr) -> Stmt {
    stmt(StmtKind::Assign {
        target: target.to_string(),
        value,
    })
}

pub fn index_assign(target: &str, index: Expr, value: Expr) -> Stmt {
    stmt(StmtKind::IndexAssign {
        target: target.to_string(),
        index,
        value,
    })
}

pub fn ret(value: Option<Expr>) -> Stmt {
    stmt(StmtKind::Return(value))
}

pub fn block(stmts: Vec<Stmt>) -> Stmt {
    stmt(StmtKind::Block(stmts))
}

pub fn if_then(cond: Expr, then_branch: Stmt) -> Stmt {
    stmt(StmtKind::If {
        cond,
        then_branch: Box::new(then_branch),
        else_branch: None,
    })
}

pub fn if_else(cond: Expr, then_branch: Stmt, else_branch: Stmt) -> Stmt {
    stmt(StmtKind::If {
        cond,
        then_branch: Box::new(then_branch),
        else_branch: Some(Box::new(else_branch)),
    })
}

pub fn while_loop(cond: Expr, body: Stmt) -> Stmt {
    stmt(StmtKind::While {
        cond,
        body: Box::new(body),
    })
}

pub fn expr_stmt(expr: Expr) -> Stmt {
    stmt(StmtKind::Expr(expr))
}

// ============================================================================
// Expressions
// ============================================================================

pub fn int(value: i32) -> Expr {
    expr(ExprKind::Literal(Literal::Int(value)))
}

pub fn boolean(value: bool) -> Expr {
    expr(ExprKind::Literal(Literal::Bool(value)))
}

pub fn var(name: &str) -> Expr {
    expr(ExprKind::Var(name.to_string()))
}

pub fn this() -> Expr {
    expr(ExprKind::This)
}

pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    expr(ExprKind::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
    expr(ExprKind::Unary {
        op,
        operand: Box::new(operand),
    })
}

pub fn index(array: Expr, index: Expr) -> Expr {
    expr(ExprKind::Index {
        array: Box::new(array),
        index: Box::new(index),
    })
}

pub fn length(array: Expr) -> Expr {
    expr(ExprKind::Length(Box::new(array)))
}

pub fn field(object: Expr, name: &str) -> Expr {
    expr(ExprKind::Field {
        object: Box::new(object),
        name: name.to_string(),
    })
}

/// Call with an explicit receiver: `receiver.method(args)`
pub fn call(receiver: Expr, method: &str, args: Vec<Expr>) -> Expr {
    expr(ExprKind::Call {
        receiver: Some(Box::new(receiver)),
        method: method.to_string(),
        args,
    })
}

/// Call with an implicit receiver: `method(args)`
pub fn call_this(method: &str, args: Vec<Expr>) -> Expr {
    expr(ExprKind::Call {
        receiver: None,
        method: method.to_string(),
        args,
    })
}

pub fn new_object(class: &str) -> Expr {
    expr(ExprKind::NewObject(class.to_string()))
}

pub fn new_array(elem: Type, size: Expr) -> Expr {
    expr(ExprKind::NewArray {
        elem,
        size: Box::new(size),
    })
}

pub fn array_init(elem: Type, elements: Vec<Expr>) -> Expr {
    expr(ExprKind::ArrayInit { elem, elements })
}

/// Attach a frontend type annotation to an expression
pub fn typed(mut expr: Expr, ty: Type) -> Expr {
    expr.ty = Some(ty);
    expr
}
