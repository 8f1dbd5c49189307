//! Call dispatch classification
//!
//! Dispatch order for a method call:
//! 1. Implicit receiver → static call on this class for static methods,
//!    otherwise a virtual call on `this`
//! 2. `this` or any value (parameter, local, field, expression) → virtual
//! 3. Bare name of the superclass → special, on `this`
//! 4. Bare name of an imported (or any other) class → static

use crate::ir::InvokeKind;
use jmm_ast::{Expr, ExprKind, MethodSymbol, SymbolTable};

/// Where a call goes and through which receiver
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dispatch<'e> {
    /// `invokestatic(Class, ...)`
    Static(&'e str),
    /// `invokevirtual(this, ...)`
    VirtualThis,
    /// `invokevirtual(receiver, ...)` on an evaluated receiver
    Virtual(&'e Expr),
    /// `invokespecial(this, ...)` resolved against the named superclass
    Special(&'e str),
}

impl Dispatch<'_> {
    pub fn kind(&self) -> InvokeKind {
        match self {
            Dispatch::Static(_) => InvokeKind::Static,
            Dispatch::VirtualThis | Dispatch::Virtual(_) => InvokeKind::Virtual,
            Dispatch::Special(_) => InvokeKind::Special,
        }
    }
}

/// Classify a call site inside `method`
pub fn classify<'e>(
    symbols: &'e SymbolTable,
    method: Option<&MethodSymbol>,
    receiver: Option<&'e Expr>,
    callee: &str,
) -> Dispatch<'e> {
    let Some(receiver) = receiver else {
        return match symbols.method(callee) {
            Some(target) if target.is_static => Dispatch::Static(&symbols.class_name),
            _ => Dispatch::VirtualThis,
        };
    };

    match &receiver.kind {
        ExprKind::This => Dispatch::VirtualThis,
        ExprKind::Var(name) => {
            let is_value = symbols
                .lookup(method, name)
                .is_some_and(|binding| binding.ty().is_some());
            if is_value {
                Dispatch::Virtual(receiver)
            } else if symbols.is_superclass(name) {
                Dispatch::Special(name)
            } else {
                if !symbols.is_known_class(name) {
                    log::debug!("'{}' is neither a value nor a known class; calling it statically", name);
                }
                Dispatch::Static(name)
            }
        }
        _ => Dispatch::Virtual(receiver),
    }
}
