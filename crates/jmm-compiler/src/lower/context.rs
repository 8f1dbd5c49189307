//! Per-method lowering state
//!
//! Everything the generator needs while lowering one method lives here and
//! is dropped when the method is done: the resolved types, the temporary
//! counter, the recursion guard. Label counters are borrowed from the
//! generator, which owns them across methods.

use super::labels::LabelManager;
use crate::config::BranchLayout;
use crate::depth::DepthLimit;
use crate::ir::{IrType, Operand};
use crate::types::TypeTable;
use jmm_ast::{Binding, Expr, MethodSymbol, SymbolTable, Type};
use rustc_hash::FxHashSet;

/// Allocates `tmpN` names that do not collide with user names
#[derive(Debug, Default)]
pub struct TempAllocator {
    next: u32,
    reserved: FxHashSet<String>,
}

impl TempAllocator {
    pub fn new<'n>(reserved: impl IntoIterator<Item = &'n str>) -> Self {
        Self {
            next: 0,
            reserved: reserved.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn fresh(&mut self) -> String {
        loop {
            let name = format!("tmp{}", self.next);
            self.next += 1;
            if !self.reserved.contains(&name) {
                return name;
            }
        }
    }
}

/// Lowering context of one method
pub struct MethodContext<'a> {
    pub(super) symbols: &'a SymbolTable,
    pub(super) method: Option<&'a MethodSymbol>,
    pub(super) types: &'a TypeTable,
    pub(super) labels: &'a mut LabelManager,
    pub(super) limit: DepthLimit,
    pub(super) layout: BranchLayout,
    temps: TempAllocator,
}

impl<'a> MethodContext<'a> {
    pub fn new(
        symbols: &'a SymbolTable,
        method_name: &str,
        types: &'a TypeTable,
        labels: &'a mut LabelManager,
        max_depth: usize,
        layout: BranchLayout,
    ) -> Self {
        let method = symbols.method(method_name);
        let temps = match method {
            Some(method) => TempAllocator::new(symbols.names_in_scope(method)),
            None => TempAllocator::new(symbols.fields.iter().map(|f| f.name.as_str())),
        };
        labels.set_current_method(method_name);
        Self {
            symbols,
            method,
            types,
            labels,
            limit: DepthLimit::new(max_depth, method_name),
            layout,
            temps,
        }
    }

    pub fn fresh_temp(&mut self) -> String {
        self.temps.fresh()
    }

    /// Resolved type of an expression, `int` when nothing is known
    pub fn type_of(&self, expr: &Expr) -> IrType {
        self.types
            .type_of(expr)
            .map(IrType::from)
            .unwrap_or_else(|| {
                log::debug!("no type for node {} in '{}', assuming int", expr.id, self.limit.method());
                IrType::I32
            })
    }

    /// Resolved type of a call used as a statement, `void` when nothing is known
    pub fn statement_type_of(&self, expr: &Expr) -> IrType {
        self.types.type_of(expr).map(IrType::from).unwrap_or(IrType::Void)
    }

    pub fn binding<'s>(&'s self, name: &'s str) -> Option<Binding<'s>> {
        self.symbols.lookup(self.method, name)
    }

    /// Declared type of a parameter, local or field
    pub fn variable_type(&self, name: &str) -> Option<IrType> {
        let binding = self.symbols.lookup(self.method, name)?;
        let ty = match binding {
            Binding::Param(param, _) if param.is_varargs => param.ty.array_of(),
            other => other.ty()?.clone(),
        };
        Some(IrType::from(&ty))
    }

    pub fn class_type(&self) -> IrType {
        IrType::Class(self.symbols.class_name.clone())
    }

    pub fn this(&self) -> Operand {
        Operand::This(self.class_type())
    }

    pub fn return_type(&self) -> IrType {
        self.method
            .map(|m| IrType::from(&m.return_type))
            .unwrap_or_else(|| IrType::from(&Type::void()))
    }
}
