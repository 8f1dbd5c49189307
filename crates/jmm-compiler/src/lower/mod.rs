//! Tree to IR Lowering
//!
//! Converts the optimized syntax tree into the flat, labeled IR. Every method
//! is annotated with types once, then lowered with its own [`MethodContext`];
//! label counters live in the generator and are shared by all methods.

mod context;
mod dispatch;
mod expr;
mod labels;
mod stmt;

pub use context::{MethodContext, TempAllocator};
pub use dispatch::{classify, Dispatch};
pub use expr::Instrs;
pub use labels::{LabelBlock, LabelManager};

use crate::config::CompilerOptions;
use crate::error::CompileResult;
use crate::ir::{IrClass, IrField, IrInstr, IrMethod, IrModule, IrParam, IrType};
use crate::types::TypeResolver;
use jmm_ast::{MethodDecl, MethodSymbol, Program, Stmt, SymbolTable};

/// Tree to IR generator
pub struct IrGenerator<'a> {
    symbols: &'a SymbolTable,
    options: &'a CompilerOptions,
    labels: LabelManager,
}

impl<'a> IrGenerator<'a> {
    pub fn new(symbols: &'a SymbolTable, options: &'a CompilerOptions) -> Self {
        Self {
            symbols,
            options,
            labels: LabelManager::new(),
        }
    }

    /// Use a preconfigured label manager
    pub fn with_labels(mut self, labels: LabelManager) -> Self {
        self.labels = labels;
        self
    }

    /// Lower a whole class
    pub fn generate(&mut self, program: &Program) -> CompileResult<IrModule> {
        let mut class = IrClass::new(program.class.name.clone());
        class.superclass = self.symbols.superclass.clone();
        class.fields = self
            .symbols
            .fields
            .iter()
            .map(|field| IrField {
                name: field.name.clone(),
                ty: IrType::from(&field.ty),
            })
            .collect();

        for method in &program.class.methods {
            class.methods.push(self.generate_method(method)?);
        }

        let module = self
            .symbols
            .imports
            .iter()
            .fold(IrModule::new(class), |module, import| module.with_import(import.clone()));
        log::debug!(
            "generated {} instructions for '{}'",
            module.instruction_count(),
            program.class.name
        );
        Ok(module)
    }

    /// Lower one method
    pub fn generate_method(&mut self, method: &MethodDecl) -> CompileResult<IrMethod> {
        let max_depth = self.options.limits.max_depth;
        let mut resolver = TypeResolver::new(self.symbols, max_depth);
        let (types, errors) = resolver.annotate_method(method)?;
        for error in &errors {
            log::debug!("lowering '{}' despite type error: {}", method.name, error);
        }

        let symbols = self.symbols;
        let symbol = symbols.method(&method.name);
        let mut ctx = MethodContext::new(
            symbols,
            &method.name,
            &types,
            &mut self.labels,
            max_depth,
            self.options.codegen.branch_layout,
        );
        let mut body = ctx.lower_stmts(&method.body, 0)?;
        let return_type = ctx.return_type();

        if return_type.is_void() && !method.body.last().is_some_and(Stmt::always_returns) {
            body.push(IrInstr::Return {
                ty: IrType::Void,
                value: None,
            });
        }

        Ok(IrMethod {
            name: method.name.clone(),
            is_static: symbol.is_some_and(|s| s.is_static),
            params: symbol.map(params_of).unwrap_or_default(),
            return_type,
            body,
        })
    }
}

fn params_of(method: &MethodSymbol) -> Vec<IrParam> {
    method
        .params
        .iter()
        .map(|param| {
            let ty = if param.is_varargs {
                param.ty.array_of()
            } else {
                param.ty.clone()
            };
            IrParam {
                name: param.name.clone(),
                ty: IrType::from(&ty),
            }
        })
        .collect()
}
