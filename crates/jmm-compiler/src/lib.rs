//! jmm Compiler - Typed Tree to IR
//!
//! Backend of the jmm compiler. The pipeline for one class is:
//!
//! 1. type check every method ([`types::TypeResolver`])
//! 2. constant folding and propagation to a fixpoint ([`optimize::Optimizer`])
//! 3. variadic parameter lowering ([`varargs::lower_varargs`])
//! 4. node renumbering
//! 5. IR generation ([`lower::IrGenerator`])

pub mod config;
pub mod depth;
pub mod diagnostic;
pub mod error;
pub mod ir;
pub mod lower;
pub mod optimize;
pub mod types;
pub mod varargs;

pub use config::{BranchLayout, CompilerOptions, ConfigError};
pub use diagnostic::{Diagnostic, Diagnostics};
pub use error::{CompileError, CompileResult};
pub use ir::{IrModule, PrettyPrint};
pub use lower::{IrGenerator, LabelManager};
pub use optimize::{OptStats, Optimizer};
pub use types::{TypeResolver, TypeTable};

use jmm_ast::{Program, SymbolTable};

/// Everything one compilation produced
#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// The IR, absent when type errors were reported
    pub module: Option<IrModule>,
    /// The tree as handed to the IR generator
    pub program: Program,
    /// The symbol table after varargs lowering
    pub symbols: SymbolTable,
    pub diagnostics: Diagnostics,
    pub stats: OptStats,
}

/// Main compiler entry point
pub struct Compiler {
    options: CompilerOptions,
}

impl Compiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Compile one class
    ///
    /// Type errors are returned as diagnostics; only fatal conditions
    /// (recursion limit, label exhaustion, a diverging optimizer) are errors.
    pub fn compile(&self, program: &Program, symbols: &SymbolTable) -> CompileResult<CompileOutput> {
        let diagnostics = self.check(program, symbols)?;
        if diagnostics.has_errors() {
            log::debug!("{} type errors, no IR generated", diagnostics.error_count());
            return Ok(CompileOutput {
                module: None,
                program: program.clone(),
                symbols: symbols.clone(),
                diagnostics,
                stats: OptStats::default(),
            });
        }

        let (optimized, stats) = if self.options.optimize.enabled {
            Optimizer::new(symbols, &self.options).optimize(program)?
        } else {
            (program.clone(), OptStats::default())
        };

        let lowered = varargs::lower_varargs(&optimized, symbols, self.options.limits.max_depth)?;
        let mut program = lowered.program;
        program.renumber();

        let module = IrGenerator::new(&lowered.symbols, &self.options).generate(&program)?;

        Ok(CompileOutput {
            module: Some(module),
            program,
            symbols: lowered.symbols,
            diagnostics,
            stats,
        })
    }

    /// Type check every method, collecting the errors as diagnostics
    pub fn check(&self, program: &Program, symbols: &SymbolTable) -> CompileResult<Diagnostics> {
        let mut resolver = TypeResolver::new(symbols, self.options.limits.max_depth);
        let mut diagnostics = Diagnostics::new();
        for method in &program.class.methods {
            let (_, errors) = resolver.annotate_method(method)?;
            diagnostics.extend(errors.iter().map(Diagnostic::from_semantic_error));
        }
        Ok(diagnostics)
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompilerOptions::default())
    }
}
