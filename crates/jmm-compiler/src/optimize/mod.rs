//! Tree Optimization Passes
//!
//! Constant folding and constant propagation, interleaved per method until
//! the tree stops changing. Propagation exposes literal operands that the
//! next folding round reduces.

mod constant_fold;
mod constant_prop;
mod loop_vars;

pub use constant_fold::{eval_binary, eval_unary, ConstantFolder};
pub use constant_prop::{ConstEnv, ConstantPropagator};
pub use loop_vars::{LoopVars, VarUse};

use crate::config::CompilerOptions;
use crate::depth::DepthLimit;
use crate::error::{CompileError, CompileResult};
use jmm_ast::{MethodDecl, Program, SymbolTable};

/// Optimizer that runs folding and propagation to a fixpoint
pub struct Optimizer<'a> {
    symbols: &'a SymbolTable,
    max_depth: usize,
    max_iterations: usize,
}

impl<'a> Optimizer<'a> {
    pub fn new(symbols: &'a SymbolTable, options: &CompilerOptions) -> Self {
        Self {
            symbols,
            max_depth: options.limits.max_depth,
            max_iterations: options.optimize.max_iterations,
        }
    }

    /// Optimize every method of a program
    pub fn optimize(&self, program: &Program) -> CompileResult<(Program, OptStats)> {
        let mut stats = OptStats::default();
        let mut optimized = program.clone();

        for method in &mut optimized.class.methods {
            *method = self.optimize_method(method, &mut stats)?;
        }

        log::debug!(
            "optimized '{}': {} folded, {} propagated, {} rounds",
            program.class.name,
            stats.constants_folded,
            stats.constants_propagated,
            stats.iterations
        );
        Ok((optimized, stats))
    }

    /// Run rounds on one method until a round changes nothing
    pub fn optimize_method(&self, method: &MethodDecl, stats: &mut OptStats) -> CompileResult<MethodDecl> {
        let mut current = method.clone();
        for _ in 0..self.max_iterations {
            stats.iterations += 1;
            let (next, round) = self.round(&current)?;
            if next == current {
                return Ok(current);
            }
            stats.constants_folded += round.constants_folded;
            stats.constants_propagated += round.constants_propagated;
            current = next;
        }
        Err(CompileError::FixpointDiverged {
            iterations: self.max_iterations,
        })
    }

    /// One folding round followed by one propagation round
    ///
    /// Loop-sensitive variables are recomputed every round, since folding
    /// may remove loops.
    pub fn round(&self, method: &MethodDecl) -> CompileResult<(MethodDecl, OptStats)> {
        let limit = DepthLimit::new(self.max_depth, method.name.as_str());
        let loop_vars = LoopVars::collect(method, &limit)?;

        let mut folder = ConstantFolder::new(&loop_vars, &limit);
        let folded = folder.fold_method(method)?;

        let mut propagator =
            ConstantPropagator::new(self.symbols, self.symbols.method(&method.name), &loop_vars, &limit);
        let propagated = propagator.propagate_method(&folded)?;

        let stats = OptStats {
            iterations: 1,
            constants_folded: folder.folded(),
            constants_propagated: propagator.replaced(),
        };
        Ok((propagated, stats))
    }

    /// Check whether one more round would change the method
    pub fn changes(&self, method: &MethodDecl) -> CompileResult<bool> {
        let (next, _) = self.round(method)?;
        Ok(&next != method)
    }
}

/// Statistics about optimizations performed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptStats {
    /// Rounds run, summed over methods
    pub iterations: usize,
    /// Number of nodes rewritten by folding
    pub constants_folded: usize,
    /// Number of variable reads replaced by literals
    pub constants_propagated: usize,
}
