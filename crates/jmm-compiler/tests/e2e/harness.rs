//! Test harness for end-to-end compilation
//!
//! Provides helpers that run the pipeline on a built program and pick
//! methods out of the result.

use jmm_ast::{MethodDecl, Program, SymbolTable};
use jmm_compiler::{CompileOutput, Compiler, CompilerOptions, IrModule};

/// Compile with default options, panicking on fatal errors
pub fn compile(program: &Program, symbols: &SymbolTable) -> CompileOutput {
    compile_with(program, symbols, CompilerOptions::default())
}

pub fn compile_with(program: &Program, symbols: &SymbolTable, options: CompilerOptions) -> CompileOutput {
    Compiler::new(options)
        .compile(program, symbols)
        .unwrap_or_else(|e| panic!("compilation failed: {}", e))
}

/// Compile without folding or propagation
pub fn compile_unoptimized(program: &Program, symbols: &SymbolTable) -> CompileOutput {
    compile_with(program, symbols, CompilerOptions::default().without_optimizations())
}

pub fn module(output: &CompileOutput) -> &IrModule {
    match &output.module {
        Some(module) => module,
        None => panic!("no IR generated: {:?}", output.diagnostics),
    }
}

/// The instructions of one method, one string per instruction
pub fn method_ir(output: &CompileOutput, name: &str) -> Vec<String> {
    let method = module(output)
        .method(name)
        .unwrap_or_else(|| panic!("no IR for method '{}'", name));
    method.body.iter().map(|instr| instr.to_string()).collect()
}

/// The tree of one method as handed to the IR generator
pub fn final_method<'o>(output: &'o CompileOutput, name: &str) -> &'o MethodDecl {
    output
        .program
        .method(name)
        .unwrap_or_else(|| panic!("no method '{}' in the output tree", name))
}

/// Index of the first instruction containing `needle`
pub fn position(lines: &[String], needle: &str) -> usize {
    lines
        .iter()
        .position(|line| line.contains(needle))
        .unwrap_or_else(|| panic!("'{}' not found in:\n{}", needle, lines.join("\n")))
}
