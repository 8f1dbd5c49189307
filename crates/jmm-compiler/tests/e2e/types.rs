//! Type resolution through the whole pipeline

use super::harness::*;
use jmm_ast::builder::*;
use jmm_ast::{BinaryOp, MethodSymbol, Param, SymbolTable, Type};
use jmm_compiler::diagnostic::ErrorCode;
use pretty_assertions::assert_eq;

fn symbols() -> SymbolTable {
    SymbolTable::new("Grid")
        .with_method(
            MethodSymbol::new("cell", Type::int())
                .with_param(Param::new("a", Type::array("int", 2)))
                .with_param(Param::new("flag", Type::boolean()))
                .with_local("x", Type::int()),
        )
}

#[test]
fn test_two_dimensional_access() {
    let program = program(
        "Grid",
        vec![method(
            "cell",
            vec![
                assign("x", index(index(var("a"), int(1)), int(2))),
                ret(Some(var("x"))),
            ],
        )],
    );
    let output = compile(&program, &symbols());
    assert!(output.diagnostics.is_empty());
    assert_eq!(
        method_ir(&output, "cell"),
        vec![
            "tmp0.array.i32 :=.array.i32 a.array.array.i32[1.i32].array.i32;",
            "x.i32 :=.i32 tmp0.array.i32[2.i32].i32;",
            "ret.i32 x.i32;",
        ]
    );
}

#[test]
fn test_array_length() {
    let program = program(
        "Grid",
        vec![method("cell", vec![ret(Some(length(index(var("a"), int(0)))))])],
    );
    let output = compile(&program, &symbols());
    assert_eq!(
        method_ir(&output, "cell"),
        vec![
            "tmp0.array.i32 :=.array.i32 a.array.array.i32[0.i32].array.i32;",
            "tmp1.i32 :=.i32 arraylength(tmp0.array.i32).i32;",
            "ret.i32 tmp1.i32;",
        ]
    );
}

#[test]
fn test_third_index_is_reported() {
    let program = program(
        "Grid",
        vec![method(
            "cell",
            vec![ret(Some(index(index(index(var("a"), int(0)), int(0)), int(0))))],
        )],
    );
    let output = compile(&program, &symbols());
    assert!(output.module.is_none());
    let codes: Vec<_> = output.diagnostics.iter().map(|d| d.code()).collect();
    assert_eq!(codes, vec![Some(ErrorCode("E2002"))]);
}

#[test]
fn test_operand_mismatch_is_reported() {
    let program = program(
        "Grid",
        vec![method(
            "cell",
            vec![
                assign("x", binary(BinaryOp::Add, int(1), var("flag"))),
                ret(Some(var("x"))),
            ],
        )],
    );
    let output = compile(&program, &symbols());
    assert!(output.module.is_none());
    assert!(output.diagnostics.has_errors());
    let first = output.diagnostics.iter().next().unwrap();
    assert_eq!(first.code(), Some(ErrorCode("E2001")));
}
