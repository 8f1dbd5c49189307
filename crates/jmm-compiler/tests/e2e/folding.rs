//! Constant folding through the whole pipeline

use super::harness::*;
use jmm_ast::builder::*;
use jmm_ast::{BinaryOp, MethodSymbol, Param, SymbolTable, Type, UnaryOp};
use pretty_assertions::assert_eq;

fn symbols() -> SymbolTable {
    SymbolTable::new("Calc")
        .with_method(MethodSymbol::new("sum", Type::int()))
        .with_method(
            MethodSymbol::new("zero", Type::int())
                .with_param(Param::new("a", Type::array("int", 1)))
                .with_param(Param::new("i", Type::int()))
                .with_param(Param::new("n", Type::int())),
        )
        .with_method(MethodSymbol::new("no", Type::boolean()))
        .with_method(MethodSymbol::new("pick", Type::int()).with_local("x", Type::int()))
}

#[test]
fn test_literal_arithmetic() {
    let program = program(
        "Calc",
        vec![method("sum", vec![ret(Some(binary(BinaryOp::Add, int(1), int(2))))])],
    );
    let output = compile(&program, &symbols());
    assert_eq!(method_ir(&output, "sum"), vec!["ret.i32 3.i32;"]);
    assert!(output.stats.constants_folded >= 1);
}

#[test]
fn test_times_zero_discards_pure_operand() {
    let operand = binary(BinaryOp::Add, index(var("a"), var("i")), var("n"));
    let program = program(
        "Calc",
        vec![method("zero", vec![ret(Some(binary(BinaryOp::Mul, operand, int(0))))])],
    );
    let output = compile(&program, &symbols());
    assert_eq!(method_ir(&output, "zero"), vec!["ret.i32 0.i32;"]);
}

#[test]
fn test_not_true() {
    let program = program(
        "Calc",
        vec![method("no", vec![ret(Some(unary(UnaryOp::Not, boolean(true))))])],
    );
    let output = compile(&program, &symbols());
    assert_eq!(method_ir(&output, "no"), vec!["ret.bool 0.bool;"]);
}

#[test]
fn test_constant_condition_selects_branch() {
    let program = program(
        "Calc",
        vec![method(
            "pick",
            vec![
                if_else(
                    binary(BinaryOp::Less, int(1), int(2)),
                    block(vec![assign("x", int(5))]),
                    block(vec![assign("x", int(6))]),
                ),
                ret(Some(var("x"))),
            ],
        )],
    );
    let output = compile(&program, &symbols());
    assert_eq!(method_ir(&output, "pick"), vec!["x.i32 :=.i32 5.i32;", "ret.i32 5.i32;"]);
}

#[test]
fn test_unoptimized_keeps_arithmetic() {
    let program = program(
        "Calc",
        vec![method("sum", vec![ret(Some(binary(BinaryOp::Add, int(1), int(2))))])],
    );
    let output = compile_unoptimized(&program, &symbols());
    assert_eq!(
        method_ir(&output, "sum"),
        vec!["tmp0.i32 :=.i32 1.i32 +.i32 2.i32;", "ret.i32 tmp0.i32;"]
    );
    assert_eq!(output.stats.constants_folded, 0);
}
