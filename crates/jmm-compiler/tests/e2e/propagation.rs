//! Constant propagation through the whole pipeline

use super::harness::*;
use jmm_ast::builder::*;
use jmm_ast::{BinaryOp, MethodSymbol, Param, SymbolTable, Type};
use jmm_compiler::{CompilerOptions, Optimizer};
use pretty_assertions::assert_eq;

fn symbols() -> SymbolTable {
    SymbolTable::new("Prop")
        .with_method(
            MethodSymbol::new("count", Type::int())
                .with_local("i", Type::int()),
        )
        .with_method(
            MethodSymbol::new("choose", Type::int())
                .with_param(Param::new("c", Type::boolean()))
                .with_local("x", Type::int()),
        )
        .with_method(
            MethodSymbol::new("chain", Type::int())
                .with_local("a", Type::int())
                .with_local("b", Type::int()),
        )
}

#[test]
fn test_loop_counter_is_left_alone() {
    let program = program(
        "Prop",
        vec![method(
            "count",
            vec![
                assign("i", int(0)),
                while_loop(
                    binary(BinaryOp::Less, var("i"), int(10)),
                    block(vec![assign("i", binary(BinaryOp::Add, var("i"), int(1)))]),
                ),
                ret(Some(var("i"))),
            ],
        )],
    );
    let output = compile(&program, &symbols());

    assert_eq!(final_method(&output, "count"), program.method("count").unwrap());
    assert_eq!(output.stats.constants_propagated, 0);
    assert_eq!(
        method_ir(&output, "count"),
        vec![
            "i.i32 :=.i32 0.i32;",
            "while_cond_0:",
            "tmp0.bool :=.bool i.i32 <.bool 10.i32;",
            "if (!.bool tmp0.bool) goto while_end_0;",
            "i.i32 :=.i32 i.i32 +.i32 1.i32;",
            "goto while_cond_0;",
            "while_end_0:",
            "ret.i32 i.i32;",
        ]
    );
}

fn choose(then_value: i32, else_value: i32) -> jmm_ast::Program {
    program(
        "Prop",
        vec![method(
            "choose",
            vec![
                if_else(
                    var("c"),
                    block(vec![assign("x", int(then_value))]),
                    block(vec![assign("x", int(else_value))]),
                ),
                ret(Some(var("x"))),
            ],
        )],
    )
}

#[test]
fn test_disagreeing_branches_block_propagation() {
    let output = compile(&choose(1, 2), &symbols());
    let ir = method_ir(&output, "choose");
    assert_eq!(ir.last().map(String::as_str), Some("ret.i32 x.i32;"));
}

#[test]
fn test_agreeing_branches_allow_propagation() {
    let output = compile(&choose(1, 1), &symbols());
    let ir = method_ir(&output, "choose");
    assert_eq!(ir.last().map(String::as_str), Some("ret.i32 1.i32;"));
}

#[test]
fn test_propagation_and_folding_interleave() {
    let program = program(
        "Prop",
        vec![method(
            "chain",
            vec![
                assign("a", int(3)),
                assign("b", binary(BinaryOp::Add, var("a"), int(4))),
                ret(Some(binary(BinaryOp::Mul, var("b"), int(2)))),
            ],
        )],
    );
    let output = compile(&program, &symbols());
    assert_eq!(
        method_ir(&output, "chain"),
        vec!["a.i32 :=.i32 3.i32;", "b.i32 :=.i32 7.i32;", "ret.i32 14.i32;"]
    );
}

#[test]
fn test_fixpoint_reports_no_further_change() {
    let program = program(
        "Prop",
        vec![
            method(
                "chain",
                vec![
                    assign("a", int(3)),
                    assign("b", binary(BinaryOp::Add, var("a"), int(4))),
                    ret(Some(binary(BinaryOp::Mul, var("b"), int(2)))),
                ],
            ),
            method(
                "count",
                vec![
                    assign("i", int(0)),
                    while_loop(
                        binary(BinaryOp::Less, var("i"), int(10)),
                        assign("i", binary(BinaryOp::Add, var("i"), int(1))),
                    ),
                    ret(Some(var("i"))),
                ],
            ),
        ],
    );
    let symbols = symbols();
    let output = compile(&program, &symbols);

    let options = CompilerOptions::default();
    let optimizer = Optimizer::new(&output.symbols, &options);
    for method in &output.program.class.methods {
        assert!(!optimizer.changes(method).unwrap(), "'{}' changed again", method.name);
    }
}
