//! Control flow lowering: branches, loops, short-circuit operators, labels

use super::harness::*;
use jmm_ast::builder::*;
use jmm_ast::{BinaryOp, MethodSymbol, Param, Program, SymbolTable, Type};
use jmm_compiler::{BranchLayout, CompilerOptions};
use pretty_assertions::assert_eq;
use rustc_hash::FxHashSet;

fn symbols() -> SymbolTable {
    SymbolTable::new("Flow")
        .with_method(MethodSymbol::new("sideEffect", Type::boolean()))
        .with_method(MethodSymbol::new("run", Type::boolean()).with_local("b", Type::boolean()))
        .with_method(
            MethodSymbol::new("steps", Type::int())
                .with_param(Param::new("n", Type::int()))
                .with_param(Param::new("c", Type::boolean()))
                .with_local("x", Type::int()),
        )
}

fn short_circuit(op: BinaryOp, left: bool) -> Program {
    program(
        "Flow",
        vec![method(
            "run",
            vec![
                assign("b", binary(op, boolean(left), call_this("sideEffect", vec![]))),
                ret(Some(var("b"))),
            ],
        )],
    )
}

#[test]
fn test_and_skips_right_operand() {
    let output = compile_unoptimized(&short_circuit(BinaryOp::And, false), &symbols());
    let ir = method_ir(&output, "run");
    assert_eq!(
        ir,
        vec![
            "if (0.bool) goto and_rhs_0;",
            "tmp0.bool :=.bool 0.bool;",
            "goto and_end_0;",
            "and_rhs_0:",
            "tmp1.bool :=.bool invokevirtual(this, \"sideEffect\").bool;",
            "tmp0.bool :=.bool tmp1.bool;",
            "and_end_0:",
            "b.bool :=.bool tmp0.bool;",
            "ret.bool b.bool;",
        ]
    );
}

#[test]
fn test_or_skips_right_operand() {
    let output = compile_unoptimized(&short_circuit(BinaryOp::Or, true), &symbols());
    let ir = method_ir(&output, "run");

    // the call sits on the fall-through of the test, which a true left
    // operand jumps over
    let test = position(&ir, "if (1.bool) goto or_true_0;");
    let call = position(&ir, "sideEffect");
    let skip = position(&ir, "goto or_end_0;");
    let taken = position(&ir, "or_true_0:");
    assert!(test < call && call < skip && skip < taken);
    assert_eq!(ir[taken + 1], "tmp0.bool :=.bool 1.bool;");
}

#[test]
fn test_optimized_short_circuit_drops_the_call() {
    for (op, left) in [(BinaryOp::And, false), (BinaryOp::Or, true)] {
        let output = compile(&short_circuit(op, left), &symbols());
        let ir = method_ir(&output, "run");
        assert!(ir.iter().all(|line| !line.contains("sideEffect")), "{:?}", ir);
    }
}

fn branches_and_loop() -> Program {
    program(
        "Flow",
        vec![method(
            "steps",
            vec![
                assign("x", int(0)),
                if_then(var("c"), assign("x", int(1))),
                if_else(
                    binary(BinaryOp::Greater, var("n"), int(3)),
                    assign("x", int(2)),
                    assign("x", int(3)),
                ),
                while_loop(
                    binary(BinaryOp::Less, var("x"), var("n")),
                    assign("x", binary(BinaryOp::Add, var("x"), int(1))),
                ),
                ret(Some(var("x"))),
            ],
        )],
    )
}

#[test]
fn test_labels_are_distinct() {
    let output = compile_unoptimized(&branches_and_loop(), &symbols());
    let labels = module(&output).method("steps").map(|m| m.labels()).unwrap_or_default();

    assert_eq!(
        labels,
        vec!["if_then_0", "if_end_0", "if_then_1", "if_end_1", "while_cond_0", "while_end_0"]
    );
    let distinct: FxHashSet<&String> = labels.iter().collect();
    assert_eq!(distinct.len(), labels.len());
}

#[test]
fn test_every_jump_has_a_target() {
    for layout in [BranchLayout::ElseFirst, BranchLayout::ThenFirst] {
        let options = CompilerOptions::default().with_branch_layout(layout);
        let output = compile_with(&branches_and_loop(), &symbols(), options);
        let method = module(&output).method("steps").unwrap();
        let labels = method.labels();
        for instr in &method.body {
            if let Some(target) = instr.jump_target() {
                assert!(labels.contains(&target.to_string()), "dangling jump: {}", instr);
            }
        }
    }
}

#[test]
fn test_then_first_without_else() {
    let program = program(
        "Flow",
        vec![method(
            "steps",
            vec![if_then(var("c"), assign("x", int(1))), ret(Some(var("x")))],
        )],
    );
    let options = CompilerOptions::default()
        .without_optimizations()
        .with_branch_layout(BranchLayout::ThenFirst);
    let output = compile_with(&program, &symbols(), options);
    assert_eq!(
        method_ir(&output, "steps"),
        vec![
            "if (!.bool c.bool) goto if_end_0;",
            "x.i32 :=.i32 1.i32;",
            "if_end_0:",
            "ret.i32 x.i32;",
        ]
    );
}

#[test]
fn test_else_first_without_else() {
    let program = program(
        "Flow",
        vec![method(
            "steps",
            vec![if_then(var("c"), assign("x", int(1))), ret(Some(var("x")))],
        )],
    );
    let output = compile_unoptimized(&program, &symbols());
    assert_eq!(
        method_ir(&output, "steps"),
        vec![
            "if (c.bool) goto if_then_0;",
            "goto if_end_0;",
            "if_then_0:",
            "x.i32 :=.i32 1.i32;",
            "if_end_0:",
            "ret.i32 x.i32;",
        ]
    );
}

#[test]
fn test_nested_structures_take_their_own_index() {
    let program = program(
        "Flow",
        vec![method(
            "steps",
            vec![
                while_loop(
                    var("c"),
                    block(vec![
                        if_then(var("c"), assign("x", int(1))),
                        while_loop(var("c"), assign("x", int(2))),
                    ]),
                ),
                ret(Some(var("x"))),
            ],
        )],
    );
    let output = compile_unoptimized(&program, &symbols());
    let labels = module(&output).method("steps").unwrap().labels();
    assert_eq!(
        labels,
        vec![
            "while_cond_0",
            "if_then_0",
            "if_end_0",
            "while_cond_1",
            "while_end_1",
            "while_end_0",
        ]
    );
}
