//! Variadic parameters through the whole pipeline

use super::harness::*;
use jmm_ast::builder::*;
use jmm_ast::{ExprKind, Literal, MethodSymbol, Param, StmtKind, SymbolTable, Type};
use pretty_assertions::assert_eq;

fn symbols() -> SymbolTable {
    SymbolTable::new("Var")
        .with_method(MethodSymbol::new("f", Type::void()).with_param(Param::varargs("xs", Type::int())))
        .with_method(MethodSymbol::new("main", Type::void()).with_local("arr", Type::array("int", 1)))
}

#[test]
fn test_trailing_arguments_are_packed() {
    let program = program(
        "Var",
        vec![method(
            "main",
            vec![expr_stmt(call_this("f", vec![int(1), int(2), int(3)]))],
        )],
    );
    let output = compile(&program, &symbols());

    let StmtKind::Expr(call) = &final_method(&output, "main").body[0].kind else {
        panic!("expected a call statement");
    };
    let ExprKind::Call { args, .. } = &call.kind else {
        panic!("expected a call");
    };
    assert_eq!(args.len(), 1);
    let ExprKind::ArrayInit { elem, elements } = &args[0].kind else {
        panic!("expected an array initializer, got {:?}", args[0]);
    };
    assert_eq!(*elem, Type::int());
    let values: Vec<_> = elements.iter().filter_map(|e| e.as_literal()).collect();
    assert_eq!(values, vec![Literal::Int(1), Literal::Int(2), Literal::Int(3)]);

    assert_eq!(
        method_ir(&output, "main"),
        vec![
            "tmp0.array.i32 :=.array.i32 new(array, 3.i32).array.i32;",
            "tmp0.array.i32[0.i32].i32 :=.i32 1.i32;",
            "tmp0.array.i32[1.i32].i32 :=.i32 2.i32;",
            "tmp0.array.i32[2.i32].i32 :=.i32 3.i32;",
            "invokevirtual(this, \"f\", tmp0.array.i32).V;",
            "ret.V;",
        ]
    );
}

#[test]
fn test_array_argument_passes_through() {
    let program = program(
        "Var",
        vec![method("main", vec![expr_stmt(call_this("f", vec![var("arr")]))])],
    );
    let output = compile(&program, &symbols());
    assert_eq!(
        method_ir(&output, "main"),
        vec!["invokevirtual(this, \"f\", arr.array.i32).V;", "ret.V;"]
    );
}

#[test]
fn test_parameter_becomes_an_array() {
    let program = program(
        "Var",
        vec![method("f", vec![ret(None)])],
    );
    let output = compile(&program, &symbols());

    let xs = &output.symbols.method("f").unwrap().params[0];
    assert!(!xs.is_varargs);
    assert_eq!(xs.ty, Type::array("int", 1));

    let signature = module(&output).method("f").unwrap();
    assert_eq!(signature.params[0].ty.to_string(), "array.i32");
    assert_eq!(method_ir(&output, "f"), vec!["ret.V;"]);
}
