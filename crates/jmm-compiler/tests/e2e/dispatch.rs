//! Call dispatch and object construction

use super::harness::*;
use jmm_ast::builder::*;
use jmm_ast::{MethodSymbol, Param, SymbolTable, Type};
use jmm_compiler::PrettyPrint;
use pretty_assertions::assert_eq;

fn symbols() -> SymbolTable {
    SymbolTable::new("Shop")
        .with_superclass("Store")
        .with_import("io")
        .with_field("total", Type::int())
        .with_method(
            MethodSymbol::new("main", Type::void())
                .with_static(true)
                .with_param(Param::new("args", Type::array("String", 1)))
                .with_local("shop", Type::scalar("Shop"))
                .with_local("x", Type::int()),
        )
        .with_method(MethodSymbol::new("price", Type::int()).with_static(true))
        .with_method(MethodSymbol::new("total", Type::int()))
}

#[test]
fn test_call_kinds() {
    let program = program(
        "Shop",
        vec![method(
            "main",
            vec![
                assign("shop", new_object("Shop")),
                assign("x", call(var("shop"), "total", vec![])),
                assign("x", call_this("price", vec![])),
                expr_stmt(call(var("io"), "println", vec![var("x")])),
                expr_stmt(call(var("Store"), "open", vec![])),
            ],
        )],
    );
    let output = compile(&program, &symbols());
    assert_eq!(
        method_ir(&output, "main"),
        vec![
            "tmp0.Shop :=.Shop new(Shop).Shop;",
            "invokespecial(tmp0.Shop, \"<init>\").V;",
            "shop.Shop :=.Shop tmp0.Shop;",
            "x.i32 :=.i32 invokevirtual(shop.Shop, \"total\").i32;",
            "x.i32 :=.i32 invokestatic(Shop, \"price\").i32;",
            "invokestatic(io, \"println\", x.i32).V;",
            "invokespecial(this, \"open\").V;",
            "ret.V;",
        ]
    );
}

#[test]
fn test_field_access_goes_through_this() {
    let program = program(
        "Shop",
        vec![method(
            "total",
            vec![
                assign("total", binary(jmm_ast::BinaryOp::Mul, var("total"), int(2))),
                ret(Some(field(this(), "total"))),
            ],
        )],
    );
    let output = compile(&program, &symbols());
    assert_eq!(
        method_ir(&output, "total"),
        vec![
            "tmp0.i32 :=.i32 getfield(this, total.i32).i32;",
            "tmp1.i32 :=.i32 tmp0.i32 *.i32 2.i32;",
            "putfield(this, total.i32, tmp1.i32).V;",
            "tmp2.i32 :=.i32 getfield(this, total.i32).i32;",
            "ret.i32 tmp2.i32;",
        ]
    );
}

#[test]
fn test_class_layout() {
    let program = program(
        "Shop",
        vec![method("price", vec![ret(Some(int(4)))])],
    );
    let output = compile(&program, &symbols());
    let expected = "\
import io;
Shop extends Store {
    .field private total.i32;
    .construct Shop().V {
        invokespecial(this, \"<init>\").V;
    }
    .method public static price().i32 {
        ret.i32 4.i32;
    }
}
";
    assert_eq!(module(&output).pretty_print(), expected);
}
