//! Variadic parameter lowering
//!
//! A variadic parameter `int... xs` becomes an ordinary `int[] xs`. Every
//! call site targeting such a method gets its trailing arguments packed into
//! one array initializer, unless it already passes a single array of the
//! right type.

use crate::depth::DepthLimit;
use crate::error::CompileResult;
use crate::types::{ResolveError, TypeResolver};
use jmm_ast::ast::{Expr, ExprKind, MethodDecl, Stmt, StmtKind};
use jmm_ast::{Program, SymbolTable, Type};
use rustc_hash::FxHashMap;

/// Shape of a variadic method's parameter list
#[derive(Debug, Clone)]
struct VariadicSignature {
    /// Number of parameters before the variadic one
    fixed: usize,
    /// Element type of the variadic parameter
    elem: Type,
}

/// Result of lowering a program
#[derive(Debug, Clone)]
pub struct LoweredVarargs {
    pub program: Program,
    pub symbols: SymbolTable,
    /// Whether any parameter or call site was rewritten
    pub changed: bool,
}

/// Lower every variadic parameter of a program
///
/// Types are resolved against the original symbol table, where the variadic
/// parameters are still marked as such.
pub fn lower_varargs(program: &Program, symbols: &SymbolTable, max_depth: usize) -> CompileResult<LoweredVarargs> {
    let signatures: FxHashMap<String, VariadicSignature> = symbols
        .methods
        .iter()
        .filter_map(|method| {
            method.varargs_param().map(|param| {
                (
                    method.name.clone(),
                    VariadicSignature {
                        fixed: method.fixed_param_count(),
                        elem: param.ty.clone(),
                    },
                )
            })
        })
        .collect();

    if signatures.is_empty() {
        return Ok(LoweredVarargs {
            program: program.clone(),
            symbols: symbols.clone(),
            changed: false,
        });
    }

    let mut lowered_symbols = symbols.clone();
    for method in &mut lowered_symbols.methods {
        for param in method.params.iter_mut().filter(|p| p.is_varargs) {
            log::debug!("lowering variadic parameter '{}' of '{}'", param.name, method.name);
            param.ty = param.ty.array_of();
            param.is_varargs = false;
        }
    }

    let mut lowering = VarargsLowering {
        class_name: &symbols.class_name,
        signatures: &signatures,
        resolver: TypeResolver::new(symbols, max_depth),
        max_depth,
        packed: 0,
    };
    let mut lowered = program.clone();
    for method in &mut lowered.class.methods {
        *method = lowering.lower_method(method)?;
    }
    if lowering.packed > 0 {
        lowered.renumber();
    }

    Ok(LoweredVarargs {
        program: lowered,
        symbols: lowered_symbols,
        changed: true,
    })
}

struct VarargsLowering<'a> {
    class_name: &'a str,
    signatures: &'a FxHashMap<String, VariadicSignature>,
    resolver: TypeResolver<'a>,
    max_depth: usize,
    /// Number of call sites rewritten
    packed: usize,
}

impl VarargsLowering<'_> {
    fn lower_method(&mut self, method: &MethodDecl) -> CompileResult<MethodDecl> {
        self.resolver.set_method(&method.name);
        let limit = DepthLimit::new(self.max_depth, method.name.as_str());
        let body = method
            .body
            .iter()
            .map(|stmt| self.lower_stmt(stmt, &limit, 0))
            .collect::<CompileResult<Vec<_>>>()?;
        Ok(MethodDecl {
            name: method.name.clone(),
            body,
            span: method.span,
        })
    }

    fn lower_stmt(&mut self, stmt: &Stmt, limit: &DepthLimit, depth: usize) -> CompileResult<Stmt> {
        let depth = limit.descend(depth)?;
        let kind = match &stmt.kind {
            StmtKind::Block(stmts) => StmtKind::Block(
                stmts
                    .iter()
                    .map(|s| self.lower_stmt(s, limit, depth))
                    .collect::<CompileResult<Vec<_>>>()?,
            ),
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => StmtKind::If {
                cond: self.lower_expr(cond, limit, depth)?,
                then_branch: Box::new(self.lower_stmt(then_branch, limit, depth)?),
                else_branch: match else_branch {
                    Some(else_branch) => Some(Box::new(self.lower_stmt(else_branch, limit, depth)?)),
                    None => None,
                },
            },
            StmtKind::While { cond, body } => StmtKind::While {
                cond: self.lower_expr(cond, limit, depth)?,
                body: Box::new(self.lower_stmt(body, limit, depth)?),
            },
            StmtKind::Assign { target, value } => StmtKind::Assign {
                target: target.clone(),
                value: self.lower_expr(value, limit, depth)?,
            },
            StmtKind::IndexAssign { target, index, value } => StmtKind::IndexAssign {
                target: target.clone(),
                index: self.lower_expr(index, limit, depth)?,
                value: self.lower_expr(value, limit, depth)?,
            },
            StmtKind::Expr(expr) => StmtKind::Expr(self.lower_expr(expr, limit, depth)?),
            StmtKind::Return(value) => StmtKind::Return(match value {
                Some(value) => Some(self.lower_expr(value, limit, depth)?),
                None => None,
            }),
        };
        Ok(Stmt::new(kind, stmt.span))
    }

    fn lower_expr(&mut self, expr: &Expr, limit: &DepthLimit, depth: usize) -> CompileResult<Expr> {
        let depth = limit.descend(depth)?;
        // decide on the original node, whose ids the resolver knows
        let packing = self.packing_for(expr)?;

        let mut lowered = expr.clone();
        for child in lowered.children_mut() {
            *child = self.lower_expr(child, limit, depth)?;
        }

        if let (Some(signature), ExprKind::Call { args, .. }) = (packing, &mut lowered.kind) {
            let start = signature.fixed.min(args.len());
            let elements: Vec<Expr> = args.drain(start..).collect();
            let span = elements.first().map_or(expr.span, |e| e.span);
            log::trace!("packing {} arguments into '{}[]'", elements.len(), signature.elem);
            args.push(Expr::new(
                ExprKind::ArrayInit {
                    elem: signature.elem.clone(),
                    elements,
                },
                span,
            ));
            self.packed += 1;
        }
        Ok(lowered)
    }

    /// The signature to pack a call's trailing arguments for, if any
    fn packing_for(&mut self, expr: &Expr) -> CompileResult<Option<VariadicSignature>> {
        let ExprKind::Call {
            receiver,
            method,
            args,
        } = &expr.kind
        else {
            return Ok(None);
        };
        let Some(signature) = self.signatures.get(method) else {
            return Ok(None);
        };
        if !self.targets_own_class(receiver.as_deref())? {
            return Ok(None);
        }

        // a single array of the element type is passed through
        if args.len() == signature.fixed + 1 {
            let expected = signature.elem.array_of();
            if self.resolved(&args[signature.fixed])? == Some(expected) {
                return Ok(None);
            }
        }
        Ok(Some(signature.clone()))
    }

    fn targets_own_class(&mut self, receiver: Option<&Expr>) -> CompileResult<bool> {
        let Some(receiver) = receiver else {
            return Ok(true);
        };
        if matches!(receiver.kind, ExprKind::This) {
            return Ok(true);
        }
        Ok(self.resolved(receiver)? == Some(Type::scalar(self.class_name)))
    }

    fn resolved(&mut self, expr: &Expr) -> CompileResult<Option<Type>> {
        match self.resolver.type_of(expr) {
            Ok(ty) => Ok(Some(ty)),
            Err(ResolveError::Fatal(error)) => Err(error),
            Err(_) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jmm_ast::ast::Literal;
    use jmm_ast::builder::*;
    use jmm_ast::{MethodSymbol, Param};
    use pretty_assertions::assert_eq;

    fn symbols() -> SymbolTable {
        SymbolTable::new("Foo")
            .with_import("io")
            .with_method(
                MethodSymbol::new("sum", Type::int())
                    .with_param(Param::new("base", Type::int()))
                    .with_param(Param::varargs("xs", Type::int())),
            )
            .with_method(MethodSymbol::new("main", Type::int()).with_local("arr", Type::array("int", 1)))
    }

    fn call_args(program: &Program) -> Vec<Vec<Expr>> {
        program
            .method("main")
            .unwrap()
            .body
            .iter()
            .filter_map(|stmt| match &stmt.kind {
                StmtKind::Expr(Expr {
                    kind: ExprKind::Call { args, .. },
                    ..
                }) => Some(args.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_packs_trailing_arguments() {
        let program = program(
            "Foo",
            vec![method(
                "main",
                vec![expr_stmt(call_this("sum", vec![int(0), int(1), int(2), int(3)]))],
            )],
        );
        let lowered = lower_varargs(&program, &symbols(), 64).unwrap();
        assert!(lowered.changed);

        let args = &call_args(&lowered.program)[0];
        assert_eq!(args.len(), 2);
        assert_eq!(args[0].as_literal(), Some(Literal::Int(0)));
        let ExprKind::ArrayInit { elem, elements } = &args[1].kind else {
            panic!("expected array initializer, found {:?}", args[1].kind);
        };
        assert_eq!(elem, &Type::int());
        let values: Vec<_> = elements.iter().filter_map(Expr::as_literal).collect();
        assert_eq!(values, vec![Literal::Int(1), Literal::Int(2), Literal::Int(3)]);
    }

    #[test]
    fn test_array_argument_passes_through() {
        let program = program(
            "Foo",
            vec![method(
                "main",
                vec![
                    expr_stmt(call(this(), "sum", vec![int(0), var("arr")])),
                    expr_stmt(call_this("sum", vec![int(0)])),
                ],
            )],
        );
        let lowered = lower_varargs(&program, &symbols(), 64).unwrap();
        let calls = call_args(&lowered.program);
        assert_eq!(calls[0][1].as_var(), Some("arr"));
        // no variadic arguments at all still builds an empty array
        assert!(matches!(&calls[1][1].kind, ExprKind::ArrayInit { elements, .. } if elements.is_empty()));
    }

    #[test]
    fn test_symbol_table_is_rewritten() {
        let program = program("Foo", vec![method("main", vec![])]);
        let lowered = lower_varargs(&program, &symbols(), 64).unwrap();
        let param = lowered.symbols.method("sum").unwrap().param("xs").unwrap();
        assert_eq!(param.ty, Type::array("int", 1));
        assert!(!param.is_varargs);

        let again = lower_varargs(&lowered.program, &lowered.symbols, 64).unwrap();
        assert!(!again.changed);
        assert_eq!(again.program, lowered.program);
    }

    #[test]
    fn test_external_calls_are_untouched() {
        let program = program(
            "Foo",
            vec![method("main", vec![expr_stmt(call(var("io"), "sum", vec![int(1), int(2)]))])],
        );
        let lowered = lower_varargs(&program, &symbols(), 64).unwrap();
        assert_eq!(call_args(&lowered.program)[0].len(), 2);
    }
}
