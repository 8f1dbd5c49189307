//! Expression type resolver
//!
//! Resolution order for a node:
//! 1. a type annotation recorded by the frontend is trusted as is
//! 2. literals map to their base type
//! 3. names resolve through the symbol table (parameter, local, field,
//!    imported class)
//! 4. operators, array accesses and calls follow the typing rules below
//!
//! Results are memoized per node for the current method; switching methods
//! clears the cache because variable names are method-scoped.

use super::error::{ResolveError, SemanticError};
use crate::depth::DepthLimit;
use crate::error::CompileResult;
use jmm_ast::ast::{BinaryOp, Expr, ExprKind, MethodDecl, NodeId, Stmt, StmtKind, UnaryOp};
use jmm_ast::{Binding, MethodSymbol, SymbolTable, Type};
use rustc_hash::FxHashMap;

type Resolved = Result<Type, ResolveError>;

/// Call-name prefixes that suggest an `int` result for external methods
const INT_PREFIXES: &[&str] = &["get", "find", "calc"];
/// Call-name prefixes that suggest a `boolean` result for external methods
const BOOLEAN_PREFIXES: &[&str] = &["is", "has", "can"];

/// Resolved types of one method's expressions, keyed by node id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeTable {
    types: FxHashMap<NodeId, Type>,
}

impl TypeTable {
    pub fn get(&self, id: NodeId) -> Option<&Type> {
        self.types.get(&id)
    }

    pub fn type_of(&self, expr: &Expr) -> Option<&Type> {
        self.get(expr.id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Resolves static types of expressions
pub struct TypeResolver<'a> {
    symbols: &'a SymbolTable,
    method: Option<&'a MethodSymbol>,
    cache: FxHashMap<NodeId, Type>,
    limit: DepthLimit,
}

impl<'a> TypeResolver<'a> {
    pub fn new(symbols: &'a SymbolTable, max_depth: usize) -> Self {
        Self {
            symbols,
            method: None,
            cache: FxHashMap::default(),
            limit: DepthLimit::new(max_depth, ""),
        }
    }

    /// Switch to another method, dropping every cached type
    pub fn set_method(&mut self, name: &str) {
        self.method = self.symbols.method(name);
        if self.method.is_none() {
            log::debug!("method '{}' is not in the symbol table", name);
        }
        self.cache.clear();
        self.limit = DepthLimit::new(self.limit.max(), name);
    }

    pub fn current_method(&self) -> Option<&'a MethodSymbol> {
        self.method
    }

    /// Declared type of a name visible in the current method
    ///
    /// A variadic parameter is seen as an array inside the method body.
    pub fn variable_type(&self, name: &str) -> Option<Type> {
        match self.symbols.lookup(self.method, name)? {
            Binding::Param(param, _) if param.is_varargs => Some(param.ty.array_of()),
            Binding::Param(param, _) => Some(param.ty.clone()),
            Binding::Local(symbol) | Binding::Field(symbol) => Some(symbol.ty.clone()),
            Binding::Import(_) => None,
        }
    }

    pub fn type_of(&mut self, expr: &Expr) -> Resolved {
        self.type_of_hinted(expr, None)
    }

    /// Resolve with the type the surrounding context expects
    ///
    /// The hint only matters for calls into classes whose signatures are not
    /// visible (imports, the superclass).
    pub fn type_of_hinted(&mut self, expr: &Expr, hint: Option<&Type>) -> Resolved {
        self.resolve(expr, hint, 0)
    }

    /// Resolve every expression of a method once
    ///
    /// Returns the resulting type table together with the type errors found,
    /// at most one per statement-level expression.
    pub fn annotate_method(
        &mut self,
        method: &MethodDecl,
    ) -> CompileResult<(TypeTable, Vec<SemanticError>)> {
        self.set_method(&method.name);
        let mut errors = Vec::new();
        for stmt in &method.body {
            self.annotate_stmt(stmt, &mut errors, 0)?;
        }
        let table = TypeTable {
            types: std::mem::take(&mut self.cache),
        };
        log::trace!("annotated {} expressions in '{}'", table.len(), method.name);
        Ok((table, errors))
    }

    fn annotate_stmt(
        &mut self,
        stmt: &Stmt,
        errors: &mut Vec<SemanticError>,
        depth: usize,
    ) -> CompileResult<()> {
        let depth = self.limit.descend(depth)?;
        match &stmt.kind {
            StmtKind::Block(stmts) => {
                for stmt in stmts {
                    self.annotate_stmt(stmt, errors, depth)?;
                }
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.annotate_root(cond, Some(&Type::boolean()), errors, depth)?;
                self.annotate_stmt(then_branch, errors, depth)?;
                if let Some(else_branch) = else_branch {
                    self.annotate_stmt(else_branch, errors, depth)?;
                }
            }
            StmtKind::While { cond, body } => {
                self.annotate_root(cond, Some(&Type::boolean()), errors, depth)?;
                self.annotate_stmt(body, errors, depth)?;
            }
            StmtKind::Assign { target, value } => {
                let hint = self.variable_type(target);
                self.annotate_root(value, hint.as_ref(), errors, depth)?;
            }
            StmtKind::IndexAssign {
                target,
                index,
                value,
            } => {
                self.annotate_root(index, Some(&Type::int()), errors, depth)?;
                let elem = self.variable_type(target).and_then(|ty| ty.element());
                self.annotate_root(value, elem.as_ref(), errors, depth)?;
            }
            StmtKind::Expr(expr) => {
                // A call whose result is dropped is treated as void
                self.annotate_root(expr, Some(&Type::void()), errors, depth)?;
            }
            StmtKind::Return(Some(value)) => {
                let ret = self.method.map(|m| m.return_type.clone());
                self.annotate_root(value, ret.as_ref(), errors, depth)?;
            }
            StmtKind::Return(None) => {}
        }
        Ok(())
    }

    fn annotate_root(
        &mut self,
        expr: &Expr,
        hint: Option<&Type>,
        errors: &mut Vec<SemanticError>,
        depth: usize,
    ) -> CompileResult<()> {
        match self.resolve(expr, hint, depth) {
            Ok(_) | Err(ResolveError::Unresolved) => Ok(()),
            Err(ResolveError::Semantic(error)) => {
                errors.push(error);
                Ok(())
            }
            Err(ResolveError::Fatal(error)) => Err(error),
        }
    }

    fn resolve(&mut self, expr: &Expr, hint: Option<&Type>, depth: usize) -> Resolved {
        let depth = self.limit.descend(depth)?;
        if let Some(ty) = self.cache.get(&expr.id) {
            return Ok(ty.clone());
        }
        let ty = self.resolve_uncached(expr, hint, depth)?;
        // synthesized nodes are not numbered yet and cannot be cached
        if expr.id != NodeId::UNASSIGNED {
            self.cache.insert(expr.id, ty.clone());
        }
        Ok(ty)
    }

    /// Resolve a child, mapping "no information" to `None`
    fn known(&mut self, expr: &Expr, hint: Option<&Type>, depth: usize) -> Result<Option<Type>, ResolveError> {
        match self.resolve(expr, hint, depth) {
            Ok(ty) => Ok(Some(ty)),
            Err(ResolveError::Unresolved) => Ok(None),
            Err(error) => Err(error),
        }
    }

    fn resolve_uncached(&mut self, expr: &Expr, hint: Option<&Type>, depth: usize) -> Resolved {
        if let Some(annotated) = &expr.ty {
            for child in expr.children() {
                self.known(child, None, depth)?;
            }
            return Ok(annotated.clone());
        }

        match &expr.kind {
            ExprKind::Literal(lit) => Ok(lit.ty()),
            ExprKind::Var(name) => self.resolve_name(name),
            ExprKind::This => Ok(self.class_type()),
            ExprKind::Binary { op, left, right } => self.resolve_binary(*op, left, right, depth),
            ExprKind::Unary { op, operand } => {
                let (expected, result) = match op {
                    UnaryOp::Neg => (Type::int(), Type::int()),
                    UnaryOp::Not => (Type::boolean(), Type::boolean()),
                };
                if let Some(ty) = self.known(operand, Some(&expected), depth)? {
                    if ty != expected {
                        return Err(SemanticError::InvalidUnaryOperand {
                            op: op.to_string(),
                            ty,
                            span: operand.span,
                        }
                        .into());
                    }
                }
                Ok(result)
            }
            ExprKind::Index { array, index } => {
                let array_ty = self.known(array, None, depth)?;
                let index_ty = self.known(index, Some(&Type::int()), depth)?;
                let Some(array_ty) = array_ty else {
                    return Err(ResolveError::Unresolved);
                };
                let Some(elem) = array_ty.element() else {
                    return Err(SemanticError::NonArrayAccess {
                        ty: array_ty,
                        span: array.span,
                    }
                    .into());
                };
                if let Some(index_ty) = index_ty {
                    if !index_ty.is_int() {
                        return Err(SemanticError::IndexNotInt {
                            position: "index",
                            ty: index_ty,
                            span: index.span,
                        }
                        .into());
                    }
                }
                Ok(elem)
            }
            ExprKind::Length(array) => {
                if let Some(ty) = self.known(array, None, depth)? {
                    if !ty.is_array() {
                        return Err(SemanticError::NonArrayAccess { ty, span: array.span }.into());
                    }
                }
                Ok(Type::int())
            }
            ExprKind::Field { object, name } => {
                let object_ty = self.known(object, None, depth)?;
                let on_own_class =
                    matches!(object.kind, ExprKind::This) || object_ty == Some(self.class_type());
                if !on_own_class {
                    return Err(ResolveError::Unresolved);
                }
                self.symbols
                    .field(name)
                    .map(|f| f.ty.clone())
                    .ok_or(ResolveError::Unresolved)
            }
            ExprKind::Call {
                receiver,
                method,
                args,
            } => self.resolve_call(receiver.as_deref(), method, args, hint, depth),
            ExprKind::NewObject(class) => Ok(Type::scalar(class.clone())),
            ExprKind::NewArray { elem, size } => {
                if let Some(ty) = self.known(size, Some(&Type::int()), depth)? {
                    if !ty.is_int() {
                        return Err(SemanticError::IndexNotInt {
                            position: "size",
                            ty,
                            span: size.span,
                        }
                        .into());
                    }
                }
                Ok(elem.array_of())
            }
            ExprKind::ArrayInit { elem, elements } => {
                for element in elements {
                    if let Some(ty) = self.known(element, Some(elem), depth)? {
                        if ty != *elem {
                            return Err(SemanticError::TypeMismatch {
                                context: "array initializer".to_string(),
                                expected: format!("'{}'", elem),
                                found: ty,
                                span: element.span,
                            }
                            .into());
                        }
                    }
                }
                Ok(elem.array_of())
            }
        }
    }

    fn resolve_name(&self, name: &str) -> Resolved {
        if let Some(ty) = self.variable_type(name) {
            return Ok(ty);
        }
        // class names used as call receivers
        if self.symbols.is_known_class(name) {
            return Ok(Type::scalar(name));
        }
        log::debug!("no binding for '{}'", name);
        Err(ResolveError::Unresolved)
    }

    fn resolve_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr, depth: usize) -> Resolved {
        let (operand, result) = if op.is_arithmetic() {
            (Some(Type::int()), Type::int())
        } else if op.is_relational() {
            (Some(Type::int()), Type::boolean())
        } else if op.is_logical() {
            (Some(Type::boolean()), Type::boolean())
        } else {
            (None, Type::boolean())
        };

        let left_ty = self.known(left, operand.as_ref(), depth)?;
        let right_ty = self.known(right, operand.as_ref(), depth)?;
        let context = format!("operator '{}'", op);

        match operand {
            Some(expected) => {
                for (ty, side) in [(left_ty, left), (right_ty, right)] {
                    if let Some(ty) = ty {
                        if ty != expected {
                            return Err(SemanticError::TypeMismatch {
                                context: context.clone(),
                                expected: format!("'{}'", expected),
                                found: ty,
                                span: side.span,
                            }
                            .into());
                        }
                    }
                }
            }
            // equality: both sides must agree, array-ness included
            None => {
                if let (Some(l), Some(r)) = (left_ty, right_ty) {
                    if l != r {
                        return Err(SemanticError::TypeMismatch {
                            context,
                            expected: format!("'{}'", l),
                            found: r,
                            span: right.span,
                        }
                        .into());
                    }
                }
            }
        }
        Ok(result)
    }

    fn resolve_call(
        &mut self,
        receiver: Option<&Expr>,
        method: &str,
        args: &[Expr],
        hint: Option<&Type>,
        depth: usize,
    ) -> Resolved {
        let receiver_ty = match receiver {
            Some(receiver) => self.known(receiver, None, depth)?,
            None => None,
        };
        let on_own_class = match receiver {
            None => true,
            Some(receiver) => {
                matches!(receiver.kind, ExprKind::This) || receiver_ty == Some(self.class_type())
            }
        };
        let callee = if on_own_class {
            self.symbols.method(method)
        } else {
            None
        };

        for (i, arg) in args.iter().enumerate() {
            let param_hint = callee
                .and_then(|c| c.params.get(i))
                .filter(|p| !p.is_varargs)
                .map(|p| p.ty.clone());
            self.known(arg, param_hint.as_ref(), depth)?;
        }

        match callee {
            Some(callee) => Ok(callee.return_type.clone()),
            None => external_call_type(method, hint),
        }
    }

    fn class_type(&self) -> Type {
        Type::scalar(self.symbols.class_name.clone())
    }
}

/// Best guess for the result of a call whose signature is not visible
fn external_call_type(method: &str, hint: Option<&Type>) -> Resolved {
    if let Some(hint) = hint {
        return Ok(hint.clone());
    }
    if INT_PREFIXES.iter().any(|p| method.starts_with(p)) {
        return Ok(Type::int());
    }
    if BOOLEAN_PREFIXES.iter().any(|p| method.starts_with(p)) {
        return Ok(Type::boolean());
    }
    log::debug!("cannot infer the result type of external call '{}'", method);
    Err(ResolveError::Unresolved)
}
