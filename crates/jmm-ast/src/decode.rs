//! Decoding of the frontend's generic node tree
//!
//! The frontend hands over every node as `{ kind, children, attributes }`
//! with string-valued attributes. [`decode_program`] converts that shape
//! into the typed tree once, so no later pass dispatches on kind strings.
//!
//! Recognized kinds:
//!
//! | kind               | attributes          | children                    |
//! |--------------------|---------------------|-----------------------------|
//! | `Program`          |                     | `ClassDecl`, declarations   |
//! | `ClassDecl`        | `name`              | `MethodDecl`, declarations  |
//! | `MethodDecl`       | `name`              | statements                  |
//! | `Block`            |                     | statements                  |
//! | `IfStmt`           |                     | cond, then, else?           |
//! | `WhileStmt`        |                     | cond, body                  |
//! | `AssignStmt`       | `name`              | value                       |
//! | `ArrayAssignStmt`  | `name`              | index, value                |
//! | `ExprStmt`         |                     | expr                        |
//! | `ReturnStmt`       |                     | value?                      |
//! | `IntegerLiteral`   | `value`             |                             |
//! | `BooleanLiteral`   | `value`             |                             |
//! | `VarRefExpr`       | `name`              |                             |
//! | `ThisExpr`         |                     |                             |
//! | `ParenExpr`        |                     | expr                        |
//! | `BinaryExpr`       | `op`                | left, right                 |
//! | `UnaryExpr`        | `op`                | operand                     |
//! | `ArrayAccessExpr`  |                     | array, index                |
//! | `ArrayLengthExpr`  |                     | array                       |
//! | `FieldAccessExpr`  | `name`              | object                      |
//! | `MethodCallExpr`   | `name`              | receiver, args...           |
//! | `FuncCallExpr`     | `name`              | args... (implicit `this`)   |
//! | `NewObjectExpr`    | `name`              |                             |
//! | `NewArrayExpr`     | `name` (element)    | size                        |
//! | `ArrayInitExpr`    | `name` (element)    | elements...                 |
//!
//! Declaration kinds (`ImportDecl`, `VarDecl`, `FieldDecl`, `Param`, `Type`)
//! are described by the symbol table and skipped here. Any expression node
//! may carry a resolved type as `type` plus `isArray`/`dims`. A `-`
//! `UnaryExpr` over an `IntegerLiteral` decodes to one negative literal.

use crate::ast::*;
use crate::error::DecodeError;
use crate::span::Span;
use crate::types::Type;
use rustc_hash::FxHashMap;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Serialize};

/// A node in the frontend's generic tree format
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawNode {
    pub kind: String,
    #[serde(default)]
    pub children: Vec<RawNode>,
    #[serde(default)]
    pub attributes: FxHashMap<String, String>,
}

impl RawNode {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    pub fn with_child(mut self, child: RawNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Parse a node tree from JSON, allowing trees up to `max_depth` levels
    pub fn from_json(json: &str, max_depth: usize) -> Result<Self, serde_json::Error> {
        from_json_bounded(json, max_depth)
    }
}

/// JSON nesting per tree level: the node object and its `children` array
const NESTING_PER_LEVEL: usize = 2;

/// Deserialize a document holding node trees up to `max_depth` levels deep
///
/// serde_json's fixed nesting limit is lifted. The document's bracket
/// nesting is checked against `max_depth` before deserializing, so the
/// compiler's depth limit is the one that applies.
pub fn from_json_bounded<T: DeserializeOwned>(json: &str, max_depth: usize) -> Result<T, serde_json::Error> {
    let limit = max_depth.saturating_add(2).saturating_mul(NESTING_PER_LEVEL);
    let nesting = json_nesting(json);
    if nesting > limit {
        return Err(serde_json::Error::custom(format!(
            "document nests {} levels deep, limit is {}",
            nesting, limit
        )));
    }

    let mut deserializer = serde_json::Deserializer::from_str(json);
    deserializer.disable_recursion_limit();
    let value = T::deserialize(&mut deserializer)?;
    deserializer.end()?;
    Ok(value)
}

/// Deepest `{`/`[` nesting outside string literals
fn json_nesting(json: &str) -> usize {
    let (mut depth, mut deepest) = (0usize, 0usize);
    let mut in_string = false;
    let mut escaped = false;
    for byte in json.bytes() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

/// Kinds that declare names and carry no code
const DECLARATION_KINDS: &[&str] = &["ImportDecl", "VarDecl", "FieldDecl", "Param", "Type"];

/// Decode a generic tree into a numbered [`Program`]
///
/// Structural errors are collected; the node that caused one is skipped and
/// decoding continues with its siblings.
pub fn decode_program(root: &RawNode) -> (Program, Vec<DecodeError>) {
    let mut decoder = Decoder::default();
    let class = decoder.program(root);
    (Program::new(class), decoder.errors)
}

#[derive(Default)]
struct Decoder {
    errors: Vec<DecodeError>,
}

impl Decoder {
    fn program(&mut self, root: &RawNode) -> ClassDecl {
        match root.kind.as_str() {
            "ClassDecl" => self.class(root),
            "Program" => {
                let mut classes = root.children.iter().filter(|c| c.kind == "ClassDecl");
                match classes.next() {
                    Some(class) => self.class(class),
                    None => {
                        self.missing(root, "ClassDecl");
                        empty_class(self.span(root))
                    }
                }
            }
            _ => {
                self.unknown(root);
                empty_class(self.span(root))
            }
        }
    }

    fn class(&mut self, node: &RawNode) -> ClassDecl {
        let span = self.span(node);
        let name = self.name(node).unwrap_or_default();
        let mut methods = Vec::new();
        for child in &node.children {
            match child.kind.as_str() {
                "MethodDecl" => {
                    if let Some(method) = self.method(child) {
                        methods.push(method);
                    }
                }
                kind if DECLARATION_KINDS.contains(&kind) => {}
                _ => self.unknown(child),
            }
        }
        ClassDecl { name, methods, span }
    }

    fn method(&mut self, node: &RawNode) -> Option<MethodDecl> {
        let span = self.span(node);
        let name = self.name(node)?;
        let body = self.stmt_list(&node.children);
        Some(MethodDecl { name, body, span })
    }

    fn stmt_list(&mut self, nodes: &[RawNode]) -> Vec<Stmt> {
        nodes
            .iter()
            .filter(|n| !DECLARATION_KINDS.contains(&n.kind.as_str()))
            .filter_map(|n| self.stmt(n))
            .collect()
    }

    fn stmt(&mut self, node: &RawNode) -> Option<Stmt> {
        let span = self.span(node);
        let kind = match node.kind.as_str() {
            "Block" => StmtKind::Block(self.stmt_list(&node.children)),
            "IfStmt" => {
                let cond = self.expr_child(node, 0, "condition")?;
                let then_branch = self.stmt_child(node, 1, "then")?;
                let else_branch = match node.children.get(2) {
                    Some(child) => Some(Box::new(self.stmt(child)?)),
                    None => None,
                };
                StmtKind::If {
                    cond,
                    then_branch: Box::new(then_branch),
                    else_branch,
                }
            }
            "WhileStmt" => {
                let cond = self.expr_child(node, 0, "condition")?;
                let body = self.stmt_child(node, 1, "body")?;
                StmtKind::While {
                    cond,
                    body: Box::new(body),
                }
            }
            "AssignStmt" => {
                let target = self.name(node)?;
                let value = self.expr_child(node, 0, "value")?;
                StmtKind::Assign { target, value }
            }
            "ArrayAssignStmt" => {
                let target = self.name(node)?;
                let index = self.expr_child(node, 0, "index")?;
                let value = self.expr_child(node, 1, "value")?;
                StmtKind::IndexAssign {
                    target,
                    index,
                    value,
                }
            }
            "ExprStmt" => StmtKind::Expr(self.expr_child(node, 0, "expression")?),
            "ReturnStmt" => match node.children.first() {
                Some(child) => StmtKind::Return(Some(self.expr(child)?)),
                None => StmtKind::Return(None),
            },
            _ => {
                self.unknown(node);
                return None;
            }
        };
        Some(Stmt::new(kind, span))
    }

    fn expr(&mut self, node: &RawNode) -> Option<Expr> {
        let span = self.span(node);
        let kind = match node.kind.as_str() {
            "IntegerLiteral" => ExprKind::Literal(self.int_literal(node, false)?),
            "BooleanLiteral" => {
                let raw = self.required_attr(node, "value")?;
                match raw {
                    "true" => ExprKind::Literal(Literal::Bool(true)),
                    "false" => ExprKind::Literal(Literal::Bool(false)),
                    other => {
                        self.bad_attr(node, "value", format!("expected true or false, found '{}'", other));
                        return None;
                    }
                }
            }
            "VarRefExpr" => ExprKind::Var(self.name(node)?),
            "ThisExpr" => ExprKind::This,
            "ParenExpr" => return self.expr_child(node, 0, "expression"),
            "BinaryExpr" => {
                let raw = self.required_attr(node, "op")?;
                let Some(op) = BinaryOp::from_symbol(raw) else {
                    self.bad_attr(node, "op", format!("unknown binary operator '{}'", raw));
                    return None;
                };
                let left = self.expr_child(node, 0, "left operand")?;
                let right = self.expr_child(node, 1, "right operand")?;
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                }
            }
            "UnaryExpr" => {
                let raw = self.required_attr(node, "op")?;
                let Some(op) = UnaryOp::from_symbol(raw) else {
                    self.bad_attr(node, "op", format!("unknown unary operator '{}'", raw));
                    return None;
                };
                match node.children.first() {
                    // `-2147483648` only fits once the sign is applied
                    Some(child) if op == UnaryOp::Neg && child.kind == "IntegerLiteral" => {
                        ExprKind::Literal(self.int_literal(child, true)?)
                    }
                    _ => {
                        let operand = self.expr_child(node, 0, "operand")?;
                        ExprKind::Unary {
                            op,
                            operand: Box::new(operand),
                        }
                    }
                }
            }
            "ArrayAccessExpr" => {
                let array = self.expr_child(node, 0, "array")?;
                let index = self.expr_child(node, 1, "index")?;
                ExprKind::Index {
                    array: Box::new(array),
                    index: Box::new(index),
                }
            }
            "ArrayLengthExpr" => ExprKind::Length(Box::new(self.expr_child(node, 0, "array")?)),
            "FieldAccessExpr" => {
                let name = self.name(node)?;
                let object = self.expr_child(node, 0, "object")?;
                ExprKind::Field {
                    object: Box::new(object),
                    name,
                }
            }
            "MethodCallExpr" => {
                let method = self.name(node)?;
                let receiver = self.expr_child(node, 0, "receiver")?;
                let args = self.expr_list(&node.children[1..])?;
                ExprKind::Call {
                    receiver: Some(Box::new(receiver)),
                    method,
                    args,
                }
            }
            "FuncCallExpr" => {
                let method = self.name(node)?;
                let args = self.expr_list(&node.children)?;
                ExprKind::Call {
                    receiver: None,
                    method,
                    args,
                }
            }
            "NewObjectExpr" => ExprKind::NewObject(self.name(node)?),
            "NewArrayExpr" => {
                let elem = Type::scalar(self.name(node)?);
                let size = self.expr_child(node, 0, "size")?;
                ExprKind::NewArray {
                    elem,
                    size: Box::new(size),
                }
            }
            "ArrayInitExpr" => {
                let elem = Type::scalar(self.name(node)?);
                let elements = self.expr_list(&node.children)?;
                ExprKind::ArrayInit { elem, elements }
            }
            _ => {
                self.unknown(node);
                return None;
            }
        };
        let mut expr = Expr::new(kind, span);
        expr.ty = self.annotated_type(node);
        Some(expr)
    }

    fn int_literal(&mut self, node: &RawNode, negated: bool) -> Option<Literal> {
        let raw = self.required_attr(node, "value")?;
        let magnitude = match raw.trim().parse::<i64>() {
            Ok(value) => value,
            Err(e) => {
                self.bad_attr(node, "value", e.to_string());
                return None;
            }
        };
        let value = if negated { magnitude.checked_neg() } else { Some(magnitude) };
        match value.and_then(|v| i32::try_from(v).ok()) {
            Some(value) => Some(Literal::Int(value)),
            None => {
                let sign = if negated { "-" } else { "" };
                self.bad_attr(node, "value", format!("{}{} does not fit in 32 bits", sign, raw.trim()));
                None
            }
        }
    }

    fn expr_list(&mut self, nodes: &[RawNode]) -> Option<Vec<Expr>> {
        nodes.iter().map(|n| self.expr(n)).collect()
    }

    fn expr_child(&mut self, node: &RawNode, index: usize, child: &'static str) -> Option<Expr> {
        match node.children.get(index) {
            Some(c) => self.expr(c),
            None => {
                self.missing(node, child);
                None
            }
        }
    }

    fn stmt_child(&mut self, node: &RawNode, index: usize, child: &'static str) -> Option<Stmt> {
        match node.children.get(index) {
            Some(c) => self.stmt(c),
            None => {
                self.missing(node, child);
                None
            }
        }
    }

    /// The resolved type annotation, if the frontend recorded one
    ///
    /// `isArray` without `dims` means a one-dimensional array. `dims` is
    /// ignored unless `isArray` is set.
    fn annotated_type(&mut self, node: &RawNode) -> Option<Type> {
        let name = node.attr("type")?;
        // "int[]" style names carry their dimensions in the name
        let base = name.trim_end_matches("[]");
        let bracket_dims = ((name.len() - base.len()) / 2) as u32;
        let is_array = node.attr("isArray").is_some_and(|v| v == "true");
        let dims = match node.attr("dims") {
            Some(raw) if is_array => match raw.trim().parse::<u32>() {
                Ok(dims) => dims,
                Err(e) => {
                    self.bad_attr(node, "dims", e.to_string());
                    return None;
                }
            },
            _ if bracket_dims > 0 => bracket_dims,
            _ if is_array => 1,
            _ => 0,
        };
        Some(Type::array(base, dims))
    }

    fn name(&mut self, node: &RawNode) -> Option<String> {
        self.required_attr(node, "name").map(str::to_string)
    }

    fn required_attr<'n>(&mut self, node: &'n RawNode, key: &'static str) -> Option<&'n str> {
        let value = node.attr(key);
        if value.is_none() {
            self.bad_attr(node, key, "attribute is missing".to_string());
        }
        value
    }

    fn span(&mut self, node: &RawNode) -> Span {
        let line = self.position(node, "line");
        let column = self.position(node, "col");
        Span::new(line, column)
    }

    fn position(&mut self, node: &RawNode, key: &'static str) -> u32 {
        match node.attr(key) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|e: std::num::ParseIntError| {
                self.errors.push(DecodeError::BadAttribute {
                    kind: node.kind.clone(),
                    attribute: key,
                    reason: e.to_string(),
                    span: Span::synthetic(),
                });
                0
            }),
            None => 0,
        }
    }

    fn missing(&mut self, node: &RawNode, child: &'static str) {
        let span = self.span(node);
        self.errors.push(DecodeError::MissingChild {
            kind: node.kind.clone(),
            child,
            span,
        });
    }

    fn unknown(&mut self, node: &RawNode) {
        let span = self.span(node);
        self.errors.push(DecodeError::UnknownKind {
            kind: node.kind.clone(),
            span,
        });
    }

    fn bad_attr(&mut self, node: &RawNode, attribute: &'static str, reason: String) {
        let span = self.span(node);
        self.errors.push(DecodeError::BadAttribute {
            kind: node.kind.clone(),
            attribute,
            reason,
            span,
        });
    }
}

fn empty_class(span: Span) -> ClassDecl {
    ClassDecl {
        name: String::new(),
        methods: Vec::new(),
        span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(node: RawNode, line: u32, col: u32) -> RawNode {
        node.with_attr("line", line.to_string())
            .with_attr("col", col.to_string())
    }

    fn int_lit(value: &str) -> RawNode {
        RawNode::new("IntegerLiteral").with_attr("value", value)
    }

    fn var_ref(name: &str) -> RawNode {
        RawNode::new("VarRefExpr").with_attr("name", name)
    }

    fn class_with(body: Vec<RawNode>) -> RawNode {
        let mut method = RawNode::new("MethodDecl").with_attr("name", "main");
        method.children = body;
        RawNode::new("Program")
            .with_child(RawNode::new("ImportDecl").with_attr("name", "io"))
            .with_child(RawNode::new("ClassDecl").with_attr("name", "Foo").with_child(method))
    }

    #[test]
    fn test_decode_assignment() {
        let root = class_with(vec![at(
            RawNode::new("AssignStmt").with_attr("name", "x").with_child(
                RawNode::new("BinaryExpr")
                    .with_attr("op", "+")
                    .with_child(int_lit("1"))
                    .with_child(var_ref("y")),
            ),
            4,
            9,
        )]);

        let (program, errors) = decode_program(&root);
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(program.class.name, "Foo");
        let body = &program.method("main").unwrap().body;
        assert_eq!(body.len(), 1);
        assert_eq!(body[0].span, Span::new(4, 9));
        let StmtKind::Assign { target, value } = &body[0].kind else {
            panic!("expected assignment");
        };
        assert_eq!(target, "x");
        assert!(matches!(value.kind, ExprKind::Binary { op: BinaryOp::Add, .. }));
        assert_eq!(value.id, NodeId(0));
    }

    #[test]
    fn test_missing_child_skips_statement() {
        let root = class_with(vec![
            at(RawNode::new("IfStmt"), 2, 5),
            RawNode::new("ReturnStmt").with_child(int_lit("0")),
        ]);

        let (program, errors) = decode_program(&root);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code(), "E1001");
        assert_eq!(errors[0].span(), Span::new(2, 5));
        // the return after the broken if is still decoded
        assert_eq!(program.method("main").unwrap().body.len(), 1);
    }

    #[test]
    fn test_unknown_kind_and_bad_attribute() {
        let root = class_with(vec![
            RawNode::new("ForStmt"),
            RawNode::new("ExprStmt").with_child(int_lit("99999999999")),
            RawNode::new("ExprStmt").with_child(
                RawNode::new("BinaryExpr")
                    .with_attr("op", "**")
                    .with_child(int_lit("1"))
                    .with_child(int_lit("2")),
            ),
        ]);

        let (program, errors) = decode_program(&root);
        let codes: Vec<_> = errors.iter().map(DecodeError::code).collect();
        assert_eq!(codes, vec!["E1002", "E1003", "E1003"]);
        assert!(program.method("main").unwrap().body.is_empty());
    }

    #[test]
    fn test_type_annotations() {
        let root = class_with(vec![
            RawNode::new("ExprStmt").with_child(
                var_ref("a").with_attr("type", "int").with_attr("isArray", "true"),
            ),
            RawNode::new("ExprStmt")
                .with_child(var_ref("b").with_attr("type", "int").with_attr("isArray", "true").with_attr("dims", "2")),
            RawNode::new("ExprStmt").with_child(var_ref("c").with_attr("type", "int[][][]")),
            RawNode::new("ExprStmt").with_child(var_ref("d").with_attr("type", "Foo")),
        ]);

        let (program, errors) = decode_program(&root);
        assert!(errors.is_empty());
        let types: Vec<_> = program.method("main").unwrap().body.iter()
            .map(|s| match &s.kind {
                StmtKind::Expr(e) => e.ty.clone(),
                _ => None,
            })
            .collect();
        assert_eq!(
            types,
            vec![
                Some(Type::array("int", 1)),
                Some(Type::array("int", 2)),
                Some(Type::array("int", 3)),
                Some(Type::scalar("Foo")),
            ]
        );
    }

    #[test]
    fn test_calls() {
        let root = class_with(vec![
            RawNode::new("ExprStmt").with_child(
                RawNode::new("MethodCallExpr")
                    .with_attr("name", "println")
                    .with_child(var_ref("io"))
                    .with_child(int_lit("1")),
            ),
            RawNode::new("ExprStmt").with_child(
                RawNode::new("FuncCallExpr")
                    .with_attr("name", "helper")
                    .with_child(RawNode::new("ParenExpr").with_child(int_lit("2"))),
            ),
        ]);

        let (program, errors) = decode_program(&root);
        assert!(errors.is_empty());
        let body = &program.method("main").unwrap().body;
        let StmtKind::Expr(first) = &body[0].kind else { panic!() };
        let ExprKind::Call { receiver, args, .. } = &first.kind else { panic!() };
        assert_eq!(receiver.as_ref().and_then(|r| r.as_var()), Some("io"));
        assert_eq!(args.len(), 1);

        let StmtKind::Expr(second) = &body[1].kind else { panic!() };
        let ExprKind::Call { receiver, args, .. } = &second.kind else { panic!() };
        assert!(receiver.is_none());
        assert_eq!(args[0].as_literal(), Some(Literal::Int(2)));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "kind": "ClassDecl",
            "attributes": { "name": "Bar" },
            "children": [
                { "kind": "MethodDecl", "attributes": { "name": "f" },
                  "children": [ { "kind": "ReturnStmt" } ] }
            ]
        }"#;
        let root = RawNode::from_json(json, 512).unwrap();
        let (program, errors) = decode_program(&root);
        assert!(errors.is_empty());
        assert_eq!(program.class.name, "Bar");
        assert!(matches!(program.method("f").unwrap().body[0].kind, StmtKind::Return(None)));
    }

    fn returned(program: &Program) -> &Expr {
        match &program.method("main").unwrap().body[0].kind {
            StmtKind::Return(Some(value)) => value,
            other => panic!("expected a return, found {:?}", other),
        }
    }

    #[test]
    fn test_unknown_root_kind() {
        let (program, errors) = decode_program(&at(RawNode::new("Module"), 1, 1));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code(), "E1002");
        assert_eq!(errors[0].span(), Span::new(1, 1));
        assert!(program.class.methods.is_empty());
    }

    #[test]
    fn test_dims_ignored_for_scalars() {
        let root = class_with(vec![
            RawNode::new("ExprStmt").with_child(
                var_ref("a").with_attr("type", "int").with_attr("isArray", "false").with_attr("dims", "1"),
            ),
            RawNode::new("ExprStmt").with_child(var_ref("b").with_attr("type", "boolean").with_attr("dims", "2")),
        ]);

        let (program, errors) = decode_program(&root);
        assert!(errors.is_empty(), "{:?}", errors);
        for stmt in &program.method("main").unwrap().body {
            let StmtKind::Expr(expr) = &stmt.kind else { panic!() };
            let ty = expr.ty.as_ref().unwrap();
            assert!(!ty.is_array(), "{} decoded as an array", ty);
            assert_eq!(ty.dimensions(), 0);
        }
    }

    #[test]
    fn test_negative_literals() {
        let negated = |value: &str| {
            RawNode::new("ReturnStmt")
                .with_child(RawNode::new("UnaryExpr").with_attr("op", "-").with_child(int_lit(value)))
        };

        let (program, errors) = decode_program(&class_with(vec![negated("2147483648")]));
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(returned(&program).as_literal(), Some(Literal::Int(i32::MIN)));

        let (program, errors) = decode_program(&class_with(vec![negated("5")]));
        assert!(errors.is_empty());
        assert_eq!(returned(&program).as_literal(), Some(Literal::Int(-5)));

        let (_, errors) = decode_program(&class_with(vec![negated("2147483649")]));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code(), "E1003");

        let (_, errors) = decode_program(&class_with(vec![RawNode::new("ReturnStmt").with_child(int_lit("2147483648"))]));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code(), "E1003");
    }

    #[test]
    fn test_deep_chain_from_json() {
        // 1 + 1 + ... + 1, left associative, 100 terms
        let mut chain = int_lit("1");
        for _ in 1..100 {
            chain = RawNode::new("BinaryExpr")
                .with_attr("op", "+")
                .with_child(chain)
                .with_child(int_lit("1"));
        }
        let root = class_with(vec![RawNode::new("ReturnStmt").with_child(chain)]);
        let json = serde_json::to_string(&root).unwrap();

        let parsed = RawNode::from_json(&json, 512).unwrap();
        let (program, errors) = decode_program(&parsed);
        assert!(errors.is_empty(), "{:?}", errors);

        let mut spine = 0;
        let mut expr = returned(&program);
        while let ExprKind::Binary { left, .. } = &expr.kind {
            spine += 1;
            expr = left.as_ref();
        }
        assert_eq!(spine, 99);

        // a lower limit rejects the same document
        assert!(RawNode::from_json(&json, 32).is_err());
    }

    #[test]
    fn test_nesting_ignores_strings() {
        assert_eq!(json_nesting(r#"{"a": "[[[{{{", "b": [1, [2]]}"#), 3);
        assert_eq!(json_nesting(r#"["\"[", []]"#), 2);
    }
}
