//! Pretty-printing for IR
//!
//! Renders the textual class format:
//!
//! ```text
//! import io;
//! Foo extends Bar {
//!     .field private x.i32;
//!     .construct Foo().V {
//!         invokespecial(this, "<init>").V;
//!     }
//!     .method public get().i32 {
//!         tmp0.i32 :=.i32 getfield(this, x.i32).i32;
//!         ret.i32 tmp0.i32;
//!     }
//! }
//! ```

use super::instr::{IrExpr, IrInstr};
use super::module::{IrClass, IrMethod, IrModule};
use std::fmt;

const INSTR_INDENT: &str = "        ";
const MEMBER_INDENT: &str = "    ";

/// Trait for pretty-printing IR constructs
pub trait PrettyPrint {
    fn pretty_print(&self) -> String;
}

impl<T: fmt::Display> PrettyPrint for T {
    fn pretty_print(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for IrModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for import in &self.imports {
            writeln!(f, "import {};", import)?;
        }
        write!(f, "{}", self.class)
    }
}

impl fmt::Display for IrClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.superclass {
            Some(superclass) => writeln!(f, "{} extends {} {{", self.name, superclass)?,
            None => writeln!(f, "{} {{", self.name)?,
        }

        for field in &self.fields {
            writeln!(f, "{}.field private {}.{};", MEMBER_INDENT, field.name, field.ty)?;
        }

        // implicit constructor
        writeln!(f, "{}.construct {}().V {{", MEMBER_INDENT, self.name)?;
        writeln!(f, "{}invokespecial(this, \"<init>\").V;", INSTR_INDENT)?;
        writeln!(f, "{}}}", MEMBER_INDENT)?;

        for method in &self.methods {
            write!(f, "{}", method)?;
        }
        writeln!(f, "}}")
    }
}

impl fmt::Display for IrMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| format!("{}.{}", p.name, p.ty))
            .collect();
        writeln!(
            f,
            "{}.method public {}{}({}).{} {{",
            MEMBER_INDENT,
            if self.is_static { "static " } else { "" },
            self.name,
            params.join(", "),
            self.return_type
        )?;
        for instr in &self.body {
            // labels sit one level left of the instructions they mark
            let indent = if instr.is_label() { MEMBER_INDENT } else { INSTR_INDENT };
            writeln!(f, "{}{}", indent, instr)?;
        }
        writeln!(f, "{}}}", MEMBER_INDENT)
    }
}

impl fmt::Display for IrInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrInstr::Assign { dest, ty, value } => write!(f, "{}.{} :=.{} {};", dest, ty, ty, value),
            IrInstr::PutField {
                object,
                field,
                ty,
                value,
            } => write!(f, "putfield({}, {}.{}, {}).V;", object.receiver(), field, ty, value),
            IrInstr::ArrayStore {
                array,
                index,
                ty,
                value,
            } => write!(f, "{}[{}].{} :=.{} {};", array, index, ty, ty, value),
            IrInstr::Call(call) => write!(f, "{};", call),
            IrInstr::Branch { cond, target } => write!(f, "if ({}) goto {};", cond, target),
            IrInstr::Goto(target) => write!(f, "goto {};", target),
            IrInstr::Label(label) => write!(f, "{}:", label),
            IrInstr::Return { ty, value: Some(value) } => write!(f, "ret.{} {};", ty, value),
            IrInstr::Return { ty, value: None } => write!(f, "ret.{};", ty),
        }
    }
}

impl fmt::Display for IrExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrExpr::Value(operand) => write!(f, "{}", operand),
            IrExpr::Binary { op, left, right, ty } => write!(f, "{} {}.{} {}", left, op, ty, right),
            IrExpr::Unary { op, operand, ty } => write!(f, "{}.{} {}", op, ty, operand),
            IrExpr::Invoke {
                kind,
                receiver,
                method,
                args,
                ret,
            } => {
                write!(f, "{}({}, \"{}\"", kind.mnemonic(), receiver.receiver(), method)?;
                for arg in args {
                    write!(f, ", {}", arg)?;
                }
                write!(f, ").{}", ret)
            }
            IrExpr::New(class) => write!(f, "new({}).{}", class, class),
            IrExpr::NewArray { size, ty } => write!(f, "new(array, {}).{}", size, ty),
            IrExpr::GetField { object, field, ty } => {
                write!(f, "getfield({}, {}.{}).{}", object.receiver(), field, ty, ty)
            }
            IrExpr::ArrayLoad { array, index, ty } => write!(f, "{}[{}].{}", array, index, ty),
            IrExpr::ArrayLength(array) => write!(f, "arraylength({}).i32", array),
        }
    }
}
