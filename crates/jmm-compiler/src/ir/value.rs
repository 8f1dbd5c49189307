//! IR types and operands

use jmm_ast::{types, Literal, Type};
use serde::Serialize;
use std::fmt;

/// Type suffix carried by every IR operand
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum IrType {
    I32,
    Bool,
    Void,
    String,
    Class(String),
    Array(Box<IrType>),
}

impl IrType {
    pub fn array_of(elem: IrType) -> Self {
        IrType::Array(Box::new(elem))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, IrType::Void)
    }

    /// Element type of an array, or `None` for scalars
    pub fn element(&self) -> Option<&IrType> {
        match self {
            IrType::Array(elem) => Some(elem),
            _ => None,
        }
    }
}

impl From<&Type> for IrType {
    fn from(ty: &Type) -> Self {
        let mut ir = match ty.name.as_str() {
            types::INT => IrType::I32,
            types::BOOLEAN => IrType::Bool,
            types::VOID => IrType::Void,
            types::STRING => IrType::String,
            class => IrType::Class(class.to_string()),
        };
        for _ in 0..ty.dims {
            ir = IrType::array_of(ir);
        }
        ir
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::I32 => write!(f, "i32"),
            IrType::Bool => write!(f, "bool"),
            IrType::Void => write!(f, "V"),
            IrType::String => write!(f, "String"),
            IrType::Class(name) => write!(f, "{}", name),
            IrType::Array(elem) => write!(f, "array.{}", elem),
        }
    }
}

/// A value an instruction reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Operand {
    /// Integer immediate
    Int(i32),
    /// Boolean immediate
    Bool(bool),
    /// Parameter, local or temporary
    Var { name: String, ty: IrType },
    /// The current object
    This(IrType),
    /// A class used as a static call target
    Class(String),
}

impl Operand {
    pub fn var(name: impl Into<String>, ty: IrType) -> Self {
        Operand::Var { name: name.into(), ty }
    }

    pub fn ty(&self) -> IrType {
        match self {
            Operand::Int(_) => IrType::I32,
            Operand::Bool(_) => IrType::Bool,
            Operand::Var { ty, .. } | Operand::This(ty) => ty.clone(),
            Operand::Class(name) => IrType::Class(name.clone()),
        }
    }

    /// Rendering used in receiver position (`this`, a bare class name)
    pub fn receiver(&self) -> String {
        match self {
            Operand::This(_) => "this".to_string(),
            Operand::Class(name) => name.clone(),
            other => other.to_string(),
        }
    }
}

impl From<Literal> for Operand {
    fn from(lit: Literal) -> Self {
        match lit {
            Literal::Int(v) => Operand::Int(v),
            Literal::Bool(v) => Operand::Bool(v),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Int(v) => write!(f, "{}.i32", v),
            Operand::Bool(v) => write!(f, "{}.bool", u8::from(*v)),
            Operand::Var { name, ty } => write!(f, "{}.{}", name, ty),
            Operand::This(ty) => write!(f, "this.{}", ty),
            Operand::Class(name) => write!(f, "{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mapping() {
        assert_eq!(IrType::from(&Type::int()).to_string(), "i32");
        assert_eq!(IrType::from(&Type::void()).to_string(), "V");
        assert_eq!(IrType::from(&Type::array("int", 2)).to_string(), "array.array.i32");
        assert_eq!(IrType::from(&Type::array("String", 1)).to_string(), "array.String");
        assert_eq!(IrType::from(&Type::scalar("Foo")).to_string(), "Foo");
    }

    #[test]
    fn test_operand_rendering() {
        assert_eq!(Operand::Int(-3).to_string(), "-3.i32");
        assert_eq!(Operand::Bool(true).to_string(), "1.bool");
        assert_eq!(Operand::Bool(false).to_string(), "0.bool");
        assert_eq!(Operand::var("a", IrType::array_of(IrType::I32)).to_string(), "a.array.i32");
        assert_eq!(Operand::This(IrType::Class("Foo".into())).receiver(), "this");
        assert_eq!(Operand::Class("io".into()).receiver(), "io");
    }
}
