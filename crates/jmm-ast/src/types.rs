//! Static types of the jmm language

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the integer type
pub const INT: &str = "int";
/// Name of the boolean type
pub const BOOLEAN: &str = "boolean";
/// Name of the void type
pub const VOID: &str = "void";
/// Name of the string type
pub const STRING: &str = "String";

/// A static type: a base name plus an array dimension count
///
/// A scalar type has `dims == 0`. Array types always have at least one
/// dimension, and the base name is the element type of the innermost
/// dimension (`int[][]` is `{ name: "int", dims: 2 }`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Type {
    /// Base type name (`int`, `boolean`, or a class name)
    pub name: String,
    /// Number of array dimensions
    #[serde(default)]
    pub dims: u32,
}

impl Type {
    /// Create a scalar type
    pub fn scalar(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dims: 0,
        }
    }

    /// Create an array type with the given number of dimensions
    pub fn array(name: impl Into<String>, dims: u32) -> Self {
        Self {
            name: name.into(),
            dims,
        }
    }

    pub fn int() -> Self {
        Self::scalar(INT)
    }

    pub fn boolean() -> Self {
        Self::scalar(BOOLEAN)
    }

    pub fn void() -> Self {
        Self::scalar(VOID)
    }

    /// Check if this is an array type
    pub fn is_array(&self) -> bool {
        self.dims > 0
    }

    /// Number of array dimensions (0 for scalars)
    pub fn dimensions(&self) -> u32 {
        self.dims
    }

    pub fn is_int(&self) -> bool {
        self.dims == 0 && self.name == INT
    }

    pub fn is_boolean(&self) -> bool {
        self.dims == 0 && self.name == BOOLEAN
    }

    pub fn is_void(&self) -> bool {
        self.dims == 0 && self.name == VOID
    }

    /// The type with one more array dimension
    pub fn array_of(&self) -> Type {
        Type::array(self.name.clone(), self.dims + 1)
    }

    /// The element type obtained by indexing once
    ///
    /// Returns `None` for scalars. Indexing a one-dimensional array yields
    /// the scalar base type.
    pub fn element(&self) -> Option<Type> {
        if self.dims == 0 {
            None
        } else {
            Some(Type::array(self.name.clone(), self.dims - 1))
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for _ in 0..self.dims {
            write!(f, "[]")?;
        }
        Ok(())
    }
}
