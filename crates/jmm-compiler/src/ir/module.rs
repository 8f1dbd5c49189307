//! IR Module
//!
//! Top-level container for one compiled class.

use super::instr::IrInstr;
use super::value::IrType;
use serde::Serialize;

/// An IR module (compilation unit)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IrModule {
    /// Import paths, in declaration order
    pub imports: Vec<String>,
    pub class: IrClass,
}

impl IrModule {
    pub fn new(class: IrClass) -> Self {
        Self {
            imports: Vec::new(),
            class,
        }
    }

    pub fn with_import(mut self, import: impl Into<String>) -> Self {
        self.imports.push(import.into());
        self
    }

    /// Get a method by name
    pub fn method(&self, name: &str) -> Option<&IrMethod> {
        self.class.methods.iter().find(|m| m.name == name)
    }

    /// Total number of instructions over all methods
    pub fn instruction_count(&self) -> usize {
        self.class.methods.iter().map(|m| m.body.len()).sum()
    }
}

/// A class in IR form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IrClass {
    pub name: String,
    pub superclass: Option<String>,
    pub fields: Vec<IrField>,
    pub methods: Vec<IrMethod>,
}

impl IrClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            superclass: None,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }
}

/// A field definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IrField {
    pub name: String,
    pub ty: IrType,
}

/// A method parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IrParam {
    pub name: String,
    pub ty: IrType,
}

/// A method with its flat instruction list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IrMethod {
    pub name: String,
    pub is_static: bool,
    pub params: Vec<IrParam>,
    pub return_type: IrType,
    pub body: Vec<IrInstr>,
}

impl IrMethod {
    /// All label names defined in the body, in order
    pub fn labels(&self) -> Vec<String> {
        self.body
            .iter()
            .filter_map(|instr| match instr {
                IrInstr::Label(label) => Some(label.to_string()),
                _ => None,
            })
            .collect()
    }
}
