//! Symbol table
//!
//! Built by the frontend and consumed read-only by the backend (the varargs
//! pass produces an updated copy). Lookup of a free name inside a method
//! follows the order parameter, local, field, imported type name.

use crate::types::Type;
use serde::{Deserialize, Serialize};

/// A named, typed entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
}

impl Symbol {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Method parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    /// Declared type; for a variadic parameter this is the element type
    #[serde(rename = "type")]
    pub ty: Type,
    #[serde(default)]
    pub is_varargs: bool,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            is_varargs: false,
        }
    }

    pub fn varargs(name: impl Into<String>, elem: Type) -> Self {
        Self {
            name: name.into(),
            ty: elem,
            is_varargs: true,
        }
    }
}

/// Method signature and locals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSymbol {
    pub name: String,
    pub return_type: Type,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub locals: Vec<Symbol>,
    #[serde(default)]
    pub is_static: bool,
}

impl MethodSymbol {
    pub fn new(name: impl Into<String>, return_type: Type) -> Self {
        Self {
            name: name.into(),
            return_type,
            params: Vec::new(),
            locals: Vec::new(),
            is_static: false,
        }
    }

    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_local(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.locals.push(Symbol::new(name, ty));
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn local(&self, name: &str) -> Option<&Symbol> {
        self.locals.iter().find(|l| l.name == name)
    }

    /// The variadic parameter, if the method declares one
    pub fn varargs_param(&self) -> Option<&Param> {
        self.params.iter().find(|p| p.is_varargs)
    }

    /// Number of parameters that precede the variadic one
    pub fn fixed_param_count(&self) -> usize {
        self.params.iter().filter(|p| !p.is_varargs).count()
    }
}

/// Result of looking up a free name inside a method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding<'a> {
    /// Method parameter (with its position)
    Param(&'a Param, usize),
    /// Method-local variable
    Local(&'a Symbol),
    /// Field of the current class
    Field(&'a Symbol),
    /// Imported class name
    Import(&'a str),
}

impl<'a> Binding<'a> {
    /// The type bound to the name, if it denotes a value
    pub fn ty(&self) -> Option<&'a Type> {
        match self {
            Binding::Param(param, _) => Some(&param.ty),
            Binding::Local(symbol) | Binding::Field(symbol) => Some(&symbol.ty),
            Binding::Import(_) => None,
        }
    }

    /// Check if the name is a method parameter or local
    pub fn is_method_scoped(&self) -> bool {
        matches!(self, Binding::Param(..) | Binding::Local(_))
    }
}

/// Whole-program symbol table
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SymbolTable {
    pub class_name: String,
    #[serde(default)]
    pub superclass: Option<String>,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub fields: Vec<Symbol>,
    #[serde(default)]
    pub methods: Vec<MethodSymbol>,
}

impl SymbolTable {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            ..Default::default()
        }
    }

    pub fn with_superclass(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn with_import(mut self, import: impl Into<String>) -> Self {
        self.imports.push(import.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.fields.push(Symbol::new(name, ty));
        self
    }

    pub fn with_method(mut self, method: MethodSymbol) -> Self {
        self.methods.push(method);
        self
    }

    pub fn method(&self, name: &str) -> Option<&MethodSymbol> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn method_mut(&mut self, name: &str) -> Option<&mut MethodSymbol> {
        self.methods.iter_mut().find(|m| m.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&Symbol> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Simple names of the imported classes (`a.b.C` imports `C`)
    pub fn imported_names(&self) -> impl Iterator<Item = &str> {
        self.imports
            .iter()
            .map(|path| path.rsplit('.').next().unwrap_or(path.as_str()))
    }

    /// Check if `name` is the simple name of an imported class
    pub fn is_imported(&self, name: &str) -> bool {
        self.imported_names().any(|imported| imported == name)
    }

    pub fn is_superclass(&self, name: &str) -> bool {
        self.superclass.as_deref() == Some(name)
    }

    /// Check if `name` names a class known to this compilation unit
    pub fn is_known_class(&self, name: &str) -> bool {
        name == self.class_name || self.is_superclass(name) || self.is_imported(name)
    }

    /// Resolve a free name inside `method`
    ///
    /// Lookup order: parameter, local, field, imported type name. Fields are
    /// not visible from static methods.
    pub fn lookup<'a>(&'a self, method: Option<&'a MethodSymbol>, name: &'a str) -> Option<Binding<'a>> {
        if let Some(method) = method {
            if let Some((index, param)) = method.params.iter().enumerate().find(|(_, p)| p.name == name) {
                return Some(Binding::Param(param, index));
            }
            if let Some(local) = method.local(name) {
                return Some(Binding::Local(local));
            }
        }
        let fields_visible = method.map_or(true, |m| !m.is_static);
        if fields_visible {
            if let Some(field) = self.field(name) {
                return Some(Binding::Field(field));
            }
        }
        self.imported_names()
            .find(|imported| *imported == name)
            .map(Binding::Import)
    }

    /// All names declared in a method's scope plus the fields, used to keep
    /// compiler-generated names from colliding with user names
    pub fn names_in_scope<'a>(&'a self, method: &'a MethodSymbol) -> impl Iterator<Item = &'a str> {
        method
            .params
            .iter()
            .map(|p| p.name.as_str())
            .chain(method.locals.iter().map(|l| l.name.as_str()))
            .chain(self.fields.iter().map(|f| f.name.as_str()))
    }

    /// Parse a symbol table from its JSON form
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
