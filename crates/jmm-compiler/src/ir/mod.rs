//! Intermediate Representation (IR) for jmm
//!
//! A linear, typed, three-address instruction format. Structured control
//! flow is already flattened into labels and jumps.
//!
//! # Structure
//!
//! - `IrModule` - One class with its imports
//! - `IrClass` - Fields, the implicit constructor, and methods
//! - `IrMethod` - Signature plus a flat instruction list
//! - `IrInstr` - Instructions; `IrExpr` is their right-hand side
//! - `Operand` - Typed immediate or named value

pub mod instr;
pub mod module;
pub mod pretty;
pub mod value;

pub use instr::{InvokeKind, IrExpr, IrInstr, Label, LabelKind};
pub use module::{IrClass, IrField, IrMethod, IrModule, IrParam};
pub use pretty::PrettyPrint;
pub use value::{IrType, Operand};
