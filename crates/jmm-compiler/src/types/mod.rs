//! Static type resolution
//!
//! The resolver computes the type of every expression of a method once and
//! hands the result to later stages as an immutable [`TypeTable`].

mod error;
mod resolver;

pub use error::{ResolveError, SemanticError};
pub use resolver::{TypeResolver, TypeTable};
