//! Karst type representation and checking.
//!
//! This crate owns the semantic half of the front end:
//!
//! - [`Type`] / [`TypeKind`]: the structural type values every phase
//!   passes around. Plain data, structurally compared and hashed.
//! - [`TypeManager`]: the registry of declared structs, their field
//!   layouts, and the size model.
//! - [`check_module`]: the per-module type check pass. It registers
//!   structs, collects function signatures, then checks every body,
//!   producing a [`TypeCheckOutput`] with a type for each expression.
//!
//! User-facing problems surface as [`CheckError`] values that render to
//! diagnostics; violated internal invariants (stripping a pointer layer
//! that is not there, sizing an unvalidated struct) are panics.

mod check;
mod core;
mod error;
mod manager;

pub use check::{check_module, types_compatible, FunctionSig, ModuleChecker, TypeCheckOutput};
pub use error::{CheckError, TypeError};
pub use manager::{Field, TemplateMap, TypeManager, PTR_SIZE, WORD_SIZE};
pub use self::core::{Qualifiers, StructType, Type, TypeKind};
