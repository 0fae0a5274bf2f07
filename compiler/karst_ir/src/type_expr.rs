//! Type annotations as written in source.
//!
//! `TypeExpr` preserves the full structure of a type annotation as the
//! parser saw it, before the type checker resolves it against the type
//! registry. Every place a type can be written (parameter and field
//! declarations, return types, casts, `sizeof`) carries one of these.

use crate::Name;

/// A fundamental (scalar, built-in) Karst type.
///
/// These are keywords in the surface syntax, so the parser resolves them
/// directly; user-defined names never collide with them.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Fundamental {
    Null,
    Bool,
    Char,
    I32,
    I64,
    U64,
    F64,
    Nullptr,
}

impl Fundamental {
    /// Surface-syntax spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Fundamental::Null => "null",
            Fundamental::Bool => "bool",
            Fundamental::Char => "char",
            Fundamental::I32 => "i32",
            Fundamental::I64 => "i64",
            Fundamental::U64 => "u64",
            Fundamental::F64 => "f64",
            Fundamental::Nullptr => "nullptr",
        }
    }
}

impl std::fmt::Display for Fundamental {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parsed type annotation, preserving full structure.
///
/// The type checker resolves these into the semantic `Type`
/// representation, validating struct names against the registry.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeExpr {
    /// A fundamental type keyword: `i32`, `bool`, ...
    Fundamental(Fundamental),

    /// A named struct type, with template arguments if written.
    /// Examples: `Point`, `List<i32>`.
    Named {
        /// The struct name (interned).
        name: Name,
        /// Template arguments, empty if non-generic.
        templates: Vec<TypeExpr>,
    },

    /// A pointer type: `&T`.
    Ptr(Box<TypeExpr>),

    /// A fixed-size array type: `[T; N]`.
    Array {
        /// Element type.
        inner: Box<TypeExpr>,
        /// Element count.
        len: u64,
    },

    /// A span type: `[T]` (pointer + length view).
    Span(Box<TypeExpr>),

    /// A const-qualified type: `const T`.
    Const(Box<TypeExpr>),

    /// A function pointer type: `fn(A, B) -> R`.
    FunctionPtr {
        /// Parameter types.
        params: Vec<TypeExpr>,
        /// Return type.
        ret: Box<TypeExpr>,
    },

    /// The arena handle type: `arena`.
    Arena,
}

impl TypeExpr {
    /// Create a named type without template arguments.
    #[inline]
    pub fn named(name: Name) -> Self {
        TypeExpr::Named {
            name,
            templates: Vec::new(),
        }
    }

    /// Create a pointer annotation.
    #[inline]
    pub fn ptr(inner: TypeExpr) -> Self {
        TypeExpr::Ptr(Box::new(inner))
    }

    /// Create an array annotation.
    #[inline]
    pub fn array(inner: TypeExpr, len: u64) -> Self {
        TypeExpr::Array {
            inner: Box::new(inner),
            len,
        }
    }

    /// Create a span annotation.
    #[inline]
    pub fn span_of(inner: TypeExpr) -> Self {
        TypeExpr::Span(Box::new(inner))
    }

    /// Create a const-qualified annotation.
    #[inline]
    pub fn const_of(inner: TypeExpr) -> Self {
        TypeExpr::Const(Box::new(inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_nest() {
        let ty = TypeExpr::ptr(TypeExpr::array(TypeExpr::Fundamental(Fundamental::I32), 3));
        let TypeExpr::Ptr(inner) = ty else {
            panic!("expected pointer");
        };
        assert!(matches!(*inner, TypeExpr::Array { len: 3, .. }));
    }

    #[test]
    fn fundamental_spelling() {
        assert_eq!(Fundamental::I32.to_string(), "i32");
        assert_eq!(Fundamental::Nullptr.to_string(), "nullptr");
    }
}
