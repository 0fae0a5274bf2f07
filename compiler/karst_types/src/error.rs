//! Type errors and diagnostics.

use std::fmt;

use karst_diagnostic::{Diagnostic, ErrorCode};
use karst_ir::{Name, Span, StringInterner};

use crate::core::Type;

/// Type error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TypeError {
    /// Type mismatch.
    Mismatch { expected: Type, found: Type },
    /// Argument count mismatch.
    ArgCountMismatch { expected: usize, found: usize },
    /// A type annotation names a type that is not registered.
    UnknownType(Type),
    /// Two struct declarations share a name.
    DuplicateStruct(Name),
    /// Two function declarations share a name.
    DuplicateFunction(Name),
    /// Unknown identifier.
    UnknownIdent(Name),
    /// Field access on a type that has no such field.
    UnknownField { ty: Type, field: Name },
    /// Call of a non-callable value.
    NotCallable(Type),
    /// Struct-literal syntax applied to a non-struct type.
    NotConstructible(Type),
    /// Index applied to a non-indexable value.
    NotIndexable(Type),
    /// Cast between unrelated types.
    InvalidCast { from: Type, to: Type },
    /// Assignment through a const-qualified binding or place.
    AssignToConst(Type),
}

impl TypeError {
    /// Attach a source location, producing a reportable error.
    pub fn at(self, span: Span) -> CheckError {
        CheckError { error: self, span }
    }

    /// Convert to a diagnostic with helpful suggestions.
    pub fn to_diagnostic(&self, span: Span, interner: &StringInterner) -> Diagnostic {
        match self {
            TypeError::Mismatch { expected, found } => {
                let exp_str = expected.display(interner);
                let found_str = found.display(interner);

                let mut diag = Diagnostic::error(ErrorCode::E2001)
                    .with_message(format!(
                        "type mismatch: expected `{exp_str}`, found `{found_str}`",
                    ))
                    .with_label(span, format!("expected `{exp_str}`"));

                // Common mistakes get a concrete fix-up hint
                if expected.is_const() && !found.is_const() {
                    // unreachable under const-widening, kept for callers
                    // that compare exactly
                    diag = diag.with_suggestion("add a `const` qualifier to the value's type");
                } else if found.is_const() && !expected.is_const() {
                    diag = diag.with_note(format!(
                        "`{found_str}` is const-qualified and cannot be used where a mutable `{exp_str}` is required",
                    ));
                } else if expected == &Type::i64() && found == &Type::i32() {
                    diag = diag.with_suggestion("cast the value with `as i64`");
                } else if expected.is_ptr() && found == &Type::nullptr() {
                    diag = diag.with_suggestion("cast `nullptr` to the target pointer type");
                }

                diag
            }
            TypeError::ArgCountMismatch { expected, found } => {
                let plural = if *expected == 1 { "" } else { "s" };
                Diagnostic::error(ErrorCode::E2004)
                    .with_message(format!(
                        "wrong number of arguments: expected {expected}, found {found}",
                    ))
                    .with_label(span, format!("expected {expected} argument{plural}"))
                    .with_suggestion(if *found > *expected {
                        "remove extra arguments"
                    } else {
                        "add missing arguments"
                    })
            }
            TypeError::UnknownType(ty) => {
                let ty_str = ty.display(interner);
                Diagnostic::error(ErrorCode::E2002)
                    .with_message(format!("unknown type `{ty_str}`"))
                    .with_label(span, "type is not defined at this point")
                    .with_note("types must be declared before they are used")
            }
            TypeError::DuplicateStruct(name) => {
                let name_str = interner.lookup(*name);
                Diagnostic::error(ErrorCode::E2005)
                    .with_message(format!("duplicate definition of struct `{name_str}`"))
                    .with_label(span, "already defined in this module")
                    .with_suggestion("rename one of the definitions")
            }
            TypeError::DuplicateFunction(name) => {
                let name_str = interner.lookup(*name);
                Diagnostic::error(ErrorCode::E2005)
                    .with_message(format!("duplicate definition of function `{name_str}`"))
                    .with_label(span, "already defined in this module")
                    .with_suggestion("rename one of the definitions")
            }
            TypeError::UnknownIdent(name) => {
                let name_str = interner.lookup(*name);
                Diagnostic::error(ErrorCode::E2003)
                    .with_message(format!("unknown identifier `{name_str}`"))
                    .with_label(span, "not found in this scope")
                    .with_suggestion(format!(
                        "check spelling, or add a definition for `{name_str}`"
                    ))
            }
            TypeError::UnknownField { ty, field } => {
                let ty_str = ty.display(interner);
                let field_str = interner.lookup(*field);
                Diagnostic::error(ErrorCode::E2008)
                    .with_message(format!("no field `{field_str}` on type `{ty_str}`"))
                    .with_label(span, "unknown field")
            }
            TypeError::NotCallable(ty) => {
                let ty_str = ty.display(interner);
                Diagnostic::error(ErrorCode::E2006)
                    .with_message(format!("expression of type `{ty_str}` is not callable"))
                    .with_label(span, "call target")
            }
            TypeError::NotConstructible(ty) => {
                let ty_str = ty.display(interner);
                Diagnostic::error(ErrorCode::E2006)
                    .with_message(format!(
                        "`{ty_str}` is not a struct and cannot be constructed with a literal",
                    ))
                    .with_label(span, "not a struct type")
            }
            TypeError::NotIndexable(ty) => {
                let ty_str = ty.display(interner);
                Diagnostic::error(ErrorCode::E2009)
                    .with_message(format!("type `{ty_str}` cannot be indexed"))
                    .with_label(span, "only arrays and spans support indexing")
            }
            TypeError::InvalidCast { from, to } => {
                let from_str = from.display(interner);
                let to_str = to.display(interner);
                Diagnostic::error(ErrorCode::E2007)
                    .with_message(format!("invalid cast from `{from_str}` to `{to_str}`"))
                    .with_label(span, "cast is not defined for these types")
                    .with_note(
                        "casts are allowed between fundamentals, between pointers, and from `nullptr` to a pointer",
                    )
            }
            TypeError::AssignToConst(ty) => {
                let ty_str = ty.display(interner);
                Diagnostic::error(ErrorCode::E2010)
                    .with_message(format!("cannot assign to a value of type `{ty_str}`"))
                    .with_label(span, "target is const-qualified")
                    .with_suggestion("remove the `const` qualifier from the declaration")
            }
        }
    }
}

/// A type error pinned to the source location that triggered it.
///
/// The check pass stops at the first error it encounters and returns
/// one of these.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CheckError {
    pub error: TypeError,
    pub span: Span,
}

impl CheckError {
    /// Render as a diagnostic.
    pub fn to_diagnostic(&self, interner: &StringInterner) -> Diagnostic {
        self.error.to_diagnostic(self.span, interner)
    }
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            TypeError::Mismatch { .. } => write!(f, "type mismatch at {}", self.span),
            TypeError::ArgCountMismatch { expected, found } => write!(
                f,
                "argument count mismatch at {}: expected {expected}, found {found}",
                self.span
            ),
            TypeError::UnknownType(_) => write!(f, "unknown type at {}", self.span),
            TypeError::DuplicateStruct(_) => write!(f, "duplicate struct at {}", self.span),
            TypeError::DuplicateFunction(_) => {
                write!(f, "duplicate function at {}", self.span)
            }
            TypeError::UnknownIdent(_) => write!(f, "unknown identifier at {}", self.span),
            TypeError::UnknownField { .. } => write!(f, "unknown field at {}", self.span),
            TypeError::NotCallable(_) => write!(f, "call of non-callable at {}", self.span),
            TypeError::NotConstructible(_) => {
                write!(f, "construction of non-struct at {}", self.span)
            }
            TypeError::NotIndexable(_) => write!(f, "index of non-indexable at {}", self.span),
            TypeError::InvalidCast { .. } => write!(f, "invalid cast at {}", self.span),
            TypeError::AssignToConst(_) => {
                write!(f, "assignment to const at {}", self.span)
            }
        }
    }
}

impl std::error::Error for CheckError {}
