//! Karst IR - shared compiler data types.
//!
//! This crate contains the data structures every phase of the Karst
//! compiler agrees on:
//! - `Span` for source locations
//! - `Name` for interned identifiers
//! - `Token` / `TokenKind` for lexer output
//! - The flat AST (`Expr`, `Stmt`, `ExprArena`, `Module`)
//! - `TypeExpr` for type annotations as written in source
//!
//! # Design
//!
//! - **Intern everything**: strings become `Name(u32)`
//! - **Flatten everything**: no `Box<Expr>`, expressions live in an
//!   `ExprArena` and refer to each other by `ExprId(u32)`
//!
//! The arena is owned by whoever ran the parser; later phases (the type
//! checker in particular) borrow it and key their side tables by
//! `ExprId`, never copying or reparenting nodes.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod ast;
mod expr_id;
mod interner;
mod name;
mod span;
mod token;
mod type_expr;

pub use ast::{
    BinaryOp, Expr, ExprArena, ExprKind, FieldDecl, FunctionDecl, Literal, Module, Param,
    Stmt, StmtKind, StructDecl, UnaryOp,
};
pub use expr_id::{ExprId, ExprRange, StmtId, StmtRange};
pub use interner::{InternError, SharedInterner, StringInterner};
pub use name::Name;
pub use span::{Span, SpanError};
pub use token::{Token, TokenKind};
pub use type_expr::{Fundamental, TypeExpr};
