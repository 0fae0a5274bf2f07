//! The flat Karst AST.
//!
//! Expressions and statements live in an `ExprArena`; nodes refer to each
//! other by `ExprId`/`StmtId` rather than boxing children. The parser
//! builds the arena and keeps ownership of it; the type checker borrows
//! it read-only and keys its expression-type table by `ExprId`.

use std::path::PathBuf;

use crate::{ExprId, ExprRange, Name, Span, StmtId, StmtRange, TypeExpr};

/// A literal value.
///
/// Floats are stored as raw bits so the AST stays `Eq + Hash`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Literal {
    I32(i32),
    I64(i64),
    U64(u64),
    /// f64 stored as raw bits. Use `Literal::f64_bits`/`as_f64`.
    F64Bits(u64),
    Bool(bool),
    Char(char),
    /// String literal contents, interned.
    String(Name),
    Null,
    Nullptr,
}

impl Literal {
    /// Create an f64 literal from a float value.
    #[inline]
    pub fn f64_bits(value: f64) -> Self {
        Literal::F64Bits(value.to_bits())
    }

    /// Recover the float value of an `F64Bits` literal.
    #[inline]
    pub fn as_f64(self) -> Option<f64> {
        match self {
            Literal::F64Bits(bits) => Some(f64::from_bits(bits)),
            _ => None,
        }
    }
}

/// Unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum UnaryOp {
    /// Arithmetic negation: `-x`
    Neg,
    /// Logical negation: `!x`
    Not,
}

/// Binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    /// Check if this operator produces a `bool` regardless of operand type.
    #[inline]
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    /// Check if this operator takes `bool` operands.
    #[inline]
    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

/// The kind of an expression node.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ExprKind {
    /// A literal value.
    Literal(Literal),

    /// A name reference: a local, a parameter, or a function.
    Name(Name),

    /// Field access: `object.field`.
    Field { object: ExprId, field: Name },

    /// Indexing into an array or span: `object[index]`.
    Index { object: ExprId, index: ExprId },

    /// A call: `callee(args...)`.
    Call { callee: ExprId, args: ExprRange },

    /// A unary operation.
    Unary { op: UnaryOp, operand: ExprId },

    /// A binary operation.
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },

    /// Address-of: `&value`.
    AddrOf(ExprId),

    /// Pointer dereference: `*ptr`.
    Deref(ExprId),

    /// Compile-time size query: `sizeof(T)`. Always a `u64`.
    SizeOf(TypeExpr),

    /// Explicit conversion: `expr as T`.
    Cast { expr: ExprId, ty: TypeExpr },

    /// Struct construction with positional field initializers:
    /// `Point(1, 2)`.
    StructLiteral { ty: TypeExpr, args: ExprRange },
}

/// An expression node: kind plus source location.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    /// Create a new expression node.
    #[inline]
    pub const fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

/// The kind of a statement node.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum StmtKind {
    /// A binding: `let name: T = init;` (annotation optional).
    Let {
        name: Name,
        ty: Option<TypeExpr>,
        init: ExprId,
    },

    /// Assignment: `target = value;`.
    Assign { target: ExprId, value: ExprId },

    /// An expression evaluated for its effects.
    Expr(ExprId),

    /// `return;` or `return value;`.
    Return { value: Option<ExprId> },

    /// `while cond { body }`.
    While { cond: ExprId, body: StmtRange },

    /// `if cond { then_body } else { else_body }` (else may be empty).
    If {
        cond: ExprId,
        then_body: StmtRange,
        else_body: StmtRange,
    },

    /// `assert cond;`.
    Assert { cond: ExprId },
}

/// A statement node: kind plus source location.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    /// Create a new statement node.
    #[inline]
    pub const fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

/// A struct field declaration.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldDecl {
    pub name: Name,
    pub ty: TypeExpr,
    pub span: Span,
}

/// A struct declaration: `struct Name { fields... }`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct StructDecl {
    pub name: Name,
    pub fields: Vec<FieldDecl>,
    pub span: Span,
}

/// A function parameter.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Param {
    pub name: Name,
    pub ty: TypeExpr,
    pub span: Span,
}

/// A top-level function declaration.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct FunctionDecl {
    pub name: Name,
    pub params: Vec<Param>,
    pub ret: TypeExpr,
    pub body: StmtRange,
    pub span: Span,
}

/// One compilation unit, identified by its filesystem path.
///
/// Declarations are kept in source order; the type checker relies on
/// that order for declare-before-use resolution.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Module {
    pub path: PathBuf,
    pub structs: Vec<StructDecl>,
    pub functions: Vec<FunctionDecl>,
}

/// Arena for expressions, statements, and flattened id lists.
///
/// Owned by the parser's caller; all later phases borrow it.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct ExprArena {
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
    /// Flattened argument lists referenced by `ExprRange`.
    expr_lists: Vec<ExprId>,
}

impl ExprArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an expression, returning its id.
    ///
    /// # Panics
    /// Panics if the arena exceeds `u32::MAX` expressions.
    pub fn alloc(&mut self, expr: Expr) -> ExprId {
        let index = u32::try_from(self.exprs.len())
            .unwrap_or_else(|_| panic!("expression arena overflow"));
        self.exprs.push(expr);
        ExprId::new(index)
    }

    /// Allocate a statement, returning its id.
    ///
    /// # Panics
    /// Panics if the arena exceeds `u32::MAX` statements.
    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        let index =
            u32::try_from(self.stmts.len()).unwrap_or_else(|_| panic!("statement arena overflow"));
        self.stmts.push(stmt);
        StmtId::new(index)
    }

    /// Allocate a contiguous block of statements, returning its range.
    ///
    /// # Panics
    /// Panics if the block exceeds `u16::MAX` statements.
    pub fn alloc_block(&mut self, stmts: Vec<Stmt>) -> StmtRange {
        let start =
            u32::try_from(self.stmts.len()).unwrap_or_else(|_| panic!("statement arena overflow"));
        let len = u16::try_from(stmts.len()).unwrap_or_else(|_| panic!("statement block too long"));
        self.stmts.extend(stmts);
        StmtRange::new(start, len)
    }

    /// Allocate a flattened expression list (e.g., call arguments).
    ///
    /// # Panics
    /// Panics if the list exceeds `u16::MAX` entries.
    pub fn alloc_expr_list(&mut self, ids: &[ExprId]) -> ExprRange {
        let start = u32::try_from(self.expr_lists.len())
            .unwrap_or_else(|_| panic!("expression list arena overflow"));
        let len = u16::try_from(ids.len()).unwrap_or_else(|_| panic!("expression list too long"));
        self.expr_lists.extend_from_slice(ids);
        ExprRange::new(start, len)
    }

    /// Look up an expression by id.
    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    /// Look up a statement by id.
    #[inline]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    /// Resolve an expression range to a slice of ids.
    #[inline]
    pub fn expr_list(&self, range: ExprRange) -> &[ExprId] {
        &self.expr_lists[range.start as usize..range.start as usize + range.len()]
    }

    /// Iterate the statement ids in a range.
    #[inline]
    pub fn stmt_ids(&self, range: StmtRange) -> impl Iterator<Item = StmtId> {
        range.indices().map(StmtId::new)
    }

    /// Number of expressions allocated.
    #[inline]
    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    /// Number of statements allocated.
    #[inline]
    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_expr::Fundamental;

    #[test]
    fn arena_round_trip() {
        let mut arena = ExprArena::new();
        let lit = arena.alloc(Expr::new(
            ExprKind::Literal(Literal::I32(7)),
            Span::new(0, 1),
        ));
        let neg = arena.alloc(Expr::new(
            ExprKind::Unary {
                op: UnaryOp::Neg,
                operand: lit,
            },
            Span::new(0, 2),
        ));

        assert_eq!(arena.expr_count(), 2);
        match arena.expr(neg).kind {
            ExprKind::Unary { operand, .. } => assert_eq!(operand, lit),
            ref other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn expr_lists_are_contiguous() {
        let mut arena = ExprArena::new();
        let a = arena.alloc(Expr::new(
            ExprKind::Literal(Literal::Bool(true)),
            Span::DUMMY,
        ));
        let b = arena.alloc(Expr::new(
            ExprKind::Literal(Literal::Bool(false)),
            Span::DUMMY,
        ));
        let range = arena.alloc_expr_list(&[a, b]);
        assert_eq!(arena.expr_list(range), &[a, b]);
    }

    #[test]
    fn blocks_preserve_order() {
        let mut arena = ExprArena::new();
        let cond = arena.alloc(Expr::new(
            ExprKind::Literal(Literal::Bool(true)),
            Span::DUMMY,
        ));
        let range = arena.alloc_block(vec![
            Stmt::new(StmtKind::Assert { cond }, Span::DUMMY),
            Stmt::new(StmtKind::Return { value: None }, Span::DUMMY),
        ]);
        let kinds: Vec<_> = arena
            .stmt_ids(range)
            .map(|id| arena.stmt(id).kind.clone())
            .collect();
        assert!(matches!(kinds[0], StmtKind::Assert { .. }));
        assert!(matches!(kinds[1], StmtKind::Return { value: None }));
    }

    #[test]
    fn f64_literals_hash_by_bits() {
        let a = Literal::f64_bits(1.5);
        let b = Literal::f64_bits(1.5);
        assert_eq!(a, b);
        assert_eq!(a.as_f64(), Some(1.5));
        assert_eq!(Literal::I32(0).as_f64(), None);
    }

    #[test]
    fn type_annotations_in_let() {
        let mut arena = ExprArena::new();
        let init = arena.alloc(Expr::new(
            ExprKind::Literal(Literal::I32(1)),
            Span::DUMMY,
        ));
        let stmt = Stmt::new(
            StmtKind::Let {
                name: Name::EMPTY,
                ty: Some(TypeExpr::Fundamental(Fundamental::I32)),
                init,
            },
            Span::DUMMY,
        );
        assert!(matches!(stmt.kind, StmtKind::Let { ty: Some(_), .. }));
    }
}
