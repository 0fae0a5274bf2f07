//! Module type checking.
//!
//! The pass runs in three phases over one module, in declaration order:
//!
//! 1. `registration`: struct declarations are resolved and registered
//!    in the `TypeManager`. Field annotations may only name structs
//!    declared earlier (declare-before-use).
//! 2. `signatures`: function signatures are resolved so bodies can call
//!    any function in the module regardless of order.
//! 3. `bodies`: every statement and expression is inferred and checked.
//!    A type is recorded for every expression visited, keyed by
//!    `ExprId`.
//!
//! The pass stops at the first error. Internal invariant violations
//! (malformed ids, `size_of` on unvalidated types) are fatal panics,
//! never `CheckError`s.

mod api;
mod bodies;
mod registration;
mod signatures;


pub use api::check_module;

use std::path::PathBuf;

use karst_ir::{ExprArena, ExprId, Name, Span, StringInterner};
use rustc_hash::FxHashMap;

use crate::core::Type;
use crate::error::CheckError;
use crate::manager::TypeManager;

/// A resolved top-level function signature.
#[derive(Clone, Debug)]
pub struct FunctionSig {
    /// Distinguishes functions with identical signatures.
    pub id: u64,
    pub params: Vec<Type>,
    pub ret: Type,
    /// Span of the declaration, for duplicate reporting.
    pub span: Span,
}

/// Everything the check pass produces for later phases.
#[derive(Clone, Debug, Default)]
pub struct TypeCheckOutput {
    /// The struct registry built during registration.
    pub types: TypeManager,
    /// Inferred type of every expression in the module.
    pub expr_types: FxHashMap<ExprId, Type>,
}

impl TypeCheckOutput {
    /// Look up the inferred type of an expression.
    #[inline]
    pub fn expr_type(&self, id: ExprId) -> Option<&Type> {
        self.expr_types.get(&id)
    }
}

/// Type checker state for one module.
pub struct ModuleChecker<'a> {
    arena: &'a ExprArena,
    interner: &'a StringInterner,
    module_path: PathBuf,
    types: TypeManager,
    signatures: FxHashMap<Name, FunctionSig>,
    /// Lexical scope stack; innermost last.
    scopes: Vec<FxHashMap<Name, Type>>,
    expr_types: FxHashMap<ExprId, Type>,
}

impl<'a> ModuleChecker<'a> {
    /// Create a checker over a parsed module's arena.
    pub fn new(arena: &'a ExprArena, interner: &'a StringInterner, module_path: PathBuf) -> Self {
        ModuleChecker {
            arena,
            interner,
            module_path,
            types: TypeManager::new(),
            signatures: FxHashMap::default(),
            scopes: Vec::new(),
            expr_types: FxHashMap::default(),
        }
    }

    /// Consume the checker, yielding its results.
    pub fn into_output(self) -> TypeCheckOutput {
        TypeCheckOutput {
            types: self.types,
            expr_types: self.expr_types,
        }
    }

    /// The registry as built so far.
    #[inline]
    pub fn types(&self) -> &TypeManager {
        &self.types
    }

    fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    fn pop_scope(&mut self) {
        let popped = self.scopes.pop();
        debug_assert!(popped.is_some(), "scope stack underflow");
    }

    fn bind(&mut self, name: Name, ty: Type) {
        let Some(scope) = self.scopes.last_mut() else {
            panic!("binding outside any scope");
        };
        scope.insert(name, ty);
    }

    /// Innermost-first lookup of a local or parameter.
    fn lookup_local(&self, name: Name) -> Option<&Type> {
        self.scopes.iter().rev().find_map(|scope| scope.get(&name))
    }

    /// Record the inferred type of an expression and hand it back.
    fn record(&mut self, id: ExprId, ty: Type) -> Result<Type, CheckError> {
        self.expr_types.insert(id, ty.clone());
        Ok(ty)
    }
}

/// Whether a value of type `found` may flow into a slot expecting
/// `expected`.
///
/// Exact equality, plus const widening: a mutable value may bind to a
/// const slot, never the reverse.
pub fn types_compatible(expected: &Type, found: &Type) -> bool {
    if expected == found {
        return true;
    }
    expected.is_const() && expected.clone().remove_const() == found.clone().remove_const()
}

#[cfg(test)]
mod compat_tests {
    use super::types_compatible;
    use crate::core::Type;

    #[test]
    fn equal_types_are_compatible() {
        assert!(types_compatible(&Type::i32(), &Type::i32()));
        assert!(!types_compatible(&Type::i32(), &Type::i64()));
    }

    #[test]
    fn const_widens_one_way() {
        let t = Type::i32();
        let c = Type::i32().add_const();
        assert!(types_compatible(&c, &t));
        assert!(types_compatible(&c, &c));
        assert!(!types_compatible(&t, &c));
    }

    #[test]
    fn widening_is_top_level_only() {
        // const applies to the outermost layer; inner qualifiers must
        // still match exactly.
        let ptr_to_const = Type::i32().add_const().add_ptr();
        let ptr_to_mut = Type::i32().add_ptr();
        assert!(!types_compatible(&ptr_to_const, &ptr_to_mut));
        assert!(types_compatible(
            &ptr_to_mut.clone().add_const(),
            &ptr_to_mut
        ));
    }
}
