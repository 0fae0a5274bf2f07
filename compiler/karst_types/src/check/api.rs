//! Public entry point for the type check pass.

use karst_ir::{ExprArena, Module, StringInterner};

use super::{ModuleChecker, TypeCheckOutput};
use crate::error::CheckError;

/// Type check a parsed module.
///
/// Runs registration, signature collection, and body checking in that
/// order, stopping at the first error. On success the output carries
/// the struct registry and the inferred type of every expression.
#[tracing::instrument(level = "debug", skip_all, fields(module = %module.path.display()))]
pub fn check_module(
    module: &Module,
    arena: &ExprArena,
    interner: &StringInterner,
) -> Result<TypeCheckOutput, CheckError> {
    let mut checker = ModuleChecker::new(arena, interner, module.path.clone());
    checker.register_structs(module)?;
    checker.collect_signatures(module)?;
    checker.check_bodies(module)?;
    tracing::debug!(
        structs = checker.types().len(),
        exprs = checker.expr_types.len(),
        "module checked"
    );
    Ok(checker.into_output())
}
