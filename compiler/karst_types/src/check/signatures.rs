//! Function signature collection.

use karst_ir::Module;

use super::{FunctionSig, ModuleChecker};
use crate::error::{CheckError, TypeError};

impl ModuleChecker<'_> {
    /// Resolve every function signature before any body is checked, so
    /// bodies may call functions declared later in the module.
    ///
    /// Ids are assigned in declaration order and give each function a
    /// distinct type even when signatures coincide. Overloading is not
    /// supported; a repeated name is an error.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn collect_signatures(&mut self, module: &Module) -> Result<(), CheckError> {
        for (index, decl) in module.functions.iter().enumerate() {
            if self.signatures.contains_key(&decl.name) {
                return Err(TypeError::DuplicateFunction(decl.name).at(decl.span));
            }

            let mut params = Vec::with_capacity(decl.params.len());
            for param in &decl.params {
                params.push(self.resolve_annotation(&param.ty, param.span)?);
            }
            let ret = self.resolve_annotation(&decl.ret, decl.span)?;

            self.signatures.insert(
                decl.name,
                FunctionSig {
                    id: index as u64,
                    params,
                    ret,
                    span: decl.span,
                },
            );
        }
        Ok(())
    }
}
