//! Struct registration and annotation resolution.

use karst_ir::{Module, Span, StructDecl, TypeExpr};

use super::ModuleChecker;
use crate::core::Type;
use crate::error::{CheckError, TypeError};
use crate::manager::{Field, TemplateMap};

impl ModuleChecker<'_> {
    /// Register every struct declaration, in source order.
    ///
    /// Field annotations are resolved against the registry as it stands
    /// when their struct is reached, so a struct may embed any struct
    /// declared above it but none below (declare-before-use). Pointer
    /// and span fields are no exception: the pointee must already be
    /// registered.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn register_structs(&mut self, module: &Module) -> Result<(), CheckError> {
        for decl in &module.structs {
            self.register_struct(decl)?;
        }
        Ok(())
    }

    fn register_struct(&mut self, decl: &StructDecl) -> Result<(), CheckError> {
        let mut fields = Vec::with_capacity(decl.fields.len());
        for field in &decl.fields {
            let ty = self.resolve_annotation(&field.ty, field.span)?;
            fields.push(Field::new(field.name, ty));
        }

        let head = Type::struct_type(decl.name, self.module_path.clone(), Vec::new());
        if !self.types.add(head, fields, TemplateMap::default()) {
            return Err(TypeError::DuplicateStruct(decl.name).at(decl.span));
        }
        Ok(())
    }

    /// Resolve a written type annotation into a semantic type.
    ///
    /// The structural translation is mechanical; the interesting part is
    /// the registry check at the end, which rejects any annotation whose
    /// struct components are not yet registered.
    pub(super) fn resolve_annotation(
        &self,
        annotation: &TypeExpr,
        span: Span,
    ) -> Result<Type, CheckError> {
        let ty = self.build_type(annotation, span)?;
        if !self.types.contains(&ty) {
            return Err(TypeError::UnknownType(ty).at(span));
        }
        Ok(ty)
    }

    fn build_type(&self, annotation: &TypeExpr, span: Span) -> Result<Type, CheckError> {
        Ok(match annotation {
            TypeExpr::Fundamental(f) => Type::new(crate::core::TypeKind::Fundamental(*f)),
            TypeExpr::Named { name, templates } => {
                let mut args = Vec::with_capacity(templates.len());
                for t in templates {
                    args.push(self.build_type(t, span)?);
                }
                Type::struct_type(*name, self.module_path.clone(), args)
            }
            TypeExpr::Ptr(inner) => self.build_type(inner, span)?.add_ptr(),
            TypeExpr::Array { inner, len } => self.build_type(inner, span)?.add_array(*len),
            TypeExpr::Span(inner) => self.build_type(inner, span)?.add_span(),
            TypeExpr::Const(inner) => self.build_type(inner, span)?.add_const(),
            TypeExpr::FunctionPtr { params, ret } => {
                let mut param_tys = Vec::with_capacity(params.len());
                for p in params {
                    param_tys.push(self.build_type(p, span)?);
                }
                let ret = self.build_type(ret, span)?;
                Type::new(crate::core::TypeKind::FunctionPtr {
                    params: param_tys,
                    ret: Box::new(ret),
                })
            }
            TypeExpr::Arena => Type::arena(),
        })
    }
}
