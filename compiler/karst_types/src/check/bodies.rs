//! Statement and expression checking.

use karst_ir::{
    BinaryOp, ExprId, ExprKind, Fundamental, FunctionDecl, Literal, Module, StmtId, StmtKind,
    UnaryOp,
};

use super::{types_compatible, ModuleChecker};
use crate::core::{Type, TypeKind};
use crate::error::{CheckError, TypeError};

impl ModuleChecker<'_> {
    /// Check every function body in the module.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn check_bodies(&mut self, module: &Module) -> Result<(), CheckError> {
        for decl in &module.functions {
            self.check_function(decl)?;
        }
        Ok(())
    }

    fn check_function(&mut self, decl: &FunctionDecl) -> Result<(), CheckError> {
        // Signatures were resolved up front; a missing one here means
        // collection was skipped.
        let Some(sig) = self.signatures.get(&decl.name) else {
            panic!("body checked before signature collection");
        };
        let ret = sig.ret.clone();
        let params = sig.params.clone();

        self.push_scope();
        for (param, ty) in decl.params.iter().zip(params) {
            self.bind(param.name, ty);
        }
        for id in self.arena.stmt_ids(decl.body) {
            self.check_stmt(id, &ret)?;
        }
        self.pop_scope();
        Ok(())
    }

    fn check_stmt(&mut self, id: StmtId, ret: &Type) -> Result<(), CheckError> {
        let stmt = self.arena.stmt(id).clone();
        match stmt.kind {
            StmtKind::Let { name, ty, init } => {
                let init_ty = self.check_expr(init)?;
                let bound = match ty {
                    Some(annotation) => {
                        let declared = self.resolve_annotation(&annotation, stmt.span)?;
                        if !types_compatible(&declared, &init_ty) {
                            let span = self.arena.expr(init).span;
                            return Err(TypeError::Mismatch {
                                expected: declared,
                                found: init_ty,
                            }
                            .at(span));
                        }
                        declared
                    }
                    None => init_ty,
                };
                self.bind(name, bound);
            }
            StmtKind::Assign { target, value } => {
                let target_ty = self.check_expr(target)?;
                if target_ty.is_const() {
                    let span = self.arena.expr(target).span;
                    return Err(TypeError::AssignToConst(target_ty).at(span));
                }
                let value_ty = self.check_expr(value)?;
                if !types_compatible(&target_ty, &value_ty) {
                    let span = self.arena.expr(value).span;
                    return Err(TypeError::Mismatch {
                        expected: target_ty,
                        found: value_ty,
                    }
                    .at(span));
                }
            }
            StmtKind::Expr(expr) => {
                self.check_expr(expr)?;
            }
            StmtKind::Return { value } => match value {
                Some(expr) => {
                    let found = self.check_expr(expr)?;
                    if !types_compatible(ret, &found) {
                        let span = self.arena.expr(expr).span;
                        return Err(TypeError::Mismatch {
                            expected: ret.clone(),
                            found,
                        }
                        .at(span));
                    }
                }
                None => {
                    // A bare `return` yields the null value.
                    if ret != &Type::null() {
                        return Err(TypeError::Mismatch {
                            expected: ret.clone(),
                            found: Type::null(),
                        }
                        .at(stmt.span));
                    }
                }
            },
            StmtKind::While { cond, body } => {
                self.check_condition(cond)?;
                self.push_scope();
                for id in self.arena.stmt_ids(body) {
                    self.check_stmt(id, ret)?;
                }
                self.pop_scope();
            }
            StmtKind::If {
                cond,
                then_body,
                else_body,
            } => {
                self.check_condition(cond)?;
                for body in [then_body, else_body] {
                    self.push_scope();
                    for id in self.arena.stmt_ids(body) {
                        self.check_stmt(id, ret)?;
                    }
                    self.pop_scope();
                }
            }
            StmtKind::Assert { cond } => {
                self.check_condition(cond)?;
            }
        }
        Ok(())
    }

    /// Conditions read a `bool`; constness is irrelevant to a read.
    fn check_condition(&mut self, cond: ExprId) -> Result<(), CheckError> {
        let ty = self.check_expr(cond)?;
        if ty.clone().remove_const() != Type::bool_() {
            let span = self.arena.expr(cond).span;
            return Err(TypeError::Mismatch {
                expected: Type::bool_(),
                found: ty,
            }
            .at(span));
        }
        Ok(())
    }

    /// Infer an expression's type and record it.
    ///
    /// Every expression reachable from a checked body ends up in the
    /// `expr_types` table exactly once.
    fn check_expr(&mut self, id: ExprId) -> Result<Type, CheckError> {
        let ty = self.infer_expr(id)?;
        self.record(id, ty)
    }

    fn infer_expr(&mut self, id: ExprId) -> Result<Type, CheckError> {
        let expr = self.arena.expr(id).clone();
        let span = expr.span;
        match expr.kind {
            ExprKind::Literal(lit) => Ok(literal_type(lit)),

            ExprKind::Name(name) => {
                if let Some(ty) = self.lookup_local(name) {
                    return Ok(ty.clone());
                }
                if let Some(sig) = self.signatures.get(&name) {
                    return Ok(Type::new(TypeKind::Function {
                        id: sig.id,
                        params: sig.params.clone(),
                        ret: Box::new(sig.ret.clone()),
                    }));
                }
                Err(TypeError::UnknownIdent(name).at(span))
            }

            ExprKind::Field { object, field } => {
                let object_ty = self.check_expr(object)?;
                let shape = object_ty.clone().remove_const();
                if shape.is_struct() {
                    let field_ty = self
                        .types
                        .fields_of(&shape)
                        .iter()
                        .find(|f| f.name == field)
                        .map(|f| f.ty.clone());
                    if let Some(mut ty) = field_ty {
                        // Reading through a const value yields const.
                        if object_ty.is_const() {
                            ty = ty.add_const();
                        }
                        return Ok(ty);
                    }
                }
                Err(TypeError::UnknownField {
                    ty: object_ty,
                    field,
                }
                .at(span))
            }

            ExprKind::Index { object, index } => {
                let index_ty = self.check_expr(index)?;
                if index_ty.clone().remove_const() != Type::u64() {
                    let index_span = self.arena.expr(index).span;
                    return Err(TypeError::Mismatch {
                        expected: Type::u64(),
                        found: index_ty,
                    }
                    .at(index_span));
                }

                let object_ty = self.check_expr(object)?;
                let shape = object_ty.clone().remove_const();
                match shape.kind {
                    TypeKind::Array { inner, .. } | TypeKind::Span(inner) => {
                        let mut element = *inner;
                        if object_ty.is_const() {
                            element = element.add_const();
                        }
                        Ok(element)
                    }
                    _ => {
                        let object_span = self.arena.expr(object).span;
                        Err(TypeError::NotIndexable(object_ty).at(object_span))
                    }
                }
            }

            ExprKind::Call { callee, args } => {
                let callee_ty = self.check_expr(callee)?;
                let (params, ret) = match &callee_ty.kind {
                    TypeKind::Function { params, ret, .. }
                    | TypeKind::FunctionPtr { params, ret }
                    | TypeKind::BoundMethod { params, ret, .. } => {
                        (params.clone(), ret.as_ref().clone())
                    }
                    TypeKind::Builtin { args, ret, .. } => (args.clone(), ret.as_ref().clone()),
                    _ => {
                        let callee_span = self.arena.expr(callee).span;
                        return Err(TypeError::NotCallable(callee_ty).at(callee_span));
                    }
                };

                let arg_ids = self.arena.expr_list(args).to_vec();
                if arg_ids.len() != params.len() {
                    return Err(TypeError::ArgCountMismatch {
                        expected: params.len(),
                        found: arg_ids.len(),
                    }
                    .at(span));
                }
                for (arg, param) in arg_ids.into_iter().zip(params) {
                    let found = self.check_expr(arg)?;
                    if !types_compatible(&param, &found) {
                        let arg_span = self.arena.expr(arg).span;
                        return Err(TypeError::Mismatch {
                            expected: param,
                            found,
                        }
                        .at(arg_span));
                    }
                }
                Ok(ret)
            }

            ExprKind::Unary { op, operand } => {
                let operand_ty = self.check_expr(operand)?;
                let shape = operand_ty.clone().remove_const();
                let operand_span = self.arena.expr(operand).span;
                match op {
                    UnaryOp::Neg => {
                        if is_signed_numeric(&shape) {
                            Ok(shape)
                        } else {
                            Err(TypeError::Mismatch {
                                expected: Type::i64(),
                                found: operand_ty,
                            }
                            .at(operand_span))
                        }
                    }
                    UnaryOp::Not => {
                        if shape == Type::bool_() {
                            Ok(shape)
                        } else {
                            Err(TypeError::Mismatch {
                                expected: Type::bool_(),
                                found: operand_ty,
                            }
                            .at(operand_span))
                        }
                    }
                }
            }

            ExprKind::Binary { op, lhs, rhs } => self.infer_binary(op, lhs, rhs),

            ExprKind::AddrOf(inner) => {
                let inner_ty = self.check_expr(inner)?;
                // Taking a function's address decays it to a pointer;
                // the per-function identity is dropped.
                if inner_ty.is_function() {
                    Ok(inner_ty.to_function_ptr())
                } else {
                    Ok(inner_ty.add_ptr())
                }
            }

            ExprKind::Deref(inner) => {
                let inner_ty = self.check_expr(inner)?;
                let shape = inner_ty.clone().remove_const();
                if shape.is_ptr() {
                    Ok(shape.remove_ptr())
                } else {
                    let inner_span = self.arena.expr(inner).span;
                    Err(TypeError::Mismatch {
                        expected: inner_ty.clone().add_ptr(),
                        found: inner_ty,
                    }
                    .at(inner_span))
                }
            }

            ExprKind::SizeOf(annotation) => {
                self.resolve_annotation(&annotation, span)?;
                Ok(Type::u64())
            }

            ExprKind::Cast { expr: value, ty } => {
                let from = self.check_expr(value)?;
                let to = self.resolve_annotation(&ty, span)?;
                if cast_allowed(&from, &to) {
                    Ok(to)
                } else {
                    Err(TypeError::InvalidCast { from, to }.at(span))
                }
            }

            ExprKind::StructLiteral { ty, args } => {
                let resolved = self.resolve_annotation(&ty, span)?;
                if !resolved.clone().remove_const().is_struct() {
                    return Err(TypeError::NotConstructible(resolved).at(span));
                }
                let fields: Vec<_> = self.types.fields_of(&resolved).to_vec();

                let arg_ids = self.arena.expr_list(args).to_vec();
                if arg_ids.len() != fields.len() {
                    return Err(TypeError::ArgCountMismatch {
                        expected: fields.len(),
                        found: arg_ids.len(),
                    }
                    .at(span));
                }
                for (arg, field) in arg_ids.into_iter().zip(fields) {
                    let found = self.check_expr(arg)?;
                    if !types_compatible(&field.ty, &found) {
                        let arg_span = self.arena.expr(arg).span;
                        return Err(TypeError::Mismatch {
                            expected: field.ty,
                            found,
                        }
                        .at(arg_span));
                    }
                }
                Ok(resolved)
            }
        }
    }

    fn infer_binary(
        &mut self,
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    ) -> Result<Type, CheckError> {
        let lhs_ty = self.check_expr(lhs)?;
        let rhs_ty = self.check_expr(rhs)?;
        let lhs_shape = lhs_ty.clone().remove_const();
        let rhs_shape = rhs_ty.clone().remove_const();

        if op.is_logical() {
            for (shape, id, ty) in [(&lhs_shape, lhs, lhs_ty), (&rhs_shape, rhs, rhs_ty)] {
                if *shape != Type::bool_() {
                    let span = self.arena.expr(id).span;
                    return Err(TypeError::Mismatch {
                        expected: Type::bool_(),
                        found: ty,
                    }
                    .at(span));
                }
            }
            return Ok(Type::bool_());
        }

        // Both comparisons and arithmetic operate on operands of one
        // shared shape.
        if lhs_shape != rhs_shape {
            let span = self.arena.expr(rhs).span;
            return Err(TypeError::Mismatch {
                expected: lhs_shape,
                found: rhs_ty,
            }
            .at(span));
        }

        if op.is_comparison() {
            return Ok(Type::bool_());
        }

        if is_numeric(&lhs_shape) {
            Ok(lhs_shape)
        } else {
            let span = self.arena.expr(lhs).span;
            Err(TypeError::Mismatch {
                expected: Type::i64(),
                found: lhs_ty,
            }
            .at(span))
        }
    }
}

fn literal_type(lit: Literal) -> Type {
    match lit {
        Literal::I32(_) => Type::i32(),
        Literal::I64(_) => Type::i64(),
        Literal::U64(_) => Type::u64(),
        Literal::F64Bits(_) => Type::f64(),
        Literal::Bool(_) => Type::bool_(),
        Literal::Char(_) => Type::char_(),
        Literal::String(_) => Type::string_literal(),
        Literal::Null => Type::null(),
        Literal::Nullptr => Type::nullptr(),
    }
}

fn is_numeric(ty: &Type) -> bool {
    matches!(
        ty.kind,
        TypeKind::Fundamental(
            Fundamental::I32 | Fundamental::I64 | Fundamental::U64 | Fundamental::F64
        )
    )
}

fn is_signed_numeric(ty: &Type) -> bool {
    matches!(
        ty.kind,
        TypeKind::Fundamental(Fundamental::I32 | Fundamental::I64 | Fundamental::F64)
    )
}

/// Casts are allowed between value-carrying fundamentals, between
/// pointers, and from `nullptr` to any pointer type.
fn cast_allowed(from: &Type, to: &Type) -> bool {
    let from = from.clone().remove_const();
    let to = to.clone().remove_const();

    let null = Type::null();
    if from.is_fundamental() && to.is_fundamental() && from != null && to != null {
        return true;
    }
    if from.is_ptr() && to.is_ptr() {
        return true;
    }
    from == Type::nullptr() && to.is_ptr()
}
