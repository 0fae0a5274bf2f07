//! Registry of declared struct types.
//!
//! The `TypeManager` is the single source of truth for struct layouts:
//! which struct identities exist, their ordered field lists, and their
//! template-parameter bindings. It is mutated only through `add` during
//! declaration collection; every later phase queries it read-only.
//!
//! # Failure semantics
//!
//! `fields_of` and `templates_of` treat an unregistered struct as
//! opaque (empty result). `size_of` on an unregistered struct is a
//! fatal assertion: by the time sizes are computed, the check pass has
//! already validated existence via `contains`, so a miss is a compiler
//! bug, not a user error.

use karst_ir::{Fundamental, Name};
use rustc_hash::FxHashMap;

use crate::core::{Type, TypeKind};

/// Pointer width of the Karst runtime, in bytes. The runtime is a
/// 64-bit VM; sizes are target constants, not host queries.
pub const PTR_SIZE: u64 = 8;

/// Machine word width of the Karst runtime, in bytes (the span length
/// field).
pub const WORD_SIZE: u64 = 8;

/// A declared field of a registered struct.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Field {
    pub name: Name,
    pub ty: Type,
}

impl Field {
    /// Create a new field.
    pub fn new(name: Name, ty: Type) -> Self {
        Field { name, ty }
    }
}

/// Template parameter name to bound type.
pub type TemplateMap = FxHashMap<Name, Type>;

/// Layout and template bindings of one registered struct.
#[derive(Clone, Debug, Default)]
struct TypeInfo {
    /// Fields in declaration order. Order determines memory layout.
    fields: Vec<Field>,
    templates: TemplateMap,
}

/// Registry of declared struct types.
#[derive(Clone, Debug, Default)]
pub struct TypeManager {
    classes: FxHashMap<Type, TypeInfo>,
    /// Registration order, for deterministic iteration.
    order: Vec<Type>,
}

impl TypeManager {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new struct identity with its fields and template
    /// bindings.
    ///
    /// Returns `false` and performs no mutation if the identity is
    /// already registered. The key is the const-stripped struct type.
    pub fn add(&mut self, name: Type, fields: Vec<Field>, templates: TemplateMap) -> bool {
        let key = name.remove_const();
        if self.classes.contains_key(&key) {
            return false;
        }
        tracing::debug!(ty = ?key, fields = fields.len(), "register struct");
        self.order.push(key.clone());
        self.classes.insert(key, TypeInfo { fields, templates });
        true
    }

    /// Check whether a type is fully resolvable.
    ///
    /// Structs must be registered; single-inner compounds recurse into
    /// their inner type; every other variant carries no registry
    /// dependency and is trivially resolvable. A pointer to an
    /// unregistered struct is therefore unresolved, even though the
    /// pointer itself has a known size.
    pub fn contains(&self, ty: &Type) -> bool {
        match &ty.kind {
            TypeKind::Struct(_) => self.lookup(ty).is_some(),
            TypeKind::Array { inner, .. }
            | TypeKind::Ptr(inner)
            | TypeKind::Span(inner)
            | TypeKind::TypeValue(inner) => self.contains(inner),
            _ => true,
        }
    }

    /// Compute the in-memory byte footprint of a type.
    ///
    /// Compile-time-only kinds (builtins, type values, functions,
    /// templates, modules, ct-bools) occupy zero bytes; an empty struct
    /// still occupies one, so every value has a distinct address.
    ///
    /// # Panics
    /// Panics if the type is (or contains, where size requires it) an
    /// unregistered struct.
    pub fn size_of(&self, ty: &Type) -> u64 {
        match &ty.kind {
            TypeKind::Fundamental(f) => match f {
                Fundamental::Null | Fundamental::Bool | Fundamental::Char => 1,
                Fundamental::I32 => 4,
                Fundamental::I64 | Fundamental::U64 | Fundamental::F64 | Fundamental::Nullptr => 8,
            },
            TypeKind::Struct(_) => {
                let Some(info) = self.lookup(ty) else {
                    panic!("size_of unregistered struct type {ty:?}");
                };
                let size: u64 = info.fields.iter().map(|f| self.size_of(&f.ty)).sum();
                // Empty structs take up one byte.
                size.max(1)
            }
            TypeKind::Array { inner, len } => self.size_of(inner) * len,
            TypeKind::Ptr(_)
            | TypeKind::FunctionPtr { .. }
            | TypeKind::BoundMethod { .. }
            | TypeKind::BoundMethodTemplate { .. }
            | TypeKind::Arena => PTR_SIZE,
            TypeKind::Span(_) => PTR_SIZE + WORD_SIZE,
            TypeKind::Builtin { .. }
            | TypeKind::TypeValue(_)
            | TypeKind::Function { .. }
            | TypeKind::FunctionTemplate { .. }
            | TypeKind::StructTemplate { .. }
            | TypeKind::Module(_)
            | TypeKind::CtBool(_) => 0,
        }
    }

    /// Get the ordered field list of a struct type.
    ///
    /// Returns the empty slice if the type is unregistered (opaque);
    /// combine with `contains` to distinguish "no fields" from
    /// "unknown type".
    pub fn fields_of(&self, ty: &Type) -> &[Field] {
        self.lookup(ty).map_or(&[], |info| info.fields.as_slice())
    }

    /// Get the template-parameter bindings of a struct type.
    ///
    /// Same lookup discipline as `fields_of`: unregistered types yield
    /// an empty mapping.
    pub fn templates_of(&self, ty: &Type) -> TemplateMap {
        self.lookup(ty)
            .map(|info| info.templates.clone())
            .unwrap_or_default()
    }

    /// Number of registered structs.
    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if no structs are registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate registered struct identities in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Type> {
        self.order.iter()
    }

    /// Const-stripped lookup.
    fn lookup(&self, ty: &Type) -> Option<&TypeInfo> {
        if ty.is_const() {
            self.classes.get(&ty.clone().remove_const())
        } else {
            self.classes.get(ty)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use karst_ir::StringInterner;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn point(interner: &StringInterner) -> (Type, Vec<Field>) {
        let head = Type::struct_type(interner.intern("Point"), PathBuf::from("geo.ka"), vec![]);
        let fields = vec![
            Field::new(interner.intern("x"), Type::i32()),
            Field::new(interner.intern("y"), Type::i32()),
        ];
        (head, fields)
    }

    #[test]
    fn fundamental_sizes_are_fixed() {
        let tm = TypeManager::new();
        assert_eq!(tm.size_of(&Type::null()), 1);
        assert_eq!(tm.size_of(&Type::bool_()), 1);
        assert_eq!(tm.size_of(&Type::char_()), 1);
        assert_eq!(tm.size_of(&Type::i32()), 4);
        assert_eq!(tm.size_of(&Type::i64()), 8);
        assert_eq!(tm.size_of(&Type::u64()), 8);
        assert_eq!(tm.size_of(&Type::f64()), 8);
        assert_eq!(tm.size_of(&Type::nullptr()), 8);
    }

    #[test]
    fn size_ignores_const() {
        let tm = TypeManager::new();
        assert_eq!(tm.size_of(&Type::i32().add_const()), 4);
        assert_eq!(
            tm.size_of(&Type::char_().add_const().add_array(10)),
            10
        );
    }

    #[test]
    fn struct_size_is_field_sum_in_order() {
        let interner = StringInterner::new();
        let mut tm = TypeManager::new();
        let (head, fields) = point(&interner);
        assert!(tm.add(head.clone(), fields, TemplateMap::default()));
        assert_eq!(tm.size_of(&head), 8);

        // const qualification does not change the answer
        assert_eq!(tm.size_of(&head.add_const()), 8);
    }

    #[test]
    fn empty_struct_occupies_one_byte() {
        let interner = StringInterner::new();
        let mut tm = TypeManager::new();
        let unit = Type::struct_type(interner.intern("Unit"), PathBuf::from("m.ka"), vec![]);
        assert!(tm.add(unit.clone(), vec![], TemplateMap::default()));
        assert_eq!(tm.size_of(&unit), 1);
    }

    #[test]
    fn nested_struct_sizes_compose() {
        let interner = StringInterner::new();
        let mut tm = TypeManager::new();
        let (point, point_fields) = point(&interner);
        tm.add(point.clone(), point_fields, TemplateMap::default());

        let line = Type::struct_type(interner.intern("Line"), PathBuf::from("geo.ka"), vec![]);
        let line_fields = vec![
            Field::new(interner.intern("a"), point.clone()),
            Field::new(interner.intern("b"), point.clone()),
            Field::new(interner.intern("width"), Type::f64()),
        ];
        tm.add(line.clone(), line_fields, TemplateMap::default());
        assert_eq!(tm.size_of(&line), 8 + 8 + 8);
    }

    #[test]
    fn array_size_scales_with_count() {
        let tm = TypeManager::new();
        assert_eq!(tm.size_of(&Type::i32().add_array(5)), 20);
        assert_eq!(tm.size_of(&Type::i64().add_array(0)), 0);
        assert_eq!(
            tm.size_of(&Type::i32().add_array(3).add_array(2)),
            24
        );
    }

    #[test]
    fn pointer_likes_are_pointer_width() {
        let interner = StringInterner::new();
        let tm = TypeManager::new();
        // Pointers are opaque-sized: the pointee need not be registered.
        let unknown =
            Type::struct_type(interner.intern("Ghost"), PathBuf::from("m.ka"), vec![]);
        assert_eq!(tm.size_of(&unknown.clone().add_ptr()), PTR_SIZE);
        assert_eq!(tm.size_of(&Type::arena()), PTR_SIZE);
        assert_eq!(tm.size_of(&unknown.add_span()), PTR_SIZE + WORD_SIZE);
        assert_eq!(tm.size_of(&Type::string_literal()), 16);
    }

    #[test]
    fn compile_time_kinds_are_zero_sized() {
        let tm = TypeManager::new();
        assert_eq!(tm.size_of(&Type::new(TypeKind::CtBool(true))), 0);
        assert_eq!(
            tm.size_of(&Type::new(TypeKind::TypeValue(Box::new(Type::i32())))),
            0
        );
        assert_eq!(
            tm.size_of(&Type::new(TypeKind::Module(PathBuf::from("m.ka")))),
            0
        );
        assert_eq!(
            tm.size_of(&Type::new(TypeKind::Function {
                id: 0,
                params: vec![],
                ret: Box::new(Type::null()),
            })),
            0
        );
    }

    #[test]
    #[should_panic(expected = "size_of unregistered struct")]
    fn size_of_unregistered_struct_is_fatal() {
        let interner = StringInterner::new();
        let tm = TypeManager::new();
        let ghost = Type::struct_type(interner.intern("Ghost"), PathBuf::from("m.ka"), vec![]);
        let _ = tm.size_of(&ghost);
    }

    #[test]
    fn add_is_append_only() {
        let interner = StringInterner::new();
        let mut tm = TypeManager::new();
        let (head, fields) = point(&interner);

        assert!(tm.add(head.clone(), fields, TemplateMap::default()));

        // A second registration is rejected and leaves the original
        // layout untouched.
        let other_fields = vec![Field::new(interner.intern("z"), Type::f64())];
        assert!(!tm.add(head.clone(), other_fields, TemplateMap::default()));
        assert_eq!(tm.fields_of(&head).len(), 2);
        assert_eq!(tm.len(), 1);
    }

    #[test]
    fn add_strips_const_from_key() {
        let interner = StringInterner::new();
        let mut tm = TypeManager::new();
        let (head, fields) = point(&interner);
        assert!(tm.add(head.clone().add_const(), fields, TemplateMap::default()));
        assert!(tm.contains(&head));
        assert!(!tm.add(head, vec![], TemplateMap::default()));
    }

    #[test]
    fn contains_recurses_through_compounds() {
        let interner = StringInterner::new();
        let mut tm = TypeManager::new();
        let (head, fields) = point(&interner);

        // Unregistered: the struct and every wrapper around it
        assert!(!tm.contains(&head));
        assert!(!tm.contains(&head.clone().add_ptr()));
        assert!(!tm.contains(&head.clone().add_array(4)));
        assert!(!tm.contains(&head.clone().add_span()));
        assert!(!tm.contains(&Type::new(TypeKind::TypeValue(Box::new(head.clone())))));

        tm.add(head.clone(), fields, TemplateMap::default());

        assert!(tm.contains(&head));
        assert!(tm.contains(&head.clone().add_ptr()));
        assert!(tm.contains(&head.clone().add_array(4)));
        assert!(tm.contains(&head.clone().add_span()));
        assert!(tm.contains(&Type::new(TypeKind::TypeValue(Box::new(head)))));
    }

    #[test]
    fn contains_is_trivially_true_for_registry_free_kinds() {
        let tm = TypeManager::new();
        assert!(tm.contains(&Type::i32()));
        assert!(tm.contains(&Type::arena()));
        assert!(tm.contains(&Type::new(TypeKind::CtBool(false))));
        assert!(tm.contains(&Type::new(TypeKind::Module(PathBuf::from("m.ka")))));
        assert!(tm.contains(&Type::new(TypeKind::FunctionPtr {
            params: vec![Type::i32()],
            ret: Box::new(Type::null()),
        })));
    }

    #[test]
    fn unregistered_lookups_are_empty_not_fatal() {
        let interner = StringInterner::new();
        let tm = TypeManager::new();
        let ghost = Type::struct_type(interner.intern("Ghost"), PathBuf::from("m.ka"), vec![]);
        assert!(tm.fields_of(&ghost).is_empty());
        assert!(tm.templates_of(&ghost).is_empty());
    }

    #[test]
    fn lookups_strip_const() {
        let interner = StringInterner::new();
        let mut tm = TypeManager::new();
        let (head, fields) = point(&interner);
        tm.add(head.clone(), fields, TemplateMap::default());

        let const_head = head.add_const();
        assert_eq!(tm.fields_of(&const_head).len(), 2);
    }

    #[test]
    fn template_bindings_are_preserved() {
        let interner = StringInterner::new();
        let mut tm = TypeManager::new();
        let t_param = interner.intern("T");
        let head = Type::struct_type(
            interner.intern("List"),
            PathBuf::from("list.ka"),
            vec![Type::i32()],
        );
        let mut templates = TemplateMap::default();
        templates.insert(t_param, Type::i32());
        let fields = vec![
            Field::new(interner.intern("data"), Type::i32().add_ptr()),
            Field::new(interner.intern("len"), Type::u64()),
        ];
        tm.add(head.clone(), fields, templates);

        let bindings = tm.templates_of(&head);
        assert_eq!(bindings.get(&t_param), Some(&Type::i32()));

        // A different instantiation is a different identity.
        let other = Type::struct_type(
            interner.intern("List"),
            PathBuf::from("list.ka"),
            vec![Type::u64()],
        );
        assert!(!tm.contains(&other));
    }

    #[test]
    fn iteration_follows_registration_order() {
        let interner = StringInterner::new();
        let mut tm = TypeManager::new();
        let b = Type::struct_type(interner.intern("Beta"), PathBuf::from("m.ka"), vec![]);
        let a = Type::struct_type(interner.intern("Alpha"), PathBuf::from("m.ka"), vec![]);
        tm.add(b.clone(), vec![], TemplateMap::default());
        tm.add(a.clone(), vec![], TemplateMap::default());
        let order: Vec<_> = tm.iter().cloned().collect();
        assert_eq!(order, vec![b, a]);
    }
}
