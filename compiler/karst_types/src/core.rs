//! Core type representation.
//!
//! `Type` is a plain value: structural equality, derived hashing, owned
//! recursive payloads behind `Box`. Two types with equal structure are
//! interchangeable everywhere, which the registry and the checker rely
//! on for equality-based lookups. Structs never embed themselves
//! structurally; self-reference goes through the registry by name, so
//! the representation is always a finite tree.

use std::path::PathBuf;

use bitflags::bitflags;
use karst_ir::{Fundamental, Name, StringInterner};

bitflags! {
    /// Qualifier flags carried orthogonally to the type's shape.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Qualifiers: u8 {
        /// The value may not be written through.
        const CONST = 1;
    }
}

/// A named struct type: its name, owning module, and template arguments.
///
/// The template argument list is part of the struct's identity:
/// `List<i32>` and `List<u64>` are distinct registry keys.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct StructType {
    pub name: Name,
    pub module: PathBuf,
    pub templates: Vec<Type>,
}

/// The shape of a type, one variant per form expressible in Karst.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeKind {
    /// A built-in scalar: `null`, `bool`, `char`, `i32`, `i64`, `u64`,
    /// `f64`, `nullptr`.
    Fundamental(Fundamental),

    /// A user-declared struct, resolved by name through the registry.
    Struct(StructType),

    /// A fixed-size array: `[T; N]`.
    Array { inner: Box<Type>, len: u64 },

    /// A pointer: `&T`.
    Ptr(Box<Type>),

    /// A span: `[T]`, a pointer plus a runtime length.
    Span(Box<Type>),

    /// The arena handle type. The runtime tracks the backing storage
    /// separately; at this layer it is an opaque pointer-sized handle.
    Arena,

    /// A function pointer: `fn(A, B) -> R`.
    FunctionPtr { params: Vec<Type>, ret: Box<Type> },

    /// A method bound to a receiver instance. The id distinguishes
    /// otherwise-identical signatures; the name is for printing only.
    BoundMethod {
        params: Vec<Type>,
        ret: Box<Type>,
        name: Name,
        id: u64,
    },

    /// An unresolved method on a generic struct.
    BoundMethodTemplate {
        module: PathBuf,
        strct: StructType,
        name: Name,
    },

    /// A compiler-intrinsic callable. The name is for printing only.
    Builtin {
        name: Name,
        id: u64,
        args: Vec<Type>,
        ret: Box<Type>,
    },

    /// A type held as a first-class compile-time value: `typeof(T)`.
    TypeValue(Box<Type>),

    /// A concrete top-level function signature.
    Function {
        id: u64,
        params: Vec<Type>,
        ret: Box<Type>,
    },

    /// An unresolved generic top-level function (or generic method, when
    /// `strct` is set).
    FunctionTemplate {
        module: PathBuf,
        strct: Option<StructType>,
        name: Name,
    },

    /// An unresolved generic struct.
    StructTemplate { module: PathBuf, name: Name },

    /// A reference to another compilation unit by filesystem path.
    Module(PathBuf),

    /// A compile-time boolean promoted to a type, carrying its value.
    CtBool(bool),
}

/// A Karst type: a shape plus orthogonal qualifiers.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Type {
    pub kind: TypeKind,
    pub quals: Qualifiers,
}

impl Type {
    /// Create an unqualified type from a shape.
    #[inline]
    pub const fn new(kind: TypeKind) -> Self {
        Type {
            kind,
            quals: Qualifiers::empty(),
        }
    }

    // === Canonical constructors ===

    /// The `null` type (also the return type of value-less functions).
    pub fn null() -> Type {
        Type::new(TypeKind::Fundamental(Fundamental::Null))
    }

    /// The `nullptr` type.
    pub fn nullptr() -> Type {
        Type::new(TypeKind::Fundamental(Fundamental::Nullptr))
    }

    /// The `bool` type.
    pub fn bool_() -> Type {
        Type::new(TypeKind::Fundamental(Fundamental::Bool))
    }

    /// The `char` type.
    pub fn char_() -> Type {
        Type::new(TypeKind::Fundamental(Fundamental::Char))
    }

    /// The `i32` type.
    pub fn i32() -> Type {
        Type::new(TypeKind::Fundamental(Fundamental::I32))
    }

    /// The `i64` type.
    pub fn i64() -> Type {
        Type::new(TypeKind::Fundamental(Fundamental::I64))
    }

    /// The `u64` type.
    pub fn u64() -> Type {
        Type::new(TypeKind::Fundamental(Fundamental::U64))
    }

    /// The `f64` type.
    pub fn f64() -> Type {
        Type::new(TypeKind::Fundamental(Fundamental::F64))
    }

    /// The arena handle type.
    pub fn arena() -> Type {
        Type::new(TypeKind::Arena)
    }

    /// The type of string literals: a span of const char.
    pub fn string_literal() -> Type {
        Type::char_().add_const().add_span()
    }

    /// A struct type head.
    pub fn struct_type(name: Name, module: PathBuf, templates: Vec<Type>) -> Type {
        Type::new(TypeKind::Struct(StructType {
            name,
            module,
            templates,
        }))
    }

    // === Layer algebra ===
    //
    // Adding a layer wraps the receiver; removing one strips exactly
    // that layer. Removing a layer that is not present is a compiler
    // bug, surfaced as a fatal assertion: callers check `is_ptr` and
    // friends first.

    /// Wrap in a pointer.
    #[must_use]
    pub fn add_ptr(self) -> Type {
        Type::new(TypeKind::Ptr(Box::new(self)))
    }

    /// Strip one pointer layer.
    ///
    /// # Panics
    /// Panics if the type is not a pointer.
    #[must_use]
    pub fn remove_ptr(self) -> Type {
        match self.kind {
            TypeKind::Ptr(inner) => *inner,
            ref other => panic!("remove_ptr on non-pointer type {other:?}"),
        }
    }

    /// Wrap in an array of the given length.
    #[must_use]
    pub fn add_array(self, len: u64) -> Type {
        Type::new(TypeKind::Array {
            inner: Box::new(self),
            len,
        })
    }

    /// Strip one array layer.
    ///
    /// # Panics
    /// Panics if the type is not an array.
    #[must_use]
    pub fn remove_array(self) -> Type {
        match self.kind {
            TypeKind::Array { inner, .. } => *inner,
            ref other => panic!("remove_array on non-array type {other:?}"),
        }
    }

    /// Wrap in a span.
    #[must_use]
    pub fn add_span(self) -> Type {
        Type::new(TypeKind::Span(Box::new(self)))
    }

    /// Strip one span layer.
    ///
    /// # Panics
    /// Panics if the type is not a span.
    #[must_use]
    pub fn remove_span(self) -> Type {
        match self.kind {
            TypeKind::Span(inner) => *inner,
            ref other => panic!("remove_span on non-span type {other:?}"),
        }
    }

    /// Add the const qualifier.
    #[must_use]
    pub fn add_const(mut self) -> Type {
        self.quals |= Qualifiers::CONST;
        self
    }

    /// Remove the const qualifier (no-op if absent).
    #[must_use]
    pub fn remove_const(mut self) -> Type {
        self.quals -= Qualifiers::CONST;
        self
    }

    // === Tag tests ===

    /// Check if this is a const-qualified type.
    #[inline]
    pub fn is_const(&self) -> bool {
        self.quals.contains(Qualifiers::CONST)
    }

    #[inline]
    pub fn is_fundamental(&self) -> bool {
        matches!(self.kind, TypeKind::Fundamental(_))
    }

    #[inline]
    pub fn is_ptr(&self) -> bool {
        matches!(self.kind, TypeKind::Ptr(_))
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self.kind, TypeKind::Array { .. })
    }

    #[inline]
    pub fn is_span(&self) -> bool {
        matches!(self.kind, TypeKind::Span(_))
    }

    #[inline]
    pub fn is_function(&self) -> bool {
        matches!(self.kind, TypeKind::Function { .. })
    }

    #[inline]
    pub fn is_function_ptr(&self) -> bool {
        matches!(self.kind, TypeKind::FunctionPtr { .. })
    }

    #[inline]
    pub fn is_builtin(&self) -> bool {
        matches!(self.kind, TypeKind::Builtin { .. })
    }

    #[inline]
    pub fn is_bound_method(&self) -> bool {
        matches!(self.kind, TypeKind::BoundMethod { .. })
    }

    #[inline]
    pub fn is_arena(&self) -> bool {
        matches!(self.kind, TypeKind::Arena)
    }

    #[inline]
    pub fn is_struct(&self) -> bool {
        matches!(self.kind, TypeKind::Struct(_))
    }

    #[inline]
    pub fn is_type_value(&self) -> bool {
        matches!(self.kind, TypeKind::TypeValue(_))
    }

    #[inline]
    pub fn is_module_value(&self) -> bool {
        matches!(self.kind, TypeKind::Module(_))
    }

    // === Payload access ===

    /// Get the struct payload.
    ///
    /// # Panics
    /// Panics if the type is not a struct.
    pub fn as_struct(&self) -> &StructType {
        match &self.kind {
            TypeKind::Struct(s) => s,
            other => panic!("as_struct on non-struct type {other:?}"),
        }
    }

    /// Extract the single wrapped type of a compound with exactly one
    /// inner type (array, pointer, span, or type value).
    ///
    /// # Panics
    /// Panics for every other variant.
    pub fn inner_type(&self) -> &Type {
        match &self.kind {
            TypeKind::Array { inner, .. }
            | TypeKind::Ptr(inner)
            | TypeKind::Span(inner)
            | TypeKind::TypeValue(inner) => inner,
            other => panic!("inner_type on type without a single inner type {other:?}"),
        }
    }

    /// Extract the element count of an array.
    ///
    /// # Panics
    /// Panics if the type is not an array.
    pub fn array_length(&self) -> u64 {
        match &self.kind {
            TypeKind::Array { len, .. } => *len,
            other => panic!("array_length on non-array type {other:?}"),
        }
    }

    /// Convert a concrete function type to the corresponding function
    /// pointer type (used when a function name is taken by address).
    ///
    /// # Panics
    /// Panics if the type is not a function.
    #[must_use]
    pub fn to_function_ptr(&self) -> Type {
        match &self.kind {
            TypeKind::Function { params, ret, .. } => Type::new(TypeKind::FunctionPtr {
                params: params.clone(),
                ret: ret.clone(),
            }),
            other => panic!("to_function_ptr on non-function type {other:?}"),
        }
    }

    // === Rendering ===

    /// Render this type for diagnostics.
    ///
    /// Every compound form has a distinct bracketing, so nesting is
    /// unambiguous: `&[i32; 3]` (pointer to array) never collides with
    /// `[&i32; 3]` (array of pointers).
    pub fn display(&self, interner: &StringInterner) -> String {
        let base = match &self.kind {
            TypeKind::Fundamental(f) => f.as_str().to_string(),
            TypeKind::Struct(s) => {
                let name = interner.lookup(s.name);
                if s.templates.is_empty() {
                    name.to_string()
                } else {
                    format!("{}<{}>", name, join_types(&s.templates, interner))
                }
            }
            TypeKind::Array { inner, len } => {
                format!("[{}; {}]", inner.display(interner), len)
            }
            TypeKind::Ptr(inner) => format!("&{}", inner.display(interner)),
            TypeKind::Span(inner) => format!("[{}]", inner.display(interner)),
            TypeKind::Arena => "arena".to_string(),
            TypeKind::FunctionPtr { params, ret } => {
                format!(
                    "fn({}) -> {}",
                    join_types(params, interner),
                    ret.display(interner)
                )
            }
            TypeKind::BoundMethod {
                params, ret, name, ..
            } => {
                format!(
                    "method {}({}) -> {}",
                    interner.lookup(*name),
                    join_types(params, interner),
                    ret.display(interner)
                )
            }
            TypeKind::BoundMethodTemplate { strct, name, .. } => {
                format!(
                    "method template {}.{}",
                    interner.lookup(strct.name),
                    interner.lookup(*name)
                )
            }
            TypeKind::Builtin {
                name, args, ret, ..
            } => {
                format!(
                    "builtin {}({}) -> {}",
                    interner.lookup(*name),
                    join_types(args, interner),
                    ret.display(interner)
                )
            }
            TypeKind::TypeValue(inner) => format!("typeof({})", inner.display(interner)),
            TypeKind::Function { id, params, ret } => {
                format!(
                    "fn#{}({}) -> {}",
                    id,
                    join_types(params, interner),
                    ret.display(interner)
                )
            }
            TypeKind::FunctionTemplate { strct, name, .. } => match strct {
                Some(s) => format!(
                    "fn template {}.{}",
                    interner.lookup(s.name),
                    interner.lookup(*name)
                ),
                None => format!("fn template {}", interner.lookup(*name)),
            },
            TypeKind::StructTemplate { name, .. } => {
                format!("struct template {}", interner.lookup(*name))
            }
            TypeKind::Module(path) => format!("module \"{}\"", path.display()),
            TypeKind::CtBool(value) => format!("ctbool({value})"),
        };
        if self.is_const() {
            format!("const {base}")
        } else {
            base
        }
    }
}

fn join_types(types: &[Type], interner: &StringInterner) -> String {
    types
        .iter()
        .map(|t| t.display(interner))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn interner() -> StringInterner {
        StringInterner::new()
    }

    #[test]
    fn layer_algebra_round_trips() {
        let ty = Type::i32().add_ptr();
        assert!(ty.is_ptr());
        assert_eq!(ty.remove_ptr(), Type::i32());

        let ty = Type::bool_().add_array(4);
        assert!(ty.is_array());
        assert_eq!(ty.array_length(), 4);
        assert_eq!(ty.remove_array(), Type::bool_());

        let ty = Type::char_().add_span();
        assert!(ty.is_span());
        assert_eq!(ty.remove_span(), Type::char_());
    }

    #[test]
    fn const_is_orthogonal_to_shape() {
        let ty = Type::i32().add_const();
        assert!(ty.is_const());
        assert!(ty.is_fundamental());
        assert_eq!(ty.remove_const(), Type::i32());
        // remove_const on an unqualified type is a no-op
        assert_eq!(Type::i32().remove_const(), Type::i32());
    }

    #[test]
    #[should_panic(expected = "remove_ptr on non-pointer type")]
    fn remove_ptr_on_non_pointer_is_fatal() {
        let _ = Type::i32().remove_ptr();
    }

    #[test]
    #[should_panic(expected = "inner_type on type without a single inner type")]
    fn inner_type_requires_single_inner() {
        let _ = Type::arena().inner_type();
    }

    #[test]
    fn equal_structures_hash_identically() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let a = Type::i32().add_array(3).add_ptr();
        let b = Type::i32().add_array(3).add_ptr();
        assert_eq!(a, b);

        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn const_participates_in_equality() {
        assert_ne!(Type::i32(), Type::i32().add_const());
        assert_eq!(
            Type::i32().add_const().remove_const(),
            Type::i32()
        );
    }

    #[test]
    fn nesting_order_matters() {
        let ptr_to_array = Type::i32().add_array(3).add_ptr();
        let array_of_ptr = Type::i32().add_ptr().add_array(3);
        assert_ne!(ptr_to_array, array_of_ptr);

        let i = interner();
        assert_eq!(ptr_to_array.display(&i), "&[i32; 3]");
        assert_eq!(array_of_ptr.display(&i), "[&i32; 3]");
    }

    #[test]
    fn string_literal_is_span_of_const_char() {
        let ty = Type::string_literal();
        assert!(ty.is_span());
        assert!(ty.inner_type().is_const());
        assert_eq!(ty.display(&interner()), "[const char]");
    }

    #[test]
    fn display_compound_forms() {
        let i = interner();
        assert_eq!(Type::null().display(&i), "null");
        assert_eq!(Type::arena().display(&i), "arena");
        assert_eq!(
            Type::i64().add_const().display(&i),
            "const i64"
        );

        let fn_ptr = Type::new(TypeKind::FunctionPtr {
            params: vec![Type::i32(), Type::bool_()],
            ret: Box::new(Type::f64()),
        });
        assert_eq!(fn_ptr.display(&i), "fn(i32, bool) -> f64");

        let name = i.intern("Point");
        let strct = Type::struct_type(name, PathBuf::from("geo.ka"), vec![]);
        assert_eq!(strct.display(&i), "Point");
        assert_eq!(strct.add_span().display(&i), "[Point]");

        let generic = Type::struct_type(
            i.intern("List"),
            PathBuf::from("list.ka"),
            vec![Type::u64()],
        );
        assert_eq!(generic.display(&i), "List<u64>");
    }

    #[test]
    fn function_to_pointer_drops_identity() {
        let f = Type::new(TypeKind::Function {
            id: 9,
            params: vec![Type::i32()],
            ret: Box::new(Type::null()),
        });
        let p = f.to_function_ptr();
        assert!(p.is_function_ptr());

        let g = Type::new(TypeKind::Function {
            id: 10,
            params: vec![Type::i32()],
            ret: Box::new(Type::null()),
        });
        // Same signature, different id: distinct functions,
        // identical pointer types.
        assert_ne!(f, g);
        assert_eq!(p, g.to_function_ptr());
    }

    #[test]
    fn struct_identity_includes_templates() {
        let i = interner();
        let name = i.intern("List");
        let a = Type::struct_type(name, PathBuf::from("m.ka"), vec![Type::i32()]);
        let b = Type::struct_type(name, PathBuf::from("m.ka"), vec![Type::u64()]);
        assert_ne!(a, b);
    }

    #[test]
    fn ct_bool_carries_value() {
        let t = Type::new(TypeKind::CtBool(true));
        let f = Type::new(TypeKind::CtBool(false));
        assert_ne!(t, f);
        assert_eq!(t.display(&interner()), "ctbool(true)");
    }
}
