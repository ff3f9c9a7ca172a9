//! Runtime values.
//!
//! # Heap Enforcement
//!
//! Heap-backed values go through factory methods on `Value`. `Heap<T>` has
//! a `pub(super)` constructor, so code outside this module cannot wrap an
//! `Arc` by hand:
//!
//! ```text
//! let s = Value::string("hello");            // OK
//! let p = Value::pointer(Value::int(3));     // OK
//! let s = Value::Str(Heap::new(...));        // ERROR: Heap::new is pub(super)
//! ```
//!
//! Nominal values (enum constants, aggregates, unions) are built against a
//! `TypeRegistry` and checked on the way in, so every value conforms to the
//! type it claims to have.
//!
//! # Sharing
//!
//! Cloning a value never copies a payload: heap parts are reference
//! counted. Pattern bindings are clones, so they share storage with the
//! subject. Mutation goes through copy-on-write (`pointee_mut`).

mod composite;
mod heap;
mod union;

use std::fmt;

use lv_types::{TypeId, TypeKind, TypeRegistry};

pub use composite::{AggregateValue, EnumValue, ExtensionValue};
pub use heap::Heap;
pub use union::{ActiveAlternative, AlternativeCtor, UnionType, UnionValue};

use crate::errors::{not_default_constructible, shape_mismatch, unknown_constant, EvalError};
use crate::extension::ExtensionObject;
use crate::stack::ensure_sufficient_stack;

/// Runtime value.
#[derive(Clone, Debug)]
pub enum Value {
    // Primitives (inline)
    Int(i64),
    Bool(bool),
    Char(char),
    Unit,

    // Heap types
    Str(Heap<String>),
    Tuple(Heap<Vec<Value>>),
    /// Nullable owning pointer.
    Pointer(Option<Heap<Value>>),

    // Nominal types
    Enum(EnumValue),
    Aggregate(AggregateValue),
    Union(UnionValue),
    Extension(ExtensionValue),
}

// Factory methods (the only way to build heap values)

impl Value {
    #[inline]
    pub fn int(n: i64) -> Self {
        Value::Int(n)
    }

    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Heap::new(s.into()))
    }

    #[inline]
    pub fn tuple(items: Vec<Value>) -> Self {
        Value::Tuple(Heap::new(items))
    }

    /// Non-null pointer owning `pointee`.
    #[inline]
    pub fn pointer(pointee: Value) -> Self {
        Value::Pointer(Some(Heap::new(pointee)))
    }

    #[inline]
    pub fn null() -> Self {
        Value::Pointer(None)
    }

    /// Wrap a host object as a value of extension type `ty`.
    pub fn extension(ty: TypeId, object: impl ExtensionObject + 'static) -> Self {
        Value::Extension(ExtensionValue::new(ty, object))
    }

    /// Constant `constant` of enum type `ty`.
    pub fn enum_constant(
        registry: &TypeRegistry,
        ty: TypeId,
        constant: &str,
    ) -> Result<Self, EvalError> {
        let Some(def) = registry.as_enum(ty) else {
            return Err(shape_mismatch("an enum type", &registry.display(ty)));
        };
        let index = def
            .constants
            .iter()
            .position(|c| registry.name_str(*c) == constant)
            .ok_or_else(|| unknown_constant(registry.name_str(def.name), constant))?;
        Ok(Value::Enum(EnumValue::new(def.clone(), index)))
    }

    /// Aggregate of type `ty` with fields given in declaration order.
    pub fn aggregate(
        registry: &TypeRegistry,
        ty: TypeId,
        fields: Vec<Value>,
    ) -> Result<Self, EvalError> {
        let Some(def) = registry.as_aggregate(ty) else {
            return Err(shape_mismatch("an aggregate type", &registry.display(ty)));
        };
        if def.fields.len() != fields.len() {
            return Err(shape_mismatch(
                &format!("{} fields for `{}`", def.fields.len(), registry.display(ty)),
                &fields.len().to_string(),
            ));
        }
        for (field, value) in def.fields.iter().zip(&fields) {
            if !value.conforms_to(field.ty, registry) {
                return Err(shape_mismatch(
                    &format!(
                        "field `{}` of type `{}`",
                        registry.name_str(field.name),
                        registry.display(field.ty)
                    ),
                    &value.to_string(),
                ));
            }
        }
        Ok(Value::Aggregate(AggregateValue::new(def.clone(), fields)))
    }

    /// The default value of `ty`.
    ///
    /// Unions default to their first alternative, pointers to null.
    /// Extension types and infinite types have no default.
    pub fn default_for(registry: &TypeRegistry, ty: TypeId) -> Result<Self, EvalError> {
        if !registry.is_default_constructible(ty) {
            return Err(not_default_constructible(&registry.display(ty)));
        }
        Self::build_default(registry, ty)
    }

    fn build_default(registry: &TypeRegistry, ty: TypeId) -> Result<Self, EvalError> {
        ensure_sufficient_stack(|| match registry.kind(ty) {
            Some(TypeKind::Int) => Ok(Value::Int(0)),
            Some(TypeKind::Bool) => Ok(Value::Bool(false)),
            Some(TypeKind::Char) => Ok(Value::Char('\0')),
            Some(TypeKind::Str) => Ok(Value::string("")),
            Some(TypeKind::Unit) => Ok(Value::Unit),
            Some(TypeKind::Pointer(_)) => Ok(Value::null()),
            Some(TypeKind::Enum(def)) => Ok(Value::Enum(EnumValue::new(def.clone(), 0))),
            Some(TypeKind::Aggregate(def)) => {
                let fields = def
                    .fields
                    .iter()
                    .map(|f| Self::build_default(registry, f.ty))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Aggregate(AggregateValue::new(def.clone(), fields)))
            }
            Some(TypeKind::Tuple(elements)) => {
                let items = elements
                    .iter()
                    .map(|e| Self::build_default(registry, *e))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::tuple(items))
            }
            Some(TypeKind::Union(_)) => UnionValue::default_for(registry, ty).map(Value::Union),
            Some(TypeKind::Extension(_) | TypeKind::Declared) | None => {
                Err(not_default_constructible(&registry.display(ty)))
            }
        })
    }
}

impl From<UnionValue> for Value {
    fn from(value: UnionValue) -> Self {
        Value::Union(value)
    }
}

// Queries

impl Value {
    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_union(&self) -> Option<&UnionValue> {
        match self {
            Value::Union(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_aggregate(&self) -> Option<&AggregateValue> {
        match self {
            Value::Aggregate(a) => Some(a),
            _ => None,
        }
    }

    /// Whether this is a null pointer.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Pointer(None))
    }

    /// The pointee of a non-null pointer.
    pub fn pointee(&self) -> Option<&Value> {
        match self {
            Value::Pointer(Some(p)) => Some(p),
            _ => None,
        }
    }

    /// Mutable access to the pointee of a non-null pointer.
    ///
    /// Copy-on-write: if the pointee is shared (for example with a binding
    /// taken by an earlier match) it is cloned first, so other holders keep
    /// seeing the old value. This is the in-place rewrite path; matching
    /// itself never mutates.
    pub fn pointee_mut(&mut self) -> Option<&mut Value> {
        match self {
            Value::Pointer(Some(p)) => Some(p.make_mut()),
            _ => None,
        }
    }

    /// Short name of the value's shape, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::Unit => "unit",
            Value::Str(_) => "str",
            Value::Tuple(_) => "tuple",
            Value::Pointer(None) => "null pointer",
            Value::Pointer(Some(_)) => "pointer",
            Value::Enum(_) => "enum constant",
            Value::Aggregate(_) => "aggregate",
            Value::Union(_) => "union value",
            Value::Extension(_) => "extension value",
        }
    }

    /// Whether this value is a valid inhabitant of `ty`.
    pub fn conforms_to(&self, ty: TypeId, registry: &TypeRegistry) -> bool {
        ensure_sufficient_stack(|| match (self, registry.kind(ty)) {
            (Value::Int(_), Some(TypeKind::Int))
            | (Value::Bool(_), Some(TypeKind::Bool))
            | (Value::Char(_), Some(TypeKind::Char))
            | (Value::Str(_), Some(TypeKind::Str))
            | (Value::Unit, Some(TypeKind::Unit))
            | (Value::Pointer(None), Some(TypeKind::Pointer(_))) => true,
            (Value::Pointer(Some(p)), Some(TypeKind::Pointer(pointee))) => {
                p.conforms_to(*pointee, registry)
            }
            (Value::Tuple(items), Some(TypeKind::Tuple(elements))) => {
                items.len() == elements.len()
                    && items
                        .iter()
                        .zip(elements)
                        .all(|(item, element)| item.conforms_to(*element, registry))
            }
            (Value::Enum(e), _) => e.ty() == ty,
            (Value::Aggregate(a), _) => a.ty() == ty,
            (Value::Union(u), _) => u.ty() == ty,
            (Value::Extension(x), _) => x.ty() == ty,
            _ => false,
        })
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Unit, Value::Unit) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Pointer(a), Value::Pointer(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Aggregate(a), Value::Aggregate(b)) => a == b,
            (Value::Union(a), Value::Union(b)) => a == b,
            (Value::Extension(a), Value::Extension(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Char(c) => write!(f, "'{c}'"),
            Value::Unit => write!(f, "()"),
            Value::Str(s) => write!(f, "\"{}\"", &**s),
            Value::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Value::Pointer(None) => write!(f, "null"),
            Value::Pointer(Some(p)) => write!(f, "*{}", &**p),
            Value::Enum(e) => write!(f, "<enum {:?}::{:?}>", e.def().name, e.name()),
            Value::Aggregate(a) => {
                write!(f, "<{:?} {{", a.def().name)?;
                for (i, field) in a.fields().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{field}")?;
                }
                write!(f, "}}>")
            }
            Value::Union(u) => write!(
                f,
                "<union {:?}.{:?}({})>",
                u.def().name,
                u.active_alternative().name,
                u.payload()
            ),
            Value::Extension(x) => write!(f, "<extension {:?}>", x.ty()),
        }
    }
}
