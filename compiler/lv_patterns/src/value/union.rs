//! Tagged-union values.
//!
//! A `UnionValue` always holds exactly one alternative: its discriminator
//! (position in the declaration) and a payload that conforms to that
//! alternative's declared type. The only way to build one is through
//! `UnionType`, which checks the payload first, so the invariant holds for
//! every value in existence. The valueless state belongs to `UnionCell`,
//! not to the value.

use std::fmt;
use std::sync::Arc;

use lv_ir::Name;
use lv_types::{TypeId, TypeRegistry, UnionDef};

use super::{Heap, Value};
use crate::errors::{
    not_a_union, not_default_constructible, payload_type_mismatch, unknown_alternative,
    wrong_alternative, EvalError,
};

/// The active alternative of a union value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ActiveAlternative {
    /// Position of the alternative in the union declaration.
    pub discriminator: usize,
    pub name: Name,
}

/// A value of a union type.
#[derive(Clone, Debug)]
pub struct UnionValue {
    def: Arc<UnionDef>,
    discriminator: usize,
    payload: Heap<Value>,
}

impl UnionValue {
    /// Build `ty.alternative(payload)`.
    pub fn construct(
        registry: &TypeRegistry,
        ty: TypeId,
        alternative: &str,
        payload: Value,
    ) -> Result<Self, EvalError> {
        UnionType::new(registry, ty)?.construct(alternative, payload)
    }

    /// The first alternative holding its payload's default.
    pub fn default_for(registry: &TypeRegistry, ty: TypeId) -> Result<Self, EvalError> {
        UnionType::new(registry, ty)?.default_value()
    }

    #[inline]
    pub fn ty(&self) -> TypeId {
        self.def.ty
    }

    pub fn def(&self) -> &Arc<UnionDef> {
        &self.def
    }

    /// Discriminator and name of the active alternative.
    pub fn active_alternative(&self) -> ActiveAlternative {
        ActiveAlternative {
            discriminator: self.discriminator,
            name: self
                .def
                .alternative(self.discriminator)
                .map_or(Name::EMPTY, |alt| alt.name),
        }
    }

    #[inline]
    pub fn discriminator(&self) -> usize {
        self.discriminator
    }

    /// The active payload, whichever alternative it belongs to.
    #[inline]
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// The payload, if `alternative` is the active one.
    pub fn payload_as(&self, registry: &TypeRegistry, alternative: &str) -> Result<&Value, EvalError> {
        let Some(index) = self
            .def
            .alternatives
            .iter()
            .position(|alt| registry.name_str(alt.name) == alternative)
        else {
            return Err(unknown_alternative(
                registry.name_str(self.def.name),
                alternative,
            ));
        };
        if index == self.discriminator {
            Ok(&self.payload)
        } else {
            Err(wrong_alternative(
                alternative,
                registry.name_str(self.active_alternative().name),
            ))
        }
    }
}

impl PartialEq for UnionValue {
    fn eq(&self, other: &Self) -> bool {
        self.def.ty == other.def.ty
            && self.discriminator == other.discriminator
            && self.payload == other.payload
    }
}

/// A union type, resolved against a registry.
///
/// Hands out per-alternative constructors, mirroring `Type.alternative(payload)`.
#[derive(Clone)]
pub struct UnionType<'r> {
    registry: &'r TypeRegistry,
    def: Arc<UnionDef>,
}

impl<'r> UnionType<'r> {
    pub fn new(registry: &'r TypeRegistry, ty: TypeId) -> Result<Self, EvalError> {
        match registry.as_union(ty) {
            Some(def) => Ok(UnionType {
                registry,
                def: Arc::clone(def),
            }),
            None => Err(not_a_union(&registry.display(ty))),
        }
    }

    pub fn def(&self) -> &Arc<UnionDef> {
        &self.def
    }

    fn name(&self) -> &'static str {
        self.registry.name_str(self.def.name)
    }

    /// Constructor for one alternative.
    pub fn constructor(&self, alternative: &str) -> Result<AlternativeCtor<'r>, EvalError> {
        let discriminator = self
            .def
            .alternatives
            .iter()
            .position(|alt| self.registry.name_str(alt.name) == alternative)
            .ok_or_else(|| unknown_alternative(self.name(), alternative))?;
        Ok(AlternativeCtor {
            union: self.clone(),
            discriminator,
        })
    }

    /// Build `alternative(payload)`.
    pub fn construct(&self, alternative: &str, payload: Value) -> Result<UnionValue, EvalError> {
        self.constructor(alternative)?.call(payload)
    }

    /// The first declared alternative holding its payload's default.
    pub fn default_value(&self) -> Result<UnionValue, EvalError> {
        self.default_alternative(0)
    }

    /// Alternative `discriminator` holding its payload's default.
    pub fn default_alternative(&self, discriminator: usize) -> Result<UnionValue, EvalError> {
        let Some(alt) = self.def.alternative(discriminator) else {
            return Err(not_default_constructible(self.name()));
        };
        let payload = Value::default_for(self.registry, alt.payload)?;
        Ok(UnionValue {
            def: Arc::clone(&self.def),
            discriminator,
            payload: Heap::new(payload),
        })
    }
}

impl fmt::Debug for UnionType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnionType").field("def", &self.def).finish()
    }
}

/// Constructor of a single union alternative.
#[derive(Clone, Debug)]
pub struct AlternativeCtor<'r> {
    union: UnionType<'r>,
    discriminator: usize,
}

impl AlternativeCtor<'_> {
    /// Alternative this constructor builds.
    pub fn alternative(&self) -> ActiveAlternative {
        ActiveAlternative {
            discriminator: self.discriminator,
            name: self
                .union
                .def
                .alternative(self.discriminator)
                .map_or(Name::EMPTY, |alt| alt.name),
        }
    }

    /// Declared payload type.
    pub fn payload_type(&self) -> TypeId {
        self.union
            .def
            .alternative(self.discriminator)
            .map_or(TypeId::UNIT, |alt| alt.payload)
    }

    /// Build the union value, checking the payload against the declared type.
    pub fn call(&self, payload: Value) -> Result<UnionValue, EvalError> {
        let registry = self.union.registry;
        let expected = self.payload_type();
        if !payload.conforms_to(expected, registry) {
            let alternative = registry.name_str(self.alternative().name);
            return Err(payload_type_mismatch(
                alternative,
                &registry.display(expected),
                &payload.to_string(),
            ));
        }
        Ok(UnionValue {
            def: Arc::clone(&self.union.def),
            discriminator: self.discriminator,
            payload: Heap::new(payload),
        })
    }
}
