//! Registry of all types known to the pattern engine.
//!
//! # Design
//!
//! - One flat `Vec<TypeEntry>` indexed by `TypeId`
//! - Name index for nominal types
//! - Structural types (tuples, pointers) interned by shape, so the same
//!   shape always yields the same `TypeId`

use std::sync::Arc;

use lv_diagnostic::{Diagnostic, ErrorCode};
use lv_ir::{Name, SharedInterner, Span};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    AggregateDef, AggregateShape, AlternativeDef, AssignPolicyKind, EnumDef, ExtensionDef,
    FieldDef, TypeId, UnionDef, VariantShape,
};

/// The kind of a registered type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Int,
    Bool,
    Char,
    Str,
    Unit,
    /// Reserved by `declare`, body not supplied yet.
    Declared,
    Enum(Arc<EnumDef>),
    Union(Arc<UnionDef>),
    Aggregate(Arc<AggregateDef>),
    /// Fixed-arity positional product; structural.
    Tuple(Vec<TypeId>),
    /// Nullable owning pointer to the pointee; structural.
    Pointer(TypeId),
    Extension(Arc<ExtensionDef>),
}

/// A registered type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeEntry {
    /// Declared name (`Name::EMPTY` for structural types).
    pub name: Name,
    pub kind: TypeKind,
    /// Source location of the declaration.
    pub span: Span,
}

/// Registry for every type a pattern or value may refer to.
#[derive(Clone, Debug)]
pub struct TypeRegistry {
    interner: SharedInterner,
    entries: Vec<TypeEntry>,
    by_name: FxHashMap<Name, TypeId>,
    tuples: FxHashMap<Vec<TypeId>, TypeId>,
    pointers: FxHashMap<TypeId, TypeId>,
    /// Errors found while declaring (duplicate names, bad redefinitions);
    /// reported by `validate`.
    pub(crate) declaration_errors: Vec<Diagnostic>,
}

impl TypeRegistry {
    /// Create a registry with the primitive types pre-registered.
    pub fn new(interner: SharedInterner) -> Self {
        let primitives = [
            TypeKind::Int,
            TypeKind::Bool,
            TypeKind::Char,
            TypeKind::Str,
            TypeKind::Unit,
        ];
        let entries = primitives
            .into_iter()
            .map(|kind| TypeEntry {
                name: Name::EMPTY,
                kind,
                span: Span::DUMMY,
            })
            .collect();
        TypeRegistry {
            interner,
            entries,
            by_name: FxHashMap::default(),
            tuples: FxHashMap::default(),
            pointers: FxHashMap::default(),
            declaration_errors: Vec::new(),
        }
    }

    /// The interner that names in this registry come from.
    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// Resolve a name to its string.
    pub fn name_str(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    fn push(&mut self, entry: TypeEntry) -> TypeId {
        let raw = u32::try_from(self.entries.len()).unwrap_or(u32::MAX);
        self.entries.push(entry);
        TypeId::from_raw(raw)
    }

    // === Declaration ===

    /// Reserve a `TypeId` for a nominal type whose body comes later.
    pub fn declare(&mut self, name: &str) -> TypeId {
        self.declare_at(name, Span::DUMMY)
    }

    /// Reserve a `TypeId`, recording where the type was declared.
    pub fn declare_at(&mut self, name: &str, span: Span) -> TypeId {
        let name = self.interner.intern(name);
        let ty = self.push(TypeEntry {
            name,
            kind: TypeKind::Declared,
            span,
        });
        match self.by_name.get(&name).copied() {
            Some(first) => {
                let first_span = self.get(first).map_or(Span::DUMMY, |e| e.span);
                let diag = Diagnostic::error(ErrorCode::E2009)
                    .with_message(format!("type `{}` is declared twice", self.name_str(name)))
                    .with_label(span, "declared again here")
                    .with_secondary_label(first_span, "first declared here");
                self.declaration_errors.push(diag);
            }
            None => {
                self.by_name.insert(name, ty);
            }
        }
        ty
    }

    fn define(&mut self, ty: TypeId, kind: TypeKind) {
        match self.entries.get_mut(ty.index()) {
            Some(entry) if entry.kind == TypeKind::Declared => entry.kind = kind,
            Some(entry) => {
                let diag = Diagnostic::error(ErrorCode::E2009)
                    .with_message(format!(
                        "type `{}` is defined twice",
                        self.interner.lookup(entry.name)
                    ))
                    .with_label(entry.span, "already defined");
                self.declaration_errors.push(diag);
            }
            None => self.declaration_errors.push(
                Diagnostic::error(ErrorCode::E9001)
                    .with_message(format!("cannot define unknown type {ty:?}")),
            ),
        }
    }

    fn entry_name(&self, ty: TypeId) -> Name {
        self.entries.get(ty.index()).map_or(Name::EMPTY, |e| e.name)
    }

    /// Supply the body of a declared enum.
    pub fn define_enum(&mut self, ty: TypeId, constants: &[&str]) {
        let def = EnumDef {
            name: self.entry_name(ty),
            ty,
            constants: constants.iter().map(|c| self.interner.intern(c)).collect(),
        };
        self.define(ty, TypeKind::Enum(Arc::new(def)));
    }

    /// Supply the body of a declared union.
    pub fn define_union(
        &mut self,
        ty: TypeId,
        alternatives: &[(&str, TypeId)],
        policy: AssignPolicyKind,
    ) {
        let alternatives = alternatives
            .iter()
            .map(|(name, payload)| AlternativeDef {
                name: self.interner.intern(name),
                payload: *payload,
                span: Span::DUMMY,
            })
            .collect();
        self.define_union_with(ty, alternatives, policy);
    }

    /// Supply the body of a declared union from fully built alternatives.
    pub fn define_union_with(
        &mut self,
        ty: TypeId,
        alternatives: Vec<AlternativeDef>,
        policy: AssignPolicyKind,
    ) {
        let def = UnionDef {
            name: self.entry_name(ty),
            ty,
            alternatives,
            policy,
        };
        self.define(ty, TypeKind::Union(Arc::new(def)));
    }

    /// Supply the body of a declared aggregate.
    pub fn define_aggregate(&mut self, ty: TypeId, fields: Vec<FieldDef>) {
        let def = AggregateDef {
            name: self.entry_name(ty),
            ty,
            fields,
        };
        self.define(ty, TypeKind::Aggregate(Arc::new(def)));
    }

    /// Supply the body of a declared extension type.
    pub fn define_extension(
        &mut self,
        ty: TypeId,
        aggregate: Option<AggregateShape>,
        variant: Option<VariantShape>,
    ) {
        let def = ExtensionDef {
            name: self.entry_name(ty),
            ty,
            aggregate,
            variant,
        };
        self.define(ty, TypeKind::Extension(Arc::new(def)));
    }

    /// Declare and define an enum in one step.
    pub fn enumeration(&mut self, name: &str, constants: &[&str]) -> TypeId {
        let ty = self.declare(name);
        self.define_enum(ty, constants);
        ty
    }

    /// Declare and define a union in one step.
    pub fn union(
        &mut self,
        name: &str,
        alternatives: &[(&str, TypeId)],
        policy: AssignPolicyKind,
    ) -> TypeId {
        let ty = self.declare(name);
        self.define_union(ty, alternatives, policy);
        ty
    }

    /// Declare and define an aggregate with public fields in one step.
    pub fn aggregate(&mut self, name: &str, fields: &[(&str, TypeId)]) -> TypeId {
        let ty = self.declare(name);
        let fields = fields
            .iter()
            .map(|(field, fty)| FieldDef::public(self.interner.intern(field), *fty))
            .collect();
        self.define_aggregate(ty, fields);
        ty
    }

    /// Declare and define an extension type in one step.
    pub fn extension(
        &mut self,
        name: &str,
        aggregate: Option<AggregateShape>,
        variant: Option<VariantShape>,
    ) -> TypeId {
        let ty = self.declare(name);
        self.define_extension(ty, aggregate, variant);
        ty
    }

    /// The fallback-to-empty policy naming `empty`.
    pub fn fallback_to(&self, empty: &str) -> AssignPolicyKind {
        AssignPolicyKind::FallbackToEmpty {
            empty: self.interner.intern(empty),
        }
    }

    /// Intern a tuple type.
    pub fn tuple(&mut self, elements: &[TypeId]) -> TypeId {
        if let Some(&ty) = self.tuples.get(elements) {
            return ty;
        }
        let ty = self.push(TypeEntry {
            name: Name::EMPTY,
            kind: TypeKind::Tuple(elements.to_vec()),
            span: Span::DUMMY,
        });
        self.tuples.insert(elements.to_vec(), ty);
        ty
    }

    /// Intern a pointer type.
    pub fn pointer(&mut self, pointee: TypeId) -> TypeId {
        if let Some(&ty) = self.pointers.get(&pointee) {
            return ty;
        }
        let ty = self.push(TypeEntry {
            name: Name::EMPTY,
            kind: TypeKind::Pointer(pointee),
            span: Span::DUMMY,
        });
        self.pointers.insert(pointee, ty);
        ty
    }

    // === Lookup ===

    /// Look up a type entry.
    #[inline]
    pub fn get(&self, ty: TypeId) -> Option<&TypeEntry> {
        self.entries.get(ty.index())
    }

    /// Look up a type's kind.
    #[inline]
    pub fn kind(&self, ty: TypeId) -> Option<&TypeKind> {
        self.get(ty).map(|e| &e.kind)
    }

    /// Look up a nominal type by name.
    pub fn by_name(&self, name: &str) -> Option<TypeId> {
        let name = self.interner.try_intern(name).ok()?;
        self.by_name.get(&name).copied()
    }

    pub fn as_union(&self, ty: TypeId) -> Option<&Arc<UnionDef>> {
        match self.kind(ty)? {
            TypeKind::Union(def) => Some(def),
            _ => None,
        }
    }

    pub fn as_enum(&self, ty: TypeId) -> Option<&Arc<EnumDef>> {
        match self.kind(ty)? {
            TypeKind::Enum(def) => Some(def),
            _ => None,
        }
    }

    pub fn as_aggregate(&self, ty: TypeId) -> Option<&Arc<AggregateDef>> {
        match self.kind(ty)? {
            TypeKind::Aggregate(def) => Some(def),
            _ => None,
        }
    }

    pub fn as_extension(&self, ty: TypeId) -> Option<&Arc<ExtensionDef>> {
        match self.kind(ty)? {
            TypeKind::Extension(def) => Some(def),
            _ => None,
        }
    }

    pub fn tuple_elements(&self, ty: TypeId) -> Option<&[TypeId]> {
        match self.kind(ty)? {
            TypeKind::Tuple(elements) => Some(elements),
            _ => None,
        }
    }

    pub fn pointee(&self, ty: TypeId) -> Option<TypeId> {
        match self.kind(ty)? {
            TypeKind::Pointer(pointee) => Some(*pointee),
            _ => None,
        }
    }

    /// Number of registered types, primitives included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`: primitives are pre-registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(TypeId, entry)` in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &TypeEntry)> {
        self.entries.iter().enumerate().map(|(i, e)| {
            let raw = u32::try_from(i).unwrap_or(u32::MAX);
            (TypeId::from_raw(raw), e)
        })
    }

    // === Derived properties ===

    /// Whether values of `ty` have a default.
    ///
    /// A type that can only be built by going through itself again without
    /// passing a pointer (an infinite type) has no default.
    pub fn is_default_constructible(&self, ty: TypeId) -> bool {
        let mut in_progress = FxHashSet::default();
        self.default_constructible_inner(ty, &mut in_progress)
    }

    fn default_constructible_inner(&self, ty: TypeId, in_progress: &mut FxHashSet<TypeId>) -> bool {
        if !in_progress.insert(ty) {
            return false;
        }
        let result = match self.kind(ty) {
            Some(
                TypeKind::Int
                | TypeKind::Bool
                | TypeKind::Char
                | TypeKind::Str
                | TypeKind::Unit
                | TypeKind::Pointer(_),
            ) => true,
            Some(TypeKind::Enum(def)) => !def.constants.is_empty(),
            Some(TypeKind::Union(def)) => def
                .alternatives
                .first()
                .is_some_and(|alt| self.default_constructible_inner(alt.payload, in_progress)),
            Some(TypeKind::Aggregate(def)) => def
                .fields
                .iter()
                .all(|f| self.default_constructible_inner(f.ty, in_progress)),
            Some(TypeKind::Tuple(elements)) => elements
                .iter()
                .all(|e| self.default_constructible_inner(*e, in_progress)),
            Some(TypeKind::Extension(_) | TypeKind::Declared) | None => false,
        };
        in_progress.remove(&ty);
        result
    }
}
