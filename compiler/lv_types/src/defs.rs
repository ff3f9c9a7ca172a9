//! Bodies of nominal type declarations.
//!
//! Definitions are shared (`Arc`) between the registry and the runtime
//! values built from them, so a value can answer "which alternative is
//! active" or "which field is `coins`" without a registry at hand.

use lv_ir::{Name, Span};

use crate::{AssignPolicyKind, TypeId};

/// Visibility of an aggregate field.
///
/// Field patterns only apply to aggregates whose fields are all public;
/// encapsulated types opt in through an `AggregateShape` instead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// An enum: an ordered list of named constants.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnumDef {
    pub name: Name,
    pub ty: TypeId,
    pub constants: Vec<Name>,
}

impl EnumDef {
    /// Position of a constant, if declared.
    pub fn constant_index(&self, constant: Name) -> Option<usize> {
        self.constants.iter().position(|c| *c == constant)
    }
}

/// One alternative of a union.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AlternativeDef {
    pub name: Name,
    pub payload: TypeId,
    pub span: Span,
}

/// A tagged union: ordered alternatives plus the assignment policy.
///
/// The position of an alternative in `alternatives` is its discriminator.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UnionDef {
    pub name: Name,
    pub ty: TypeId,
    pub alternatives: Vec<AlternativeDef>,
    pub policy: AssignPolicyKind,
}

impl UnionDef {
    /// Discriminator of an alternative, if declared.
    pub fn alternative_index(&self, name: Name) -> Option<usize> {
        self.alternatives.iter().position(|a| a.name == name)
    }

    /// Alternative by discriminator.
    pub fn alternative(&self, index: usize) -> Option<&AlternativeDef> {
        self.alternatives.get(index)
    }

    /// Discriminator of the fallback alternative, for `FallbackToEmpty` unions.
    pub fn empty_index(&self) -> Option<usize> {
        match self.policy {
            AssignPolicyKind::FallbackToEmpty { empty } => self.alternative_index(empty),
            AssignPolicyKind::Propagate | AssignPolicyKind::Abort => None,
        }
    }
}

/// A field of an aggregate.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldDef {
    pub name: Name,
    pub ty: TypeId,
    pub visibility: Visibility,
    pub span: Span,
}

impl FieldDef {
    /// A public field without source location.
    pub fn public(name: Name, ty: TypeId) -> Self {
        FieldDef {
            name,
            ty,
            visibility: Visibility::Public,
            span: Span::DUMMY,
        }
    }

    /// A private field without source location.
    pub fn private(name: Name, ty: TypeId) -> Self {
        FieldDef {
            name,
            ty,
            visibility: Visibility::Private,
            span: Span::DUMMY,
        }
    }
}

/// A product type with named fields.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AggregateDef {
    pub name: Name,
    pub ty: TypeId,
    pub fields: Vec<FieldDef>,
}

impl AggregateDef {
    /// Position of a field, if declared.
    pub fn field_index(&self, name: Name) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Whether every field is public (required for direct field patterns).
    pub fn all_public(&self) -> bool {
        self.fields
            .iter()
            .all(|f| f.visibility == Visibility::Public)
    }
}

/// One piece exposed by an aggregate-extraction capability.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PieceDef {
    /// Field name usable in field patterns; unlabeled pieces are positional only.
    pub label: Option<Name>,
    pub ty: TypeId,
}

/// Declared shape of an aggregate-extraction capability.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AggregateShape {
    pub pieces: Vec<PieceDef>,
}

impl AggregateShape {
    /// Append a labeled piece.
    #[must_use]
    pub fn labeled(mut self, label: Name, ty: TypeId) -> Self {
        self.pieces.push(PieceDef {
            label: Some(label),
            ty,
        });
        self
    }

    /// Append a positional piece.
    #[must_use]
    pub fn positional(mut self, ty: TypeId) -> Self {
        self.pieces.push(PieceDef { label: None, ty });
        self
    }

    /// Position of the piece carrying `label`.
    pub fn piece_index(&self, label: Name) -> Option<usize> {
        self.pieces.iter().position(|p| p.label == Some(label))
    }
}

/// One alternative exposed by a variant-extraction capability.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VariantAlternativeDef {
    /// Name used in alternative patterns.
    pub selector: Name,
    /// Value the type's discriminator query returns when this alternative is active.
    pub discriminator: i64,
    pub payload: TypeId,
}

/// Declared shape of a variant-extraction capability.
///
/// The selector → discriminator association is declared here, never
/// inferred from the host object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct VariantShape {
    pub alternatives: Vec<VariantAlternativeDef>,
}

impl VariantShape {
    /// Append an alternative.
    #[must_use]
    pub fn alternative(mut self, selector: Name, discriminator: i64, payload: TypeId) -> Self {
        self.alternatives.push(VariantAlternativeDef {
            selector,
            discriminator,
            payload,
        });
        self
    }

    /// First declaration for `selector`.
    pub fn lookup(&self, selector: Name) -> Option<&VariantAlternativeDef> {
        self.alternatives.iter().find(|a| a.selector == selector)
    }

    /// Every distinct discriminator declared for `selector`, in declaration order.
    ///
    /// More than one entry means the shape is ambiguous for that selector.
    pub fn discriminators_for(&self, selector: Name) -> Vec<i64> {
        let mut found = Vec::new();
        for alt in self.alternatives.iter().filter(|a| a.selector == selector) {
            if !found.contains(&alt.discriminator) {
                found.push(alt.discriminator);
            }
        }
        found
    }
}

/// An encapsulated host type that opts into pattern matching.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExtensionDef {
    pub name: Name,
    pub ty: TypeId,
    pub aggregate: Option<AggregateShape>,
    pub variant: Option<VariantShape>,
}
