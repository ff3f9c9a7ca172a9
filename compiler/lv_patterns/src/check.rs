//! Static pattern checking.
//!
//! `check_pattern` decides whether a pattern is legal for a subject type and
//! compiles it into a `CompiledPattern`: alternative selectors become
//! discriminators, field names become declaration indices, and field
//! patterns are reordered into declaration order. Every problem is reported
//! as a `Diagnostic`; a pattern that fails checking never reaches the
//! matcher.
//!
//! # Legality
//!
//! | Pattern        | Subject type                                                  |
//! |----------------|---------------------------------------------------------------|
//! | `_`, binding   | any                                                           |
//! | literal        | `int`, `bool`, `char` (same type) or an enum (declared constant) |
//! | `null`, `*p`   | pointer                                                       |
//! | `sel p`        | union, or extension type with a variant shape                 |
//! | `[..]`, `{..}` | tuple, all-public aggregate, or extension type with an aggregate shape |

use lv_diagnostic::{Diagnostic, ErrorCode};
use lv_ir::{Name, Span};
use lv_types::{ambiguous_selector, ExtensionDef, TypeId, TypeKind, TypeRegistry};
use rustc_hash::FxHashMap;

use crate::pattern::{FieldPattern, Guard, Literal, Pattern, PatternKind};
use crate::stack::ensure_sufficient_stack;

/// A pattern that passed checking against `ty`.
#[derive(Clone, Debug)]
pub struct CompiledPattern {
    pub(crate) root: Node,
    ty: TypeId,
    binders: Vec<Name>,
    span: Span,
}

impl CompiledPattern {
    /// Subject type the pattern was checked against.
    #[inline]
    pub fn ty(&self) -> TypeId {
        self.ty
    }

    /// Identifiers a successful match binds, in pattern order.
    pub fn binders(&self) -> &[Name] {
        &self.binders
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

/// Resolved pattern node.
#[derive(Clone, Debug)]
pub(crate) enum Node {
    Wildcard,
    Literal(LiteralValue),
    Bind {
        name: Name,
        subpattern: Option<Box<Node>>,
    },
    Null,
    Deref(Box<Node>),
    UnionAlternative {
        ty: TypeId,
        type_name: &'static str,
        discriminator: usize,
        payload: Box<Node>,
    },
    VariantAlternative {
        ty: TypeId,
        type_name: &'static str,
        discriminator: i64,
        payload: Box<Node>,
    },
    Tuple(Vec<Node>),
    /// Aggregate fields, sorted by declaration index.
    Fields {
        ty: TypeId,
        type_name: &'static str,
        fields: Vec<(usize, Node)>,
    },
    /// Extension pieces, sorted by piece index.
    Pieces {
        ty: TypeId,
        type_name: &'static str,
        pieces: Vec<(usize, Node)>,
    },
    Guarded {
        pattern: Box<Node>,
        guard: Guard,
    },
}

/// Literal resolved against the subject type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LiteralValue {
    Int(i64),
    Bool(bool),
    Char(char),
    /// Enum constant by declaration index.
    Enum {
        ty: TypeId,
        type_name: &'static str,
        index: usize,
    },
}

/// Check `pattern` against subject type `ty`.
#[tracing::instrument(level = "debug", skip_all, fields(ty = ?ty))]
pub fn check_pattern(
    pattern: &Pattern,
    ty: TypeId,
    registry: &TypeRegistry,
) -> Result<CompiledPattern, Vec<Diagnostic>> {
    let mut checker = PatternChecker {
        registry,
        errors: Vec::new(),
        binders: Vec::new(),
    };
    let root = checker.check(pattern, ty);
    if checker.errors.is_empty() {
        Ok(CompiledPattern {
            root,
            ty,
            binders: checker.binders.into_iter().map(|(name, _)| name).collect(),
            span: pattern.span,
        })
    } else {
        tracing::debug!(errors = checker.errors.len(), "pattern rejected");
        Err(checker.errors)
    }
}

struct PatternChecker<'r> {
    registry: &'r TypeRegistry,
    errors: Vec<Diagnostic>,
    binders: Vec<(Name, Span)>,
}

impl PatternChecker<'_> {
    fn name(&self, name: Name) -> &'static str {
        self.registry.name_str(name)
    }

    fn display(&self, ty: TypeId) -> String {
        self.registry.display(ty)
    }

    /// Record an error; the node stands in as a wildcard so checking goes on.
    fn error(&mut self, diagnostic: Diagnostic) -> Node {
        self.errors.push(diagnostic);
        Node::Wildcard
    }

    fn check(&mut self, pattern: &Pattern, ty: TypeId) -> Node {
        ensure_sufficient_stack(|| self.check_inner(pattern, ty))
    }

    fn check_inner(&mut self, pattern: &Pattern, ty: TypeId) -> Node {
        let span = pattern.span;
        let registry = self.registry;
        let Some(kind) = registry.kind(ty) else {
            return self.error(
                Diagnostic::error(ErrorCode::E9001)
                    .with_message(format!("pattern checked against unknown type {ty:?}"))
                    .with_label(span, "in this pattern"),
            );
        };

        match &pattern.kind {
            PatternKind::Wildcard => Node::Wildcard,
            PatternKind::Literal(literal) => self.check_literal(*literal, kind, ty, span),
            PatternKind::Binding { name, subpattern } => {
                self.bind(*name, span);
                let subpattern = subpattern
                    .as_ref()
                    .map(|sub| Box::new(self.check(sub, ty)));
                Node::Bind {
                    name: *name,
                    subpattern,
                }
            }
            PatternKind::Null => match kind {
                TypeKind::Pointer(_) => Node::Null,
                _ => self.error(self.not_a_pointer("null", ty, span)),
            },
            PatternKind::Deref(inner) => match kind {
                TypeKind::Pointer(pointee) => Node::Deref(Box::new(self.check(inner, *pointee))),
                _ => self.error(self.not_a_pointer("dereference", ty, span)),
            },
            PatternKind::Alternative { selector, payload } => {
                self.check_alternative(*selector, payload, kind, ty, span)
            }
            PatternKind::Sequence(items) => self.check_sequence(items, kind, ty, span),
            PatternKind::Fields(fields) => self.check_fields(fields, kind, ty, span),
            PatternKind::Guarded { pattern, guard } => Node::Guarded {
                pattern: Box::new(self.check(pattern, ty)),
                guard: guard.clone(),
            },
        }
    }

    fn bind(&mut self, name: Name, span: Span) {
        if let Some(&(_, first)) = self.binders.iter().find(|(n, _)| *n == name) {
            let diag = Diagnostic::error(ErrorCode::E3009)
                .with_message(format!(
                    "identifier `{}` is bound more than once in the same pattern",
                    self.name(name)
                ))
                .with_label(span, "bound again here")
                .with_secondary_label(first, "first bound here");
            self.errors.push(diag);
        } else {
            self.binders.push((name, span));
        }
    }

    fn not_a_pointer(&self, what: &str, ty: TypeId, span: Span) -> Diagnostic {
        Diagnostic::error(ErrorCode::E3005)
            .with_message(format!(
                "{what} pattern requires a pointer, found `{}`",
                self.display(ty)
            ))
            .with_label(span, format!("subject has type `{}`", self.display(ty)))
    }

    fn check_literal(&mut self, literal: Literal, kind: &TypeKind, ty: TypeId, span: Span) -> Node {
        let resolved = match (literal, kind) {
            (Literal::Int(n), TypeKind::Int) => Some(LiteralValue::Int(n)),
            (Literal::Bool(b), TypeKind::Bool) => Some(LiteralValue::Bool(b)),
            (Literal::Char(c), TypeKind::Char) => Some(LiteralValue::Char(c)),
            (Literal::Constant(name), TypeKind::Enum(def)) => {
                let Some(index) = def.constant_index(name) else {
                    let declared = def
                        .constants
                        .iter()
                        .map(|c| format!("`{}`", self.name(*c)))
                        .collect::<Vec<_>>()
                        .join(", ");
                    let diag = Diagnostic::error(ErrorCode::E3011)
                        .with_message(format!(
                            "enum `{}` has no constant `{}`",
                            self.display(ty),
                            self.name(name)
                        ))
                        .with_label(span, "unknown constant")
                        .with_note(format!("declared constants: {declared}"));
                    return self.error(diag);
                };
                Some(LiteralValue::Enum {
                    ty,
                    type_name: self.name(def.name),
                    index,
                })
            }
            _ => None,
        };

        if let Some(value) = resolved {
            return Node::Literal(value);
        }

        let literal_text = match literal {
            Literal::Constant(name) => format!("`{}`", self.name(name)),
            other => format!("`{other}`"),
        };
        let mut diag = Diagnostic::error(ErrorCode::E3004)
            .with_message(format!(
                "literal {literal_text} cannot match a value of type `{}`",
                self.display(ty)
            ))
            .with_label(span, "literal of the wrong type");
        if !matches!(
            kind,
            TypeKind::Int | TypeKind::Bool | TypeKind::Char | TypeKind::Enum(_)
        ) {
            diag = diag.with_note("literal patterns apply to int, bool, char and enum types");
        }
        self.error(diag)
    }

    fn check_alternative(
        &mut self,
        selector: Name,
        payload: &Pattern,
        kind: &TypeKind,
        ty: TypeId,
        span: Span,
    ) -> Node {
        match kind {
            TypeKind::Union(def) => {
                let Some(discriminator) = def.alternative_index(selector) else {
                    let declared = def
                        .alternatives
                        .iter()
                        .map(|a| format!("`{}`", self.name(a.name)))
                        .collect::<Vec<_>>()
                        .join(", ");
                    let diag = self
                        .unknown_alternative(selector, ty, span)
                        .with_note(format!("declared alternatives: {declared}"));
                    return self.error(diag);
                };
                let payload_ty = def.alternatives[discriminator].payload;
                Node::UnionAlternative {
                    ty,
                    type_name: self.name(def.name),
                    discriminator,
                    payload: Box::new(self.check(payload, payload_ty)),
                }
            }
            TypeKind::Extension(def) if def.variant.is_some() => {
                self.check_variant_alternative(selector, payload, def, ty, span)
            }
            _ => {
                let diag = Diagnostic::error(ErrorCode::E3006)
                    .with_message(format!(
                        "alternative pattern `{}` requires a union or a type with a variant shape, found `{}`",
                        self.name(selector),
                        self.display(ty)
                    ))
                    .with_label(span, format!("subject is a {}", self.registry.describe_kind(ty)));
                self.error(diag)
            }
        }
    }

    fn check_variant_alternative(
        &mut self,
        selector: Name,
        payload: &Pattern,
        def: &ExtensionDef,
        ty: TypeId,
        span: Span,
    ) -> Node {
        let Some(shape) = &def.variant else {
            return Node::Wildcard;
        };
        let discriminators = shape.discriminators_for(selector);
        match discriminators.as_slice() {
            [] => {
                let diag = self.unknown_alternative(selector, ty, span);
                self.error(diag)
            }
            [discriminator] => {
                let payload_ty = shape
                    .lookup(selector)
                    .map_or(TypeId::UNIT, |alt| alt.payload);
                Node::VariantAlternative {
                    ty,
                    type_name: self.name(def.name),
                    discriminator: *discriminator,
                    payload: Box::new(self.check(payload, payload_ty)),
                }
            }
            _ => {
                let diag = ambiguous_selector(self.registry, def.name, selector, &discriminators, span);
                self.error(diag)
            }
        }
    }

    fn unknown_alternative(&self, selector: Name, ty: TypeId, span: Span) -> Diagnostic {
        Diagnostic::error(ErrorCode::E3001)
            .with_message(format!(
                "`{}` has no alternative `{}`",
                self.display(ty),
                self.name(selector)
            ))
            .with_label(span, "unknown alternative")
    }

    fn arity_mismatch(&self, expected: usize, found: usize, ty: TypeId, span: Span) -> Diagnostic {
        Diagnostic::error(ErrorCode::E3003)
            .with_message(format!(
                "sequence pattern has {found} element{} but `{}` has {expected}",
                if found == 1 { "" } else { "s" },
                self.display(ty)
            ))
            .with_label(span, format!("expected {expected}"))
    }

    fn not_aggregate(&self, ty: TypeId, span: Span) -> Diagnostic {
        Diagnostic::error(ErrorCode::E3007)
            .with_message(format!(
                "aggregate pattern requires a tuple, an aggregate or a type with an aggregate shape, found `{}`",
                self.display(ty)
            ))
            .with_label(span, format!("subject is a {}", self.registry.describe_kind(ty)))
    }

    fn encapsulated(&self, ty: TypeId, span: Span) -> Diagnostic {
        Diagnostic::error(ErrorCode::E3008)
            .with_message(format!(
                "aggregate pattern on `{}`, which has non-public fields",
                self.display(ty)
            ))
            .with_label(span, "fields are not all public")
            .with_suggestion("declare an aggregate extraction shape for this type")
    }

    fn check_sequence(&mut self, items: &[Pattern], kind: &TypeKind, ty: TypeId, span: Span) -> Node {
        match kind {
            TypeKind::Tuple(elements) => {
                if elements.len() != items.len() {
                    let diag = self.arity_mismatch(elements.len(), items.len(), ty, span);
                    return self.error(diag);
                }
                Node::Tuple(
                    items
                        .iter()
                        .zip(elements)
                        .map(|(item, element)| self.check(item, *element))
                        .collect(),
                )
            }
            TypeKind::Aggregate(def) => {
                if !def.all_public() {
                    let diag = self.encapsulated(ty, span);
                    return self.error(diag);
                }
                if def.fields.len() != items.len() {
                    let diag = self.arity_mismatch(def.fields.len(), items.len(), ty, span);
                    return self.error(diag);
                }
                Node::Fields {
                    ty,
                    type_name: self.name(def.name),
                    fields: items
                        .iter()
                        .zip(&def.fields)
                        .enumerate()
                        .map(|(index, (item, field))| (index, self.check(item, field.ty)))
                        .collect(),
                }
            }
            TypeKind::Extension(def) if def.aggregate.is_some() => {
                let Some(shape) = &def.aggregate else {
                    return Node::Wildcard;
                };
                if shape.pieces.len() != items.len() {
                    let diag = self.arity_mismatch(shape.pieces.len(), items.len(), ty, span);
                    return self.error(diag);
                }
                Node::Pieces {
                    ty,
                    type_name: self.name(def.name),
                    pieces: items
                        .iter()
                        .zip(&shape.pieces)
                        .enumerate()
                        .map(|(index, (item, piece))| (index, self.check(item, piece.ty)))
                        .collect(),
                }
            }
            _ => {
                let diag = self.not_aggregate(ty, span);
                self.error(diag)
            }
        }
    }

    fn check_fields(
        &mut self,
        fields: &[FieldPattern],
        kind: &TypeKind,
        ty: TypeId,
        span: Span,
    ) -> Node {
        // (field name) -> (declaration index, field type)
        let resolve: Box<dyn Fn(Name) -> Option<(usize, TypeId)>> = match kind {
            TypeKind::Aggregate(def) => {
                if !def.all_public() {
                    let diag = self.encapsulated(ty, span);
                    return self.error(diag);
                }
                let def = def.clone();
                Box::new(move |name| def.field_index(name).map(|i| (i, def.fields[i].ty)))
            }
            TypeKind::Extension(def) if def.aggregate.is_some() => {
                let def = def.clone();
                Box::new(move |name| {
                    let shape = def.aggregate.as_ref()?;
                    shape.piece_index(name).map(|i| (i, shape.pieces[i].ty))
                })
            }
            TypeKind::Tuple(_) => Box::new(|_| None),
            _ => {
                let diag = self.not_aggregate(ty, span);
                return self.error(diag);
            }
        };

        let mut resolved: Vec<(usize, Node)> = Vec::with_capacity(fields.len());
        let mut seen: FxHashMap<Name, Span> = FxHashMap::default();
        for field in fields {
            if let Some(&first) = seen.get(&field.name) {
                let diag = Diagnostic::error(ErrorCode::E3010)
                    .with_message(format!(
                        "field `{}` is listed more than once in the pattern",
                        self.name(field.name)
                    ))
                    .with_label(field.span, "listed again here")
                    .with_secondary_label(first, "first listed here");
                self.errors.push(diag);
                continue;
            }
            seen.insert(field.name, field.span);

            match resolve(field.name) {
                Some((index, field_ty)) => {
                    let node = self.check(&field.pattern, field_ty);
                    resolved.push((index, node));
                }
                None => {
                    let diag = Diagnostic::error(ErrorCode::E3002)
                        .with_message(format!(
                            "`{}` has no field `{}`",
                            self.display(ty),
                            self.name(field.name)
                        ))
                        .with_label(field.span, "unknown field");
                    self.errors.push(diag);
                }
            }
        }

        // Matched in declaration order, whatever order they were written in.
        resolved.sort_by_key(|(index, _)| *index);
        match kind {
            TypeKind::Extension(def) => Node::Pieces {
                ty,
                type_name: self.name(def.name),
                pieces: resolved,
            },
            TypeKind::Aggregate(def) => Node::Fields {
                ty,
                type_name: self.name(def.name),
                fields: resolved,
            },
            // Tuples have no field names, so only `{}` gets here.
            TypeKind::Tuple(elements) => Node::Tuple(vec![Node::Wildcard; elements.len()]),
            _ => Node::Wildcard,
        }
    }
}
