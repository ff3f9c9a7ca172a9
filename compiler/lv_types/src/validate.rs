//! Declaration validation.
//!
//! Every rule a well-formed declaration must satisfy is checked here, once,
//! before any value is built or pattern compiled against the registry.

use lv_diagnostic::{Diagnostic, ErrorCode};
use lv_ir::{Name, Span};
use rustc_hash::FxHashMap;

use crate::{
    AggregateDef, AggregateShape, AssignPolicyKind, EnumDef, TypeId, TypeKind, TypeRegistry,
    UnionDef, VariantShape,
};

impl TypeRegistry {
    /// Check every declaration, returning all errors found.
    #[tracing::instrument(level = "debug", skip_all, fields(types = self.len()))]
    pub fn validate(&self) -> Result<(), Vec<Diagnostic>> {
        let mut errors = self.declaration_errors.clone();

        for (ty, entry) in self.iter() {
            match &entry.kind {
                TypeKind::Declared => errors.push(
                    Diagnostic::error(ErrorCode::E2008)
                        .with_message(format!(
                            "type `{}` is declared but never defined",
                            self.name_str(entry.name)
                        ))
                        .with_label(entry.span, "declared here"),
                ),
                TypeKind::Enum(def) => self.validate_enum(def, entry.span, &mut errors),
                TypeKind::Union(def) => self.validate_union(def, entry.span, &mut errors),
                TypeKind::Aggregate(def) => self.validate_aggregate(def, entry.span, &mut errors),
                TypeKind::Tuple(elements) => {
                    for element in elements {
                        self.check_known(*element, entry.span, &mut errors);
                    }
                }
                TypeKind::Pointer(pointee) => self.check_known(*pointee, entry.span, &mut errors),
                TypeKind::Extension(def) => {
                    if let Some(shape) = &def.aggregate {
                        self.validate_aggregate_shape(def.name, shape, entry.span, &mut errors);
                    }
                    if let Some(shape) = &def.variant {
                        self.validate_variant_shape(def.name, shape, entry.span, &mut errors);
                    }
                }
                TypeKind::Int | TypeKind::Bool | TypeKind::Char | TypeKind::Str | TypeKind::Unit => {}
            }
            tracing::trace!(?ty, kind = self.describe_kind(ty), "validated declaration");
        }

        if errors.is_empty() {
            tracing::debug!("declarations valid");
            Ok(())
        } else {
            tracing::debug!(count = errors.len(), "declaration errors");
            Err(errors)
        }
    }

    fn check_known(&self, ty: TypeId, span: Span, errors: &mut Vec<Diagnostic>) {
        if self.get(ty).is_none() {
            errors.push(
                Diagnostic::error(ErrorCode::E9001)
                    .with_message(format!("reference to unknown type {ty:?}"))
                    .with_label(span, "in this declaration"),
            );
        }
    }

    fn validate_enum(&self, def: &EnumDef, span: Span, errors: &mut Vec<Diagnostic>) {
        for name in duplicates(def.constants.iter().copied()) {
            errors.push(
                Diagnostic::error(ErrorCode::E2003)
                    .with_message(format!(
                        "constant `{}` is declared twice in enum `{}`",
                        self.name_str(name),
                        self.name_str(def.name)
                    ))
                    .with_label(span, "in this enum"),
            );
        }
    }

    fn validate_union(&self, def: &UnionDef, span: Span, errors: &mut Vec<Diagnostic>) {
        let union_name = self.name_str(def.name);
        if def.alternatives.is_empty() {
            errors.push(
                Diagnostic::error(ErrorCode::E2004)
                    .with_message(format!("union `{union_name}` has no alternatives"))
                    .with_label(span, "declared here")
                    .with_note("a union value always holds exactly one alternative"),
            );
        }

        for name in duplicates(def.alternatives.iter().map(|a| a.name)) {
            errors.push(
                Diagnostic::error(ErrorCode::E2001)
                    .with_message(format!(
                        "alternative `{}` is declared twice in union `{union_name}`",
                        self.name_str(name)
                    ))
                    .with_label(span, "in this union"),
            );
        }

        for alt in &def.alternatives {
            self.check_known(alt.payload, alt.span, errors);
        }

        if let AssignPolicyKind::FallbackToEmpty { empty } = def.policy {
            match def.alternative_index(empty) {
                None => errors.push(
                    Diagnostic::error(ErrorCode::E2005)
                        .with_message(format!(
                            "fallback alternative `{}` is not declared in union `{union_name}`",
                            self.name_str(empty)
                        ))
                        .with_label(span, "in this union")
                        .with_suggestion(format!(
                            "add a marker alternative: `{}: ()`",
                            self.name_str(empty)
                        )),
                ),
                Some(index) => {
                    let payload = def.alternatives[index].payload;
                    if !self.is_default_constructible(payload) {
                        errors.push(
                            Diagnostic::error(ErrorCode::E2006)
                                .with_message(format!(
                                    "fallback alternative `{}` has payload `{}` with no default value",
                                    self.name_str(empty),
                                    self.display(payload)
                                ))
                                .with_label(def.alternatives[index].span, "declared here"),
                        );
                    }
                }
            }
        }
    }

    fn validate_aggregate(&self, def: &AggregateDef, span: Span, errors: &mut Vec<Diagnostic>) {
        for name in duplicates(def.fields.iter().map(|f| f.name)) {
            errors.push(
                Diagnostic::error(ErrorCode::E2002)
                    .with_message(format!(
                        "field `{}` is declared twice in `{}`",
                        self.name_str(name),
                        self.name_str(def.name)
                    ))
                    .with_label(span, "in this aggregate"),
            );
        }
        for field in &def.fields {
            self.check_known(field.ty, field.span, errors);
        }
    }

    fn validate_aggregate_shape(
        &self,
        type_name: Name,
        shape: &AggregateShape,
        span: Span,
        errors: &mut Vec<Diagnostic>,
    ) {
        for label in duplicates(shape.pieces.iter().filter_map(|p| p.label)) {
            errors.push(
                Diagnostic::error(ErrorCode::E2010)
                    .with_message(format!(
                        "piece label `{}` is declared twice in the extraction shape of `{}`",
                        self.name_str(label),
                        self.name_str(type_name)
                    ))
                    .with_label(span, "in this declaration"),
            );
        }
        for piece in &shape.pieces {
            self.check_known(piece.ty, span, errors);
        }
    }

    fn validate_variant_shape(
        &self,
        type_name: Name,
        shape: &VariantShape,
        span: Span,
        errors: &mut Vec<Diagnostic>,
    ) {
        let mut seen_selectors: Vec<Name> = Vec::new();
        let mut owners: FxHashMap<i64, Name> = FxHashMap::default();

        for alt in &shape.alternatives {
            self.check_known(alt.payload, span, errors);

            if !seen_selectors.contains(&alt.selector) {
                seen_selectors.push(alt.selector);
                let discriminators = shape.discriminators_for(alt.selector);
                if discriminators.len() > 1 {
                    errors.push(ambiguous_selector(
                        self,
                        type_name,
                        alt.selector,
                        &discriminators,
                        span,
                    ));
                }
            }

            match owners.get(&alt.discriminator) {
                Some(&owner) if owner != alt.selector => errors.push(
                    Diagnostic::error(ErrorCode::E2011)
                        .with_message(format!(
                            "discriminator {} of `{}` is claimed by both `{}` and `{}`",
                            alt.discriminator,
                            self.name_str(type_name),
                            self.name_str(owner),
                            self.name_str(alt.selector)
                        ))
                        .with_label(span, "in this declaration"),
                ),
                Some(_) => {}
                None => {
                    owners.insert(alt.discriminator, alt.selector);
                }
            }
        }
    }
}

/// Diagnostic for a variant-shape selector bound to several discriminators.
///
/// Raised both when validating the declaration and when a pattern uses the
/// selector.
pub fn ambiguous_selector(
    registry: &TypeRegistry,
    type_name: Name,
    selector: Name,
    discriminators: &[i64],
    span: Span,
) -> Diagnostic {
    let list = discriminators
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    Diagnostic::error(ErrorCode::E2007)
        .with_message(format!(
            "selector `{}` of `{}` is bound to several discriminators ({list})",
            registry.name_str(selector),
            registry.name_str(type_name)
        ))
        .with_label(span, "ambiguous selector")
}

/// Names that occur more than once, each reported once, in first-seen order.
fn duplicates(names: impl Iterator<Item = Name>) -> Vec<Name> {
    let mut counts: FxHashMap<Name, usize> = FxHashMap::default();
    let mut order = Vec::new();
    for name in names {
        let count = counts.entry(name).or_insert(0);
        *count += 1;
        if *count == 2 {
            order.push(name);
        }
    }
    order
}

#[cfg(test)]
mod tests;
