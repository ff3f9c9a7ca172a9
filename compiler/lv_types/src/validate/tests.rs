use lv_diagnostic::ErrorCode;
use lv_ir::SharedInterner;
use pretty_assertions::assert_eq;

use crate::{AggregateShape, AssignPolicyKind, TypeId, TypeRegistry, VariantShape};

fn registry() -> TypeRegistry {
    TypeRegistry::new(SharedInterner::new())
}

fn codes(reg: &TypeRegistry) -> Vec<ErrorCode> {
    match reg.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => errors.into_iter().map(|d| d.code).collect(),
    }
}

#[test]
fn valid_declarations_pass() {
    let mut reg = registry();
    reg.enumeration("Color", &["red", "yellow", "green", "blue"]);
    reg.union(
        "Command",
        &[("set_score", TypeId::INT), ("fire_missile", TypeId::UNIT)],
        AssignPolicyKind::Propagate,
    );
    assert_eq!(codes(&reg), vec![]);
}

#[test]
fn duplicate_alternative() {
    let mut reg = registry();
    reg.union(
        "Command",
        &[("set_score", TypeId::INT), ("set_score", TypeId::UNIT)],
        AssignPolicyKind::Propagate,
    );
    assert_eq!(codes(&reg), vec![ErrorCode::E2001]);
}

#[test]
fn union_without_alternatives() {
    let mut reg = registry();
    reg.union("Never", &[], AssignPolicyKind::Abort);
    assert_eq!(codes(&reg), vec![ErrorCode::E2004]);
}

#[test]
fn duplicate_field_and_constant() {
    let mut reg = registry();
    reg.aggregate("Player", &[("coins", TypeId::INT), ("coins", TypeId::INT)]);
    reg.enumeration("Color", &["red", "red"]);
    assert_eq!(codes(&reg), vec![ErrorCode::E2002, ErrorCode::E2003]);
}

#[test]
fn fallback_requires_declared_empty() {
    let mut reg = registry();
    let policy = reg.fallback_to("empty");
    reg.union("Slot", &[("number", TypeId::INT)], policy);
    assert_eq!(codes(&reg), vec![ErrorCode::E2005]);
}

#[test]
fn fallback_requires_default_payload() {
    let mut reg = registry();
    let handle = reg.extension("Handle", Some(AggregateShape::default()), None);
    let policy = reg.fallback_to("empty");
    reg.union("Slot", &[("number", TypeId::INT), ("empty", handle)], policy);
    assert_eq!(codes(&reg), vec![ErrorCode::E2006]);
}

#[test]
fn fallback_with_marker_alternative_is_valid() {
    let mut reg = registry();
    let policy = reg.fallback_to("empty");
    reg.union("Slot", &[("number", TypeId::INT), ("empty", TypeId::UNIT)], policy);
    assert_eq!(codes(&reg), vec![]);
}

#[test]
fn declared_but_undefined() {
    let mut reg = registry();
    reg.declare("Ghost");
    assert_eq!(codes(&reg), vec![ErrorCode::E2008]);
}

#[test]
fn duplicate_type_name_and_redefinition() {
    let mut reg = registry();
    let first = reg.enumeration("Color", &["red"]);
    reg.enumeration("Color", &["blue"]);
    reg.define_enum(first, &["green"]);
    assert_eq!(codes(&reg), vec![ErrorCode::E2009, ErrorCode::E2009]);
}

#[test]
fn selector_with_two_discriminators() {
    let mut reg = registry();
    let interner = reg.interner().clone();
    let shape = VariantShape::default()
        .alternative(interner.intern("number"), 0, TypeId::INT)
        .alternative(interner.intern("number"), 1, TypeId::INT);
    reg.extension("Cell", None, Some(shape));
    assert_eq!(codes(&reg), vec![ErrorCode::E2007]);
}

#[test]
fn discriminator_claimed_twice() {
    let mut reg = registry();
    let interner = reg.interner().clone();
    let shape = VariantShape::default()
        .alternative(interner.intern("number"), 0, TypeId::INT)
        .alternative(interner.intern("text"), 0, TypeId::STR);
    reg.extension("Cell", None, Some(shape));
    assert_eq!(codes(&reg), vec![ErrorCode::E2011]);
}

#[test]
fn duplicate_piece_label() {
    let mut reg = registry();
    let interner = reg.interner().clone();
    let shape = AggregateShape::default()
        .labeled(interner.intern("x"), TypeId::INT)
        .labeled(interner.intern("x"), TypeId::INT)
        .positional(TypeId::BOOL);
    reg.extension("Point", Some(shape), None);
    assert_eq!(codes(&reg), vec![ErrorCode::E2010]);
}

#[test]
fn diagnostics_name_the_offender() {
    let mut reg = registry();
    reg.union(
        "Command",
        &[("set_score", TypeId::INT), ("set_score", TypeId::INT)],
        AssignPolicyKind::Propagate,
    );
    let errors = reg.validate().err().unwrap_or_default();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].message,
        "alternative `set_score` is declared twice in union `Command`"
    );
}
