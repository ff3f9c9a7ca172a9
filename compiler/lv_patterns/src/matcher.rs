//! Pattern matching.
//!
//! Runs a `CompiledPattern` against a value. Matching only reads the
//! subject: dereference and alternative patterns recurse into borrowed
//! payloads, and bindings are clones of `Value`, which share heap storage
//! with the subject rather than copying it.
//!
//! A value that does not have the shape of the type the pattern was checked
//! against is a caller error (`ShapeMismatch`), not a failed match.

use lv_ir::Name;
use lv_types::TypeId;
use smallvec::SmallVec;

use crate::check::{CompiledPattern, LiteralValue, Node};
use crate::errors::{missing_capability, shape_mismatch, EvalError};
use crate::pattern::BindingLookup;
use crate::stack::ensure_sufficient_stack;
use crate::Value;

/// Bindings produced by a successful match, in the order they were made.
pub type Bindings = SmallVec<[(Name, Value); 4]>;

/// Match `value` against `pattern`.
///
/// Returns `Ok(None)` when the value does not match, `Ok(Some(bindings))`
/// when it does. `outer` is the enclosing scope, visible to guards.
#[tracing::instrument(level = "trace", skip_all, fields(ty = ?pattern.ty()))]
pub fn match_pattern(
    pattern: &CompiledPattern,
    value: &Value,
    outer: &dyn BindingLookup,
) -> Result<Option<Bindings>, EvalError> {
    let mut matcher = Matcher {
        outer,
        bindings: Bindings::new(),
    };
    if matcher.matches(&pattern.root, value)? {
        Ok(Some(matcher.bindings))
    } else {
        Ok(None)
    }
}

/// Pattern bindings layered over the enclosing scope, as seen by a guard.
struct GuardScope<'a> {
    bindings: &'a [(Name, Value)],
    outer: &'a dyn BindingLookup,
}

impl BindingLookup for GuardScope<'_> {
    fn lookup(&self, name: Name) -> Option<Value> {
        self.bindings
            .iter()
            .rev()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.clone())
            .or_else(|| self.outer.lookup(name))
    }
}

struct Matcher<'a> {
    outer: &'a dyn BindingLookup,
    bindings: Bindings,
}

impl Matcher<'_> {
    fn matches(&mut self, node: &Node, value: &Value) -> Result<bool, EvalError> {
        ensure_sufficient_stack(|| self.matches_inner(node, value))
    }

    fn matches_inner(&mut self, node: &Node, value: &Value) -> Result<bool, EvalError> {
        match node {
            Node::Wildcard => Ok(true),

            Node::Literal(literal) => match (literal, value) {
                (LiteralValue::Int(n), Value::Int(v)) => Ok(n == v),
                (LiteralValue::Bool(b), Value::Bool(v)) => Ok(b == v),
                (LiteralValue::Char(c), Value::Char(v)) => Ok(c == v),
                (
                    LiteralValue::Enum {
                        ty,
                        type_name,
                        index,
                    },
                    Value::Enum(e),
                ) => {
                    expect_type(*ty, type_name, e.ty())?;
                    Ok(*index == e.index())
                }
                _ => Err(shape_mismatch(literal_kind(*literal), value.kind_name())),
            },

            Node::Bind { name, subpattern } => {
                if let Some(sub) = subpattern {
                    if !self.matches(sub, value)? {
                        return Ok(false);
                    }
                }
                self.bindings.push((*name, value.clone()));
                Ok(true)
            }

            Node::Null => match value {
                Value::Pointer(p) => Ok(p.is_none()),
                _ => Err(shape_mismatch("a pointer", value.kind_name())),
            },

            Node::Deref(inner) => match value {
                Value::Pointer(Some(pointee)) => self.matches(inner, pointee),
                Value::Pointer(None) => Ok(false),
                _ => Err(shape_mismatch("a pointer", value.kind_name())),
            },

            Node::UnionAlternative {
                ty,
                type_name,
                discriminator,
                payload,
            } => match value {
                Value::Union(u) => {
                    expect_type(*ty, type_name, u.ty())?;
                    if u.discriminator() != *discriminator {
                        return Ok(false);
                    }
                    self.matches(payload, u.payload())
                }
                _ => Err(shape_mismatch("a union value", value.kind_name())),
            },

            Node::VariantAlternative {
                ty,
                type_name,
                discriminator,
                payload,
            } => {
                let Value::Extension(ext) = value else {
                    return Err(shape_mismatch("an extension value", value.kind_name()));
                };
                expect_type(*ty, type_name, ext.ty())?;
                let Some(variant) = ext.object().as_variant() else {
                    return Err(missing_capability(type_name, "variant"));
                };
                let active = variant.discriminator();
                if active != *discriminator {
                    return Ok(false);
                }
                let Some(inner) = variant.alternative(active) else {
                    return Err(shape_mismatch(
                        &format!("a payload for discriminator {active} of `{type_name}`"),
                        "none",
                    ));
                };
                self.matches(payload, &inner)
            }

            Node::Tuple(items) => {
                let Value::Tuple(values) = value else {
                    return Err(shape_mismatch("a tuple", value.kind_name()));
                };
                if values.len() != items.len() {
                    return Err(shape_mismatch(
                        &format!("a tuple of {} elements", items.len()),
                        &format!("a tuple of {}", values.len()),
                    ));
                }
                for (item, element) in items.iter().zip(values.iter()) {
                    if !self.matches(item, element)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }

            Node::Fields {
                ty,
                type_name,
                fields,
            } => {
                let Value::Aggregate(aggregate) = value else {
                    return Err(shape_mismatch("an aggregate", value.kind_name()));
                };
                expect_type(*ty, type_name, aggregate.ty())?;
                for (index, field) in fields {
                    let Some(field_value) = aggregate.field(*index) else {
                        return Err(shape_mismatch(
                            &format!("field #{index}"),
                            "an aggregate without it",
                        ));
                    };
                    if !self.matches(field, field_value)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }

            Node::Pieces {
                ty,
                type_name,
                pieces,
            } => {
                let Value::Extension(ext) = value else {
                    return Err(shape_mismatch("an extension value", value.kind_name()));
                };
                expect_type(*ty, type_name, ext.ty())?;
                let Some(extract) = ext.object().as_aggregate() else {
                    return Err(missing_capability(type_name, "aggregate"));
                };
                for (index, piece) in pieces {
                    let Some(piece_value) = extract.piece(*index) else {
                        return Err(shape_mismatch(
                            &format!("piece #{index} of `{type_name}`"),
                            "none",
                        ));
                    };
                    if !self.matches(piece, &piece_value)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }

            Node::Guarded { pattern, guard } => {
                if !self.matches(pattern, value)? {
                    return Ok(false);
                }
                let scope = GuardScope {
                    bindings: &self.bindings,
                    outer: self.outer,
                };
                guard.test(&scope)
            }
        }
    }
}

fn literal_kind(literal: LiteralValue) -> &'static str {
    match literal {
        LiteralValue::Int(_) => "an int",
        LiteralValue::Bool(_) => "a bool",
        LiteralValue::Char(_) => "a char",
        LiteralValue::Enum { .. } => "an enum constant",
    }
}

/// Nominal values must carry the exact type the pattern was checked against.
fn expect_type(expected: TypeId, type_name: &str, got: TypeId) -> Result<(), EvalError> {
    if expected == got {
        Ok(())
    } else {
        Err(shape_mismatch(
            &format!("a value of `{type_name}`"),
            "a value of another type",
        ))
    }
}
