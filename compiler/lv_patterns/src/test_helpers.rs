//! Shared fixtures for unit tests.
//!
//! One registry with the types most tests need:
//!
//! ```text
//! Expr    = lvariant { sum: Sum, literal: int }                  (propagate)
//! Sum     = { lhs: *Expr, rhs: *Expr }
//! Command = lvariant { set_score: int, fire_missile: unit, idle: unit }
//!                                                                (fallback to idle)
//! Color   = enum { red, green, blue }
//! Point   = { x: int, y: int }
//! Ratio   = extension, aggregate shape [num: int, den: int]
//! Token   = extension, variant shape { number = 10: int, eof = 20: unit }
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use lv_ir::{Name, SharedInterner};
use lv_types::{AggregateShape, AssignPolicyKind, TypeId, TypeRegistry, VariantShape};

use crate::extension::{AggregateExtract, ExtensionObject, VariantExtract};
use crate::Value;

pub(crate) struct Fixture {
    pub reg: TypeRegistry,
    pub expr: TypeId,
    pub sum: TypeId,
    pub expr_ptr: TypeId,
    pub command: TypeId,
    pub color: TypeId,
    pub point: TypeId,
    pub ratio: TypeId,
    pub token: TypeId,
}

impl Fixture {
    pub fn new() -> Self {
        let mut reg = TypeRegistry::new(SharedInterner::new());

        let expr = reg.declare("Expr");
        let expr_ptr = reg.pointer(expr);
        let sum = reg.aggregate("Sum", &[("lhs", expr_ptr), ("rhs", expr_ptr)]);
        reg.define_union(
            expr,
            &[("sum", sum), ("literal", TypeId::INT)],
            AssignPolicyKind::Propagate,
        );

        let idle = reg.fallback_to("idle");
        let command = reg.union(
            "Command",
            &[
                ("set_score", TypeId::INT),
                ("fire_missile", TypeId::UNIT),
                ("idle", TypeId::UNIT),
            ],
            idle,
        );

        let color = reg.enumeration("Color", &["red", "green", "blue"]);
        let point = reg.aggregate("Point", &[("x", TypeId::INT), ("y", TypeId::INT)]);

        let num = reg.interner().intern("num");
        let den = reg.interner().intern("den");
        let ratio = reg.extension(
            "Ratio",
            Some(
                AggregateShape::default()
                    .labeled(num, TypeId::INT)
                    .labeled(den, TypeId::INT),
            ),
            None,
        );

        let number = reg.interner().intern("number");
        let eof = reg.interner().intern("eof");
        let token = reg.extension(
            "Token",
            None,
            Some(
                VariantShape::default()
                    .alternative(number, 10, TypeId::INT)
                    .alternative(eof, 20, TypeId::UNIT),
            ),
        );

        assert_eq!(reg.validate(), Ok(()));
        Fixture {
            reg,
            expr,
            sum,
            expr_ptr,
            command,
            color,
            point,
            ratio,
            token,
        }
    }

    pub fn name(&self, s: &str) -> Name {
        self.reg.interner().intern(s)
    }

    /// `Expr.literal(n)`.
    pub fn literal(&self, n: i64) -> Value {
        Value::from(
            crate::UnionValue::construct(&self.reg, self.expr, "literal", Value::int(n)).unwrap(),
        )
    }

    /// `Expr.sum(Sum { lhs: *lhs, rhs: *rhs })`.
    pub fn sum_of(&self, lhs: Value, rhs: Value) -> Value {
        let sum = Value::aggregate(
            &self.reg,
            self.sum,
            vec![Value::pointer(lhs), Value::pointer(rhs)],
        )
        .unwrap();
        Value::from(crate::UnionValue::construct(&self.reg, self.expr, "sum", sum).unwrap())
    }
}

/// Host object for `Ratio`.
#[derive(Debug)]
pub(crate) struct Ratio {
    pub num: i64,
    pub den: i64,
}

impl AggregateExtract for Ratio {
    fn piece(&self, index: usize) -> Option<Value> {
        match index {
            0 => Some(Value::int(self.num)),
            1 => Some(Value::int(self.den)),
            _ => None,
        }
    }
}

impl ExtensionObject for Ratio {
    fn as_aggregate(&self) -> Option<&dyn AggregateExtract> {
        Some(self)
    }
}

/// Host object for `Token`. Records the last discriminator it was asked
/// for, so tests can check the payload accessor is only called for the
/// active alternative.
#[derive(Debug)]
pub(crate) struct Token {
    pub discriminator: i64,
    pub number: i64,
    pub last_requested: Arc<AtomicI64>,
}

impl Token {
    pub fn number(n: i64) -> Self {
        Token {
            discriminator: 10,
            number: n,
            last_requested: Arc::new(AtomicI64::new(-1)),
        }
    }

    pub fn eof() -> Self {
        Token {
            discriminator: 20,
            number: 0,
            last_requested: Arc::new(AtomicI64::new(-1)),
        }
    }
}

impl VariantExtract for Token {
    fn discriminator(&self) -> i64 {
        self.discriminator
    }

    fn alternative(&self, discriminator: i64) -> Option<Value> {
        self.last_requested.store(discriminator, Ordering::SeqCst);
        match discriminator {
            10 => Some(Value::int(self.number)),
            20 => Some(Value::Unit),
            _ => None,
        }
    }
}

impl ExtensionObject for Token {
    fn as_variant(&self) -> Option<&dyn VariantExtract> {
        Some(self)
    }
}

/// Host object that implements no capability.
#[derive(Debug)]
pub(crate) struct Opaque;

impl ExtensionObject for Opaque {}
