//! Driving `inspect` from assignable unions and rewriting matched trees.

#![allow(clippy::unwrap_used)]

use std::cell::Cell;
use std::rc::Rc;

use lv_eval::{Environment, InspectBuilder, StmtOutcome};
use lv_ir::{Name, SharedInterner};
use lv_patterns::{
    EvalError, FallbackToEmpty, Pattern, Propagate, UnionCell, UnionValue, Value,
};
use lv_types::{AssignPolicyKind, TypeId, TypeRegistry};
use pretty_assertions::assert_eq;

fn name(reg: &TypeRegistry, s: &str) -> Name {
    reg.interner().intern(s)
}

fn int_of(env: &Environment, n: Name) -> i64 {
    env.lookup(n).and_then(|v| v.as_int()).unwrap()
}

#[test]
fn command_cell_dispatch() {
    let mut reg = TypeRegistry::new(SharedInterner::new());
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
    let score = Rc::new(Cell::new(0));
    let launches = Rc::new(Cell::new(0));
    let s = name(&reg, "s");
    let inspect = {
        let score = Rc::clone(&score);
        let launches = Rc::clone(&launches);
        InspectBuilder::<()>::new(command)
            .arm(Pattern::alternative(name(&reg, "set_score"), Pattern::bind(s)), move |env| {
                score.set(int_of(env, s));
                Ok(())
            })
            .arm(Pattern::alternative(name(&reg, "fire_missile"), Pattern::wildcard()), move |_| {
                launches.set(launches.get() + 1);
                Ok(())
            })
            .build(&mut reg)
            .unwrap()
    };
    let mut env = Environment::new();
    let mut cell = UnionCell::<FallbackToEmpty>::with_default(&reg, command).unwrap();

    cell.assign(UnionValue::construct(&reg, command, "set_score", Value::int(11)).unwrap())
        .unwrap();
    assert_eq!(
        inspect.execute(&[cell.to_value().unwrap()], &mut env).unwrap(),
        StmtOutcome::Matched(0)
    );
    assert_eq!(score.get(), 11);

    let outcome = cell
        .assign_with(|| {
            UnionValue::construct(&reg, command, "fire_missile", Value::Unit)?;
            Err(EvalError::new("launch codes unavailable"))
        })
        .unwrap();
    assert!(!outcome.is_assigned());
    assert_eq!(
        reg.name_str(cell.active_alternative().unwrap().name),
        "idle"
    );
    assert_eq!(
        inspect.execute(&[cell.to_value().unwrap()], &mut env).unwrap(),
        StmtOutcome::FellThrough
    );
    assert_eq!(launches.get(), 0);
}

#[test]
fn valueless_cell_cannot_be_inspected() {
    let mut reg = TypeRegistry::new(SharedInterner::new());
    let shape = reg.union(
        "Shape",
        &[("circle", TypeId::INT), ("square", TypeId::INT)],
        AssignPolicyKind::Propagate,
    );
    let mut cell = UnionCell::<Propagate>::with_default(&reg, shape).unwrap();

    let err = cell
        .assign_with(|| Err(EvalError::new("radius overflow")))
        .unwrap_err();
    assert_eq!(err.message, "radius overflow");
    assert!(cell.is_valueless());
    assert!(cell.to_value().is_err());
}

struct Exprs {
    reg: TypeRegistry,
    expr: TypeId,
    expr_ptr: TypeId,
    sum: TypeId,
}

impl Exprs {
    // Expr = lvariant { sum: Sum, literal: int }
    // Sum  = { lhs: *Expr, rhs: *Expr }
    fn new() -> Self {
        let mut reg = TypeRegistry::new(SharedInterner::new());
        let expr = reg.declare("Expr");
        let expr_ptr = reg.pointer(expr);
        let sum = reg.aggregate("Sum", &[("lhs", expr_ptr), ("rhs", expr_ptr)]);
        reg.define_union(
            expr,
            &[("sum", sum), ("literal", TypeId::INT)],
            AssignPolicyKind::Propagate,
        );
        assert_eq!(reg.validate(), Ok(()));
        Exprs {
            reg,
            expr,
            expr_ptr,
            sum,
        }
    }

    fn literal(&self, n: i64) -> Value {
        UnionValue::construct(&self.reg, self.expr, "literal", Value::int(n))
            .unwrap()
            .into()
    }

    fn sum_of(&self, lhs: Value, rhs: Value) -> Value {
        let sum = Value::aggregate(
            &self.reg,
            self.sum,
            vec![Value::pointer(lhs), Value::pointer(rhs)],
        )
        .unwrap();
        UnionValue::construct(&self.reg, self.expr, "sum", sum)
            .unwrap()
            .into()
    }
}

#[test]
fn constant_sum_is_folded_in_place() {
    let mut exprs = Exprs::new();
    let reg = &exprs.reg;
    let (a, b) = (name(reg, "a"), name(reg, "b"));
    let literal = |binder| {
        Pattern::deref(Pattern::alternative(name(reg, "literal"), Pattern::bind(binder)))
    };

    // *sum {lhs: *literal a, rhs: *literal b} => a + b
    let fold = Pattern::deref(Pattern::alternative(
        name(reg, "sum"),
        Pattern::fields(vec![(name(reg, "lhs"), literal(a)), (name(reg, "rhs"), literal(b))]),
    ));
    let inspect = InspectBuilder::<Option<i64>>::new(exprs.expr_ptr)
        .arm(fold, move |env| Ok(Some(int_of(env, a) + int_of(env, b))))
        .arm(Pattern::wildcard(), |_| Ok(None))
        .build(&mut exprs.reg)
        .unwrap();
    let mut env = Environment::new();

    let mut root = Value::pointer(exprs.sum_of(exprs.literal(2), exprs.literal(3)));
    let before = root.clone();

    let folded = inspect.evaluate(&[root.clone()], &mut env).unwrap();
    assert_eq!(folded, Some(5));
    *root.pointee_mut().unwrap() = exprs.literal(5);

    assert_eq!(root.pointee(), Some(&exprs.literal(5)));
    assert_eq!(before.pointee(), Some(&exprs.sum_of(exprs.literal(2), exprs.literal(3))));
    assert_eq!(inspect.evaluate(&[root], &mut env).unwrap(), None);
}

#[test]
fn null_children_fall_to_the_next_arm() {
    let mut exprs = Exprs::new();
    let reg = &exprs.reg;
    let inspect = InspectBuilder::<&'static str>::new(exprs.expr_ptr)
        .arm(Pattern::null(), |_| Ok("empty"))
        .arm(
            Pattern::deref(Pattern::alternative(name(reg, "literal"), Pattern::wildcard())),
            |_| Ok("leaf"),
        )
        .arm(Pattern::wildcard(), |_| Ok("node"))
        .build(&mut exprs.reg)
        .unwrap();
    let mut env = Environment::new();

    assert_eq!(inspect.evaluate(&[Value::null()], &mut env).unwrap(), "empty");
    let leaf = Value::pointer(exprs.literal(1));
    assert_eq!(inspect.evaluate(&[leaf], &mut env).unwrap(), "leaf");
    let node = Value::pointer(exprs.sum_of(exprs.literal(1), exprs.literal(1)));
    assert_eq!(inspect.evaluate(&[node], &mut env).unwrap(), "node");
}
