//! End-to-end behavior of `inspect` over unions, enums, aggregates and
//! pointer trees.

#![allow(clippy::unwrap_used)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lv_diagnostic::ErrorCode;
use lv_eval::{Environment, InspectBuilder, Mutability, StmtOutcome};
use lv_ir::{Name, SharedInterner};
use lv_patterns::{EvalErrorKind, Pattern, UnionValue, Value};
use lv_types::{AssignPolicyKind, TypeId, TypeRegistry};
use pretty_assertions::assert_eq;

struct Game {
    reg: TypeRegistry,
    color: TypeId,
    monster: TypeId,
    status: TypeId,
}

impl Game {
    // Color   = enum { red, yellow, green, blue }
    // Monster = { name: str, hitpoints: int, coins: int }
    // Status  = lvariant { alive: Monster, dead: unit }
    fn new() -> Self {
        let mut reg = TypeRegistry::new(SharedInterner::new());
        let color = reg.enumeration("Color", &["red", "yellow", "green", "blue"]);
        let monster = reg.aggregate(
            "Monster",
            &[("name", TypeId::STR), ("hitpoints", TypeId::INT), ("coins", TypeId::INT)],
        );
        let status = reg.union(
            "Status",
            &[("alive", monster), ("dead", TypeId::UNIT)],
            AssignPolicyKind::Propagate,
        );
        assert_eq!(reg.validate(), Ok(()));
        Game {
            reg,
            color,
            monster,
            status,
        }
    }

    fn name(&self, s: &str) -> Name {
        self.reg.interner().intern(s)
    }

    fn monster(&self, name: &str, hitpoints: i64, coins: i64) -> Value {
        Value::aggregate(
            &self.reg,
            self.monster,
            vec![Value::string(name), Value::int(hitpoints), Value::int(coins)],
        )
        .unwrap()
    }
}

#[test]
fn statement_form_falls_through_silently() {
    let mut reg = TypeRegistry::new(SharedInterner::new());
    let ran = Rc::new(RefCell::new(Vec::new()));
    let (a, b) = (Rc::clone(&ran), Rc::clone(&ran));
    let inspect = InspectBuilder::<()>::new(TypeId::INT)
        .arm(Pattern::int(0), move |_| {
            a.borrow_mut().push("A");
            Ok(())
        })
        .arm(Pattern::int(6), move |_| {
            b.borrow_mut().push("B");
            Ok(())
        })
        .build(&mut reg)
        .unwrap();
    let mut env = Environment::new();

    let outcome = inspect.execute(&[Value::int(3)], &mut env).unwrap();
    assert_eq!(outcome, StmtOutcome::FellThrough);
    assert!(ran.borrow().is_empty());

    let outcome = inspect.execute(&[Value::int(6)], &mut env).unwrap();
    assert_eq!(outcome, StmtOutcome::Matched(1));
    assert_eq!(*ran.borrow(), vec!["B"]);
}

#[test]
fn expression_form_without_match_is_no_match_failure() {
    let mut game = Game::new();
    let inspect = InspectBuilder::<&'static str>::new(game.color)
        .arm(Pattern::constant(game.name("red")), |_| Ok("R"))
        .arm(Pattern::constant(game.name("yellow")), |_| Ok("Y"))
        .build(&mut game.reg)
        .unwrap();
    let mut env = Environment::new();

    let yellow = Value::enum_constant(&game.reg, game.color, "yellow").unwrap();
    assert_eq!(inspect.evaluate(&[yellow], &mut env).unwrap(), "Y");

    let green = Value::enum_constant(&game.reg, game.color, "green").unwrap();
    let err = inspect.evaluate(&[green], &mut env).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::NoMatch);
    assert!(err.is_no_match());
}

#[test]
fn field_patterns_match_a_subset_of_fields() {
    let mut game = Game::new();
    let hitpoints = game.name("hitpoints");
    let coins = game.name("coins");
    let inspect = InspectBuilder::<&'static str>::new(game.monster)
        .arm(
            Pattern::fields(vec![(hitpoints, Pattern::int(10)), (coins, Pattern::int(10))]),
            |_| Ok("rich and healthy"),
        )
        .arm(Pattern::fields(vec![(hitpoints, Pattern::int(10))]), |_| {
            Ok("healthy")
        })
        .build(&mut game.reg)
        .unwrap();
    let mut env = Environment::new();

    let x = game.monster("X", 10, 3);
    assert_eq!(inspect.evaluate(&[x], &mut env).unwrap(), "healthy");

    let y = game.monster("Y", 10, 10);
    assert_eq!(inspect.evaluate(&[y], &mut env).unwrap(), "rich and healthy");
}

#[test]
fn guard_is_not_evaluated_when_shape_fails() {
    let mut game = Game::new();
    let hp = game.name("hp");
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    // alive {hitpoints: hp} if hp <= 3
    let weak = Pattern::alternative(
        game.name("alive"),
        Pattern::fields(vec![(game.name("hitpoints"), Pattern::bind(hp))]),
    )
    .guarded(move |scope| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(scope.lookup(hp).and_then(|v| v.as_int()).is_some_and(|hp| hp <= 3))
    });
    let inspect = InspectBuilder::<&'static str>::new(game.status)
        .arm(weak, |_| Ok("weak"))
        .arm(Pattern::wildcard(), |_| Ok("other"))
        .build(&mut game.reg)
        .unwrap();
    let mut env = Environment::new();

    let dead = UnionValue::construct(&game.reg, game.status, "dead", Value::Unit).unwrap();
    assert_eq!(inspect.evaluate(&[dead.into()], &mut env).unwrap(), "other");
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let alive = UnionValue::construct(&game.reg, game.status, "alive", game.monster("M", 2, 0))
        .unwrap();
    assert_eq!(inspect.evaluate(&[alive.into()], &mut env).unwrap(), "weak");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn bindings_do_not_leak_between_arms_or_out_of_the_action() {
    let mut game = Game::new();
    let hp = game.name("hp");
    let seen_in_second_arm = Rc::new(RefCell::new(None));
    let seen = Rc::clone(&seen_in_second_arm);

    let inspect = InspectBuilder::<()>::new(game.monster)
        .arm(
            Pattern::fields(vec![(game.name("hitpoints"), Pattern::bind(hp))]).guarded(|_| Ok(false)),
            |_| Ok(()),
        )
        .arm(Pattern::wildcard(), move |env| {
            *seen.borrow_mut() = Some(env.lookup(hp));
            Ok(())
        })
        .build(&mut game.reg)
        .unwrap();
    let mut env = Environment::new();

    let outcome = inspect.execute(&[game.monster("M", 5, 0)], &mut env).unwrap();
    assert_eq!(outcome, StmtOutcome::Matched(1));
    assert_eq!(*seen_in_second_arm.borrow(), Some(None));
    assert_eq!(env.lookup(hp), None);
    assert_eq!(env.depth(), 1);
}

#[test]
fn actions_see_bindings_and_update_outer_variables() {
    let mut game = Game::new();
    let coins = game.name("coins");
    let c = game.name("c");
    let total = game.name("total");
    let inspect = InspectBuilder::<()>::new(game.monster)
        .arm(Pattern::fields(vec![(coins, Pattern::bind(c))]), move |env| {
            let sum = env.lookup(total).and_then(|v| v.as_int()).unwrap_or(0)
                + env.lookup(c).and_then(|v| v.as_int()).unwrap_or(0);
            env.assign(total, Value::int(sum))
                .map_err(|e| lv_patterns::EvalError::new(format!("{e:?}")))
        })
        .build(&mut game.reg)
        .unwrap();
    let mut env = Environment::new();
    env.define(total, Value::int(0), Mutability::Mutable);

    for coins in [3, 4, 5] {
        inspect
            .execute(&[game.monster("M", 1, coins)], &mut env)
            .unwrap();
    }
    assert_eq!(env.lookup(total), Some(Value::int(12)));
}

#[test]
fn multiple_subjects_match_left_to_right() {
    let mut game = Game::new();
    let order = Arc::new(std::sync::Mutex::new(Vec::new()));
    let watch = |label: &'static str, pattern: Pattern| {
        let order = Arc::clone(&order);
        pattern.guarded(move |_| {
            order.lock().unwrap().push(label);
            Ok(true)
        })
    };
    let inspect = InspectBuilder::<i64>::with_subjects(&[game.color, TypeId::INT])
        .arm_each(
            vec![
                watch("color", Pattern::constant(game.name("red"))),
                watch("int", Pattern::int(1)),
            ],
            |_| Ok(1),
        )
        .arm_each(vec![Pattern::wildcard(), Pattern::bind(game.name("n"))], |_| Ok(2))
        .build(&mut game.reg)
        .unwrap();
    let mut env = Environment::new();
    let red = Value::enum_constant(&game.reg, game.color, "red").unwrap();
    let blue = Value::enum_constant(&game.reg, game.color, "blue").unwrap();

    assert_eq!(inspect.evaluate(&[red, Value::int(1)], &mut env).unwrap(), 1);
    assert_eq!(*order.lock().unwrap(), vec!["color", "int"]);

    order.lock().unwrap().clear();
    assert_eq!(inspect.evaluate(&[blue, Value::int(1)], &mut env).unwrap(), 2);
    assert!(order.lock().unwrap().is_empty());
}

#[test]
fn static_mismatches_are_reported_when_building() {
    let mut game = Game::new();
    let diags = InspectBuilder::<()>::new(game.monster)
        .arm(Pattern::fields(vec![(game.name("mana"), Pattern::wildcard())]), |_| Ok(()))
        .arm(Pattern::sequence(vec![Pattern::wildcard()]), |_| Ok(()))
        .arm(Pattern::alternative(game.name("alive"), Pattern::wildcard()), |_| Ok(()))
        .build(&mut game.reg)
        .unwrap_err();
    let codes: Vec<ErrorCode> = diags.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E3002, ErrorCode::E3003, ErrorCode::E3006]);
}

#[test]
fn subject_of_another_union_type_is_rejected() {
    let mut game = Game::new();
    let command = game.reg.union(
        "Command",
        &[("set_score", TypeId::INT), ("fire_missile", TypeId::UNIT)],
        AssignPolicyKind::Propagate,
    );
    let x = game.name("x");
    let inspect = InspectBuilder::<&'static str>::new(game.status)
        .arm(Pattern::alternative(game.name("alive"), Pattern::bind(x)), |_| Ok("alive"))
        .arm(Pattern::wildcard(), |_| Ok("other"))
        .build(&mut game.reg)
        .unwrap();
    let mut env = Environment::new();

    let set_score = UnionValue::construct(&game.reg, command, "set_score", Value::int(10)).unwrap();
    let err = inspect.evaluate(&[set_score.into()], &mut env).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::ShapeMismatch { .. }));
    assert_eq!(env.lookup(x), None);
}

#[test]
fn empty_field_pattern_over_several_subjects() {
    let mut reg = TypeRegistry::new(SharedInterner::new());
    let inspect = InspectBuilder::<&'static str>::with_subjects(&[TypeId::INT, TypeId::INT])
        .arm(Pattern::fields(Vec::new()), |_| Ok("any pair"))
        .build(&mut reg)
        .unwrap();
    let mut env = Environment::new();

    assert_eq!(
        inspect.evaluate(&[Value::int(1), Value::int(2)], &mut env).unwrap(),
        "any pair"
    );
}

mod proptest_inspect {
    use super::*;
    use proptest::prelude::*;

    fn zero_or_six() -> lv_eval::Inspect<()> {
        let mut reg = TypeRegistry::new(SharedInterner::new());
        InspectBuilder::<()>::new(TypeId::INT)
            .arm(Pattern::int(0), |_| Ok(()))
            .arm(Pattern::int(6), |_| Ok(()))
            .build(&mut reg)
            .unwrap()
    }

    proptest! {
        #[test]
        fn statement_matches_exactly_the_listed_literals(n in -1_000i64..1_000) {
            let inspect = zero_or_six();
            let mut env = Environment::new();
            let expected = match n {
                0 => StmtOutcome::Matched(0),
                6 => StmtOutcome::Matched(1),
                _ => StmtOutcome::FellThrough,
            };
            prop_assert_eq!(inspect.execute(&[Value::int(n)], &mut env).unwrap(), expected);
            prop_assert_eq!(env.depth(), 1);
        }
    }
}

#[test]
fn init_tracing_is_idempotent() {
    lv_eval::init_tracing();
    lv_eval::init_tracing();
}
