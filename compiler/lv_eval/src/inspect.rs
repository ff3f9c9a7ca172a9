//! The `inspect` construct.
//!
//! An `Inspect<A>` is an ordered list of arms, each a checked pattern plus
//! an action producing an `A`. Arms are tried top to bottom; the first whose
//! pattern (guard included) matches runs its action with the pattern's
//! bindings in a fresh scope, and no later arm is tried.
//!
//! Two forms share the arms and differ only on exhaustion:
//!
//! | Form       | Entry point | No arm matched                   |
//! |------------|-------------|----------------------------------|
//! | statement  | `execute`   | `StmtOutcome::FellThrough`       |
//! | expression | `evaluate`  | `Err` with `EvalErrorKind::NoMatch` |
//!
//! Several subjects are matched as one tuple, left to right, with the same
//! short-circuit as any sequence pattern.
//!
//! # State machine
//!
//! ```text
//!              pattern fails, arms left
//!                 ┌──────────┐
//!                 ▼          │
//!  start ──► Scanning(i) ────┘
//!              │      │
//!    matched   │      │ arms exhausted
//!              ▼      ├──────────────► Done            (statement)
//!        Matched(i)   └──────────────► NoMatchFailure  (expression)
//!              │
//!              └─ action ran ────────► Done
//! ```

use std::fmt;

use lv_diagnostic::{Diagnostic, ErrorCode};
use lv_ir::Span;
use lv_patterns::errors::{no_match, shape_mismatch};
use lv_patterns::{
    check_pattern, match_pattern, Bindings, CompiledPattern, EvalError, Pattern, Value,
};
use lv_types::{TypeId, TypeRegistry};

use crate::environment::{Environment, Mutability};

/// Action run when an arm matches.
pub type Action<A> = Box<dyn Fn(&mut Environment) -> Result<A, EvalError>>;

/// Evaluator state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MatchState {
    /// Trying arm `i`.
    Scanning(usize),
    /// Running the action of arm `i`.
    Matched(usize),
    /// Terminal.
    Done,
    /// Terminal; only reachable from the expression form.
    NoMatchFailure,
}

impl MatchState {
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, MatchState::Done | MatchState::NoMatchFailure)
    }
}

/// Result of the statement form.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StmtOutcome {
    /// Arm `i` matched and its action ran.
    Matched(usize),
    /// No arm matched. Not an error.
    FellThrough,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Form {
    Statement,
    Expression,
}

/// A checked arm.
pub struct Arm<A> {
    pattern: CompiledPattern,
    action: Action<A>,
}

impl<A> Arm<A> {
    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }
}

impl<A> fmt::Debug for Arm<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arm")
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

struct PendingArm<A> {
    pattern: Pattern,
    action: Action<A>,
}

/// Collects arms, then checks them all against the subject types.
pub struct InspectBuilder<A> {
    subjects: Vec<TypeId>,
    arms: Vec<PendingArm<A>>,
    errors: Vec<Diagnostic>,
}

impl<A> InspectBuilder<A> {
    /// Inspect a single subject of type `subject`.
    pub fn new(subject: TypeId) -> Self {
        Self::with_subjects(&[subject])
    }

    /// Inspect several subjects at once, matched as a tuple.
    pub fn with_subjects(subjects: &[TypeId]) -> Self {
        InspectBuilder {
            subjects: subjects.to_vec(),
            arms: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Add an arm whose pattern matches the whole subject (the subject tuple
    /// when there are several).
    #[must_use]
    pub fn arm<F>(mut self, pattern: Pattern, action: F) -> Self
    where
        F: Fn(&mut Environment) -> Result<A, EvalError> + 'static,
    {
        self.arms.push(PendingArm {
            pattern,
            action: Box::new(action),
        });
        self
    }

    /// Add an arm with one pattern per subject.
    #[must_use]
    pub fn arm_each<F>(mut self, patterns: Vec<Pattern>, action: F) -> Self
    where
        F: Fn(&mut Environment) -> Result<A, EvalError> + 'static,
    {
        let span = patterns
            .iter()
            .map(|p| p.span)
            .reduce(Span::merge)
            .unwrap_or(Span::DUMMY);
        if patterns.len() != self.subjects.len() {
            self.errors.push(
                Diagnostic::error(ErrorCode::E3012)
                    .with_message(format!(
                        "arm has {} pattern{} but inspect has {} subject{}",
                        patterns.len(),
                        plural(patterns.len()),
                        self.subjects.len(),
                        plural(self.subjects.len()),
                    ))
                    .with_label(span, "in this arm"),
            );
            return self;
        }
        let pattern = match <[Pattern; 1]>::try_from(patterns) {
            Ok([single]) => single,
            Err(patterns) => Pattern::sequence(patterns).at(span),
        };
        self.arm(pattern, action)
    }

    /// Check every arm. Any diagnostic fails the whole construct.
    #[tracing::instrument(level = "debug", skip_all, fields(arms = self.arms.len()))]
    pub fn build(self, registry: &mut TypeRegistry) -> Result<Inspect<A>, Vec<Diagnostic>> {
        let mut errors = self.errors;
        let subject_ty = match self.subjects.as_slice() {
            [] => {
                errors.push(
                    Diagnostic::error(ErrorCode::E3012)
                        .with_message("inspect needs at least one subject"),
                );
                return Err(errors);
            }
            [single] => *single,
            many => registry.tuple(many),
        };

        let mut arms = Vec::with_capacity(self.arms.len());
        for pending in self.arms {
            match check_pattern(&pending.pattern, subject_ty, registry) {
                Ok(pattern) => arms.push(Arm {
                    pattern,
                    action: pending.action,
                }),
                Err(diags) => errors.extend(diags),
            }
        }

        if errors.is_empty() {
            Ok(Inspect {
                subject_ty,
                subject_count: self.subjects.len(),
                arms,
            })
        } else {
            tracing::debug!(errors = errors.len(), "inspect rejected");
            Err(errors)
        }
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// A checked `inspect` construct.
pub struct Inspect<A> {
    subject_ty: TypeId,
    subject_count: usize,
    arms: Vec<Arm<A>>,
}

impl<A> fmt::Debug for Inspect<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inspect")
            .field("subject_ty", &self.subject_ty)
            .field("arms", &self.arms)
            .finish()
    }
}

impl<A> Inspect<A> {
    /// Type the arms were checked against (a tuple for several subjects).
    pub fn subject_ty(&self) -> TypeId {
        self.subject_ty
    }

    pub fn arms(&self) -> &[Arm<A>] {
        &self.arms
    }

    /// Expression form: the matched arm's value, or `NoMatch`.
    #[tracing::instrument(level = "debug", skip_all, fields(arms = self.arms.len()))]
    pub fn evaluate(&self, subjects: &[Value], env: &mut Environment) -> Result<A, EvalError> {
        match self.run(subjects, env, Form::Expression, &mut |_| {})? {
            Some((_, value)) => Ok(value),
            // `run` reports exhaustion as `NoMatch` for the expression form.
            None => Err(no_match()),
        }
    }

    /// Drive the state machine to a terminal state.
    ///
    /// `observe` sees every state entered, in order.
    fn run(
        &self,
        subjects: &[Value],
        env: &mut Environment,
        form: Form,
        observe: &mut dyn FnMut(MatchState),
    ) -> Result<Option<(usize, A)>, EvalError> {
        let subject = self.subject_value(subjects)?;
        let mut state = MatchState::Scanning(0);
        let mut bindings = Bindings::new();
        let mut result = None;
        observe(state);

        while !state.is_terminal() {
            let next = match state {
                MatchState::Scanning(i) => match self.arms.get(i) {
                    Some(arm) => match match_pattern(&arm.pattern, &subject, env)? {
                        Some(found) => {
                            bindings = found;
                            MatchState::Matched(i)
                        }
                        None => MatchState::Scanning(i + 1),
                    },
                    None => match form {
                        Form::Statement => MatchState::Done,
                        Form::Expression => MatchState::NoMatchFailure,
                    },
                },
                MatchState::Matched(i) => {
                    let value = self.run_action(i, std::mem::take(&mut bindings), env)?;
                    result = Some((i, value));
                    MatchState::Done
                }
                MatchState::Done | MatchState::NoMatchFailure => state,
            };
            tracing::trace!(from = ?state, to = ?next, "inspect transition");
            state = next;
            observe(state);
        }

        if state == MatchState::NoMatchFailure {
            return Err(no_match().with_span(self.span()));
        }
        Ok(result)
    }

    /// Run arm `index`'s action with `bindings` in a fresh scope.
    fn run_action(
        &self,
        index: usize,
        bindings: Bindings,
        env: &mut Environment,
    ) -> Result<A, EvalError> {
        let Some(arm) = self.arms.get(index) else {
            return Err(EvalError::new(format!("inspect has no arm {index}")));
        };
        env.push_scope();
        for (name, value) in bindings {
            env.define(name, value, Mutability::Immutable);
        }
        let result = (arm.action)(env);
        env.pop_scope();
        result
    }

    fn subject_value(&self, subjects: &[Value]) -> Result<Value, EvalError> {
        match subjects {
            _ if subjects.len() != self.subject_count => Err(shape_mismatch(
                &format!("{} subjects", self.subject_count),
                &subjects.len().to_string(),
            )),
            [single] => Ok(single.clone()),
            many => Ok(Value::tuple(many.to_vec())),
        }
    }

    fn span(&self) -> Span {
        self.arms
            .iter()
            .map(|arm| arm.pattern.span())
            .reduce(Span::merge)
            .unwrap_or(Span::DUMMY)
    }
}

impl Inspect<()> {
    /// Statement form: run the first matching arm, or fall through.
    #[tracing::instrument(level = "debug", skip_all, fields(arms = self.arms.len()))]
    pub fn execute(
        &self,
        subjects: &[Value],
        env: &mut Environment,
    ) -> Result<StmtOutcome, EvalError> {
        Ok(match self.run(subjects, env, Form::Statement, &mut |_| {})? {
            Some((index, ())) => StmtOutcome::Matched(index),
            None => StmtOutcome::FellThrough,
        })
    }
}
