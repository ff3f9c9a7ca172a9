//! Pattern AST.
//!
//! Patterns are built with the factory functions on `Pattern` and checked
//! against a subject type with `check_pattern` before they can be matched.
//! Every node carries a `Span` so checker diagnostics can point at it.
//!
//! ```text
//! // sum {*(literal 0), *rhs}
//! Pattern::alternative(sum, Pattern::sequence(vec![
//!     Pattern::deref(Pattern::alternative(literal, Pattern::int(0))),
//!     Pattern::deref(Pattern::bind(rhs)),
//! ]))
//! ```

use std::fmt;
use std::sync::Arc;

use lv_ir::{Name, Span};

use crate::errors::EvalError;
use crate::Value;

/// A pattern node.
#[derive(Clone, Debug)]
pub struct Pattern {
    pub kind: PatternKind,
    pub span: Span,
}

/// Pattern node kinds.
#[derive(Clone, Debug)]
pub enum PatternKind {
    /// `_`: matches anything, binds nothing.
    Wildcard,
    /// Matches an equal integral, bool, char or enum constant.
    Literal(Literal),
    /// Binds the value, optionally only if `subpattern` also matches.
    Binding {
        name: Name,
        subpattern: Option<Box<Pattern>>,
    },
    /// Matches a null pointer.
    Null,
    /// `*p`: matches a non-null pointer whose pointee matches `p`.
    Deref(Box<Pattern>),
    /// `selector p`: matches the alternative named `selector` if its
    /// payload matches `p`.
    Alternative { selector: Name, payload: Box<Pattern> },
    /// `[p0, p1, ...]`: positional, arity must match exactly.
    Sequence(Vec<Pattern>),
    /// `{field: p, ...}`: an explicit subset of named fields.
    Fields(Vec<FieldPattern>),
    /// `p if guard`.
    Guarded { pattern: Box<Pattern>, guard: Guard },
}

/// Literal in a literal pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Literal {
    Int(i64),
    Bool(bool),
    Char(char),
    /// Enum constant, resolved by name against the subject's enum type.
    Constant(Name),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(n) => write!(f, "{n}"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Char(c) => write!(f, "'{c}'"),
            Literal::Constant(name) => write!(f, "{name:?}"),
        }
    }
}

/// One entry of a field pattern.
#[derive(Clone, Debug)]
pub struct FieldPattern {
    pub name: Name,
    pub pattern: Pattern,
    pub span: Span,
}

/// Read access to bindings visible to a guard.
///
/// Implemented by the evaluator's environment (enclosing scope) and by the
/// matcher's guard scope (pattern bindings layered over the enclosing scope).
pub trait BindingLookup {
    fn lookup(&self, name: Name) -> Option<Value>;
}

/// A scope with no bindings.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoBindings;

impl BindingLookup for NoBindings {
    fn lookup(&self, _name: Name) -> Option<Value> {
        None
    }
}

type GuardFn = dyn Fn(&dyn BindingLookup) -> Result<bool, EvalError> + Send + Sync;

/// Boolean predicate attached to a pattern.
///
/// Evaluated only after the wrapped pattern matched, with its bindings in
/// scope. A guard may have side effects; they happen in arm order and only
/// for arms whose pattern matched.
#[derive(Clone)]
pub struct Guard {
    predicate: Arc<GuardFn>,
}

impl Guard {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&dyn BindingLookup) -> Result<bool, EvalError> + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// Evaluate the predicate.
    pub fn test(&self, scope: &dyn BindingLookup) -> Result<bool, EvalError> {
        (self.predicate)(scope)
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard(..)")
    }
}

// Factory functions

impl Pattern {
    #[inline]
    pub fn new(kind: PatternKind) -> Self {
        Pattern {
            kind,
            span: Span::DUMMY,
        }
    }

    /// Attach a source span.
    #[must_use]
    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn wildcard() -> Self {
        Self::new(PatternKind::Wildcard)
    }

    pub fn int(n: i64) -> Self {
        Self::new(PatternKind::Literal(Literal::Int(n)))
    }

    pub fn bool(b: bool) -> Self {
        Self::new(PatternKind::Literal(Literal::Bool(b)))
    }

    pub fn char(c: char) -> Self {
        Self::new(PatternKind::Literal(Literal::Char(c)))
    }

    /// Enum constant literal.
    pub fn constant(name: Name) -> Self {
        Self::new(PatternKind::Literal(Literal::Constant(name)))
    }

    pub fn bind(name: Name) -> Self {
        Self::new(PatternKind::Binding {
            name,
            subpattern: None,
        })
    }

    /// `name @ subpattern`: bind only if `subpattern` matches.
    pub fn bind_at(name: Name, subpattern: Pattern) -> Self {
        Self::new(PatternKind::Binding {
            name,
            subpattern: Some(Box::new(subpattern)),
        })
    }

    pub fn null() -> Self {
        Self::new(PatternKind::Null)
    }

    pub fn deref(pointee: Pattern) -> Self {
        Self::new(PatternKind::Deref(Box::new(pointee)))
    }

    pub fn alternative(selector: Name, payload: Pattern) -> Self {
        Self::new(PatternKind::Alternative {
            selector,
            payload: Box::new(payload),
        })
    }

    pub fn sequence(items: Vec<Pattern>) -> Self {
        Self::new(PatternKind::Sequence(items))
    }

    /// Field pattern from `(field, pattern)` pairs.
    pub fn fields(fields: Vec<(Name, Pattern)>) -> Self {
        Self::new(PatternKind::Fields(
            fields
                .into_iter()
                .map(|(name, pattern)| FieldPattern {
                    span: pattern.span,
                    name,
                    pattern,
                })
                .collect(),
        ))
    }

    /// Wrap this pattern with a guard.
    #[must_use]
    pub fn guarded<F>(self, predicate: F) -> Self
    where
        F: Fn(&dyn BindingLookup) -> Result<bool, EvalError> + Send + Sync + 'static,
    {
        let span = self.span;
        Pattern {
            kind: PatternKind::Guarded {
                pattern: Box::new(self),
                guard: Guard::new(predicate),
            },
            span,
        }
    }
}
