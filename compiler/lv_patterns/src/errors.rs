//! Runtime error types.
//!
//! Everything that can go wrong once declarations and patterns have been
//! validated: a union queried while valueless, an expression-form `inspect`
//! that matched nothing, a construction whose payload has the wrong shape.
//!
//! `EvalErrorKind` carries structured data so callers can match on the
//! failure instead of parsing messages. Factory functions below are the
//! public way to build errors; they fill in both `kind` and `message`.

use std::fmt;

use lv_ir::Span;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Match evaluation
    /// Expression-form `inspect` exhausted every arm.
    NoMatch,

    // Tagged unions
    /// The active alternative was queried on a union left valueless by a
    /// failed assignment.
    Valueless {
        union: String,
    },
    /// `payload_as` named a declared alternative that is not the active one.
    WrongAlternative {
        expected: String,
        active: String,
    },
    UnknownAlternative {
        union: String,
        alternative: String,
    },
    PayloadTypeMismatch {
        alternative: String,
        expected: String,
        got: String,
    },
    NotAUnion {
        type_name: String,
    },
    UnknownConstant {
        enum_name: String,
        constant: String,
    },
    NotDefaultConstructible {
        type_name: String,
    },
    /// A `UnionCell` policy parameter disagrees with the declared policy.
    PolicyMismatch {
        union: String,
        declared: &'static str,
        requested: &'static str,
    },

    // Extension protocol
    MissingCapability {
        type_name: String,
        capability: &'static str,
    },

    // Matching
    /// The value handed to the matcher does not have the shape the pattern
    /// was checked against.
    ShapeMismatch {
        expected: String,
        got: String,
    },

    /// Catch-all, mostly for errors raised from guards and arm actions.
    Custom {
        message: String,
    },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatch => write!(f, "no inspect arm matched the subject"),
            Self::Valueless { union } => {
                write!(f, "union `{union}` is valueless after a failed assignment")
            }
            Self::WrongAlternative { expected, active } => {
                write!(f, "alternative `{expected}` requested but `{active}` is active")
            }
            Self::UnknownAlternative { union, alternative } => {
                write!(f, "union `{union}` has no alternative `{alternative}`")
            }
            Self::PayloadTypeMismatch {
                alternative,
                expected,
                got,
            } => write!(
                f,
                "alternative `{alternative}` expects a payload of type `{expected}`, got {got}"
            ),
            Self::NotAUnion { type_name } => write!(f, "`{type_name}` is not a union type"),
            Self::UnknownConstant {
                enum_name,
                constant,
            } => write!(f, "enum `{enum_name}` has no constant `{constant}`"),
            Self::NotDefaultConstructible { type_name } => {
                write!(f, "`{type_name}` has no default value")
            }
            Self::PolicyMismatch {
                union,
                declared,
                requested,
            } => write!(
                f,
                "union `{union}` declares the {declared} assignment policy, not {requested}"
            ),
            Self::MissingCapability {
                type_name,
                capability,
            } => write!(
                f,
                "`{type_name}` declares a {capability} shape but its value does not provide it"
            ),
            Self::ShapeMismatch { expected, got } => {
                write!(f, "pattern expects {expected}, got {got}")
            }
            Self::Custom { message } => write!(f, "{message}"),
        }
    }
}

/// Evaluation error.
#[derive(Clone, Debug)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Human-readable message; equals `kind.to_string()` for factory-built errors.
    pub message: String,
    /// Pattern or arm the error is attributed to, when known.
    pub span: Option<Span>,
}

impl EvalError {
    /// Create an error with just a message (`Custom` kind).
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        EvalError {
            kind: EvalErrorKind::Custom {
                message: message.clone(),
            },
            message,
            span: None,
        }
    }

    /// Create an error from a structured kind.
    pub fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        EvalError {
            kind,
            message,
            span: None,
        }
    }

    /// Attach a source span.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Whether this is the expression-form exhaustion failure.
    #[inline]
    pub fn is_no_match(&self) -> bool {
        matches!(self.kind, EvalErrorKind::NoMatch)
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EvalError {}

// Match evaluation

#[cold]
pub fn no_match() -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoMatch)
}

// Tagged unions

#[cold]
pub fn valueless(union: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Valueless {
        union: union.to_string(),
    })
}

#[cold]
pub fn wrong_alternative(expected: &str, active: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::WrongAlternative {
        expected: expected.to_string(),
        active: active.to_string(),
    })
}

#[cold]
pub fn unknown_alternative(union: &str, alternative: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownAlternative {
        union: union.to_string(),
        alternative: alternative.to_string(),
    })
}

#[cold]
pub fn payload_type_mismatch(alternative: &str, expected: &str, got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::PayloadTypeMismatch {
        alternative: alternative.to_string(),
        expected: expected.to_string(),
        got: got.to_string(),
    })
}

#[cold]
pub fn not_a_union(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotAUnion {
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn unknown_constant(enum_name: &str, constant: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownConstant {
        enum_name: enum_name.to_string(),
        constant: constant.to_string(),
    })
}

#[cold]
pub fn not_default_constructible(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotDefaultConstructible {
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn policy_mismatch(union: &str, declared: &'static str, requested: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::PolicyMismatch {
        union: union.to_string(),
        declared,
        requested,
    })
}

// Extension protocol

#[cold]
pub fn missing_capability(type_name: &str, capability: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MissingCapability {
        type_name: type_name.to_string(),
        capability,
    })
}

// Matching

#[cold]
pub fn shape_mismatch(expected: &str, got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ShapeMismatch {
        expected: expected.to_string(),
        got: got.to_string(),
    })
}

#[cfg(test)]
mod tests;
