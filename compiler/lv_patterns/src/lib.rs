//! Runtime side of the lvariant pattern engine.
//!
//! This crate provides:
//! - Runtime values (`Value`, `Heap`, `UnionValue`, ...) with enforced `Arc` sharing
//! - Tagged-union storage (`UnionCell`) parameterized by an assignment policy
//! - The pattern AST, the static checker (`check_pattern`) and the matcher
//!   (`match_pattern`)
//! - The extension protocol for host types that opt into matching
//! - Runtime error types (`EvalError`, `EvalErrorKind`)
//!
//! # Architecture
//!
//! ```text
//! Pattern ──check_pattern(ty)──► CompiledPattern ──match_pattern(value)──► Bindings
//!                │                                       │
//!           Diagnostic                               EvalError
//! ```
//!
//! Checking is the only place a pattern can be rejected. A compiled pattern
//! either matches a conforming value or it does not; `EvalError` from the
//! matcher means the value did not have the type the pattern was checked
//! against, or a guard failed.

mod check;
pub mod errors;
mod extension;
mod matcher;
mod pattern;
mod stack;
mod union_cell;
mod value;

#[cfg(test)]
mod test_helpers;

pub use check::{check_pattern, CompiledPattern};
pub use errors::{EvalError, EvalErrorKind};
pub use extension::{AggregateExtract, ExtensionObject, VariantExtract};
pub use matcher::{match_pattern, Bindings};
pub use pattern::{BindingLookup, FieldPattern, Guard, Literal, NoBindings, Pattern, PatternKind};
pub use stack::ensure_sufficient_stack;
pub use union_cell::{
    Abort, AssignOutcome, AssignPolicy, FallbackToEmpty, Propagate, Recovery, UnionCell,
};
pub use value::{
    ActiveAlternative, AggregateValue, AlternativeCtor, EnumValue, ExtensionValue, Heap,
    UnionType, UnionValue, Value,
};
