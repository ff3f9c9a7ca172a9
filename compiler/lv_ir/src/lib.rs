//! lvariant IR - identifiers and source locations.
//!
//! This crate holds the small, copyable handles shared by every other crate
//! in the workspace:
//! - `Name`: interned identifier (alternative names, field names, bindings)
//! - `StringInterner` / `SharedInterner`: the table behind `Name`
//! - `Span`: byte range used to point diagnostics at a pattern
//!
//! Every handle is `Copy + Eq + Hash` so it can be used as a map key and
//! compared in O(1).

mod interner;
mod name;
mod span;

pub use interner::{InternError, SharedInterner, StringInterner, StringLookup};
pub use name::Name;
pub use span::{Span, SpanError};
