//! Type declarations for the lvariant pattern engine.
//!
//! # Architecture
//!
//! ```text
//! TypeRegistry (all types, referenced by TypeId)
//!     ├── primitives (int, bool, char, str, unit), pre-registered
//!     ├── nominal types: Enum, Union, Aggregate, Extension
//!     └── structural types: Tuple, Pointer (interned by shape)
//! ```
//!
//! Nominal types are declared in two steps so they can refer to themselves
//! through pointers: `declare` reserves a `TypeId`, `define_*` supplies the
//! body. `TypeRegistry::validate` reports every declaration error as a
//! `Diagnostic`; nothing downstream should run against an invalid registry.

mod defs;
mod format;
mod idx;
mod policy;
mod registry;
mod validate;

pub use defs::{
    AggregateDef, AggregateShape, AlternativeDef, EnumDef, ExtensionDef, FieldDef, PieceDef,
    UnionDef, VariantAlternativeDef, VariantShape, Visibility,
};
pub use idx::TypeId;
pub use policy::AssignPolicyKind;
pub use registry::{TypeEntry, TypeKind, TypeRegistry};
pub use validate::ambiguous_selector;
