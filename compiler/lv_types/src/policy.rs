//! Assignment failure policy of a union type.

use lv_ir::Name;

/// What a union does when building the payload of a new value fails
/// part-way through an assignment.
///
/// Chosen once, by the union's author, at declaration time. The runtime
/// counterpart is the `AssignPolicy` type parameter of `UnionCell`; a cell
/// can only be created for a union whose declared kind matches it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum AssignPolicyKind {
    /// The union becomes valueless; the failure is returned to the caller.
    #[default]
    Propagate,
    /// The process is terminated; no partial state is ever observable.
    Abort,
    /// The failure is swallowed and the union holds the `empty` alternative.
    FallbackToEmpty {
        /// Alternative to fall back to; must be declared on the union and
        /// have a default-constructible payload.
        empty: Name,
    },
}

impl AssignPolicyKind {
    /// Short name used in diagnostics and log events.
    pub fn label(&self) -> &'static str {
        match self {
            AssignPolicyKind::Propagate => "propagate",
            AssignPolicyKind::Abort => "abort",
            AssignPolicyKind::FallbackToEmpty { .. } => "fallback-to-empty",
        }
    }
}
