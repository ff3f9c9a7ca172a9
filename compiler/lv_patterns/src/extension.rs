//! Extension protocol: how encapsulated host types opt into matching.
//!
//! A host type declares its shape on the registry (`AggregateShape`,
//! `VariantShape`) and implements the matching capability trait here. The
//! shape is what patterns are checked against; the trait is only consulted
//! while matching, and only for indices and discriminators the shape
//! declared.

use std::fmt;

use crate::Value;

/// Aggregate extraction: expose an ordered list of pieces.
///
/// Piece `index` must have the type declared at that position of the
/// type's `AggregateShape`. The matcher never asks for an index outside the
/// shape, and never mutates the object.
pub trait AggregateExtract {
    /// The piece at `index`, or `None` if the object cannot produce it.
    fn piece(&self, index: usize) -> Option<Value>;
}

/// Variant extraction: expose a discriminator plus one payload per
/// alternative.
pub trait VariantExtract {
    /// Discriminator of the currently active alternative.
    fn discriminator(&self) -> i64;

    /// Payload of the alternative with this discriminator.
    ///
    /// Only ever called with the value `discriminator` just returned.
    fn alternative(&self, discriminator: i64) -> Option<Value>;
}

/// A host object wrapped in an `ExtensionValue`.
///
/// Both capabilities are optional; the defaults report neither. A type
/// whose shape declares a capability the object does not provide fails at
/// match time with `EvalErrorKind::MissingCapability`.
pub trait ExtensionObject: fmt::Debug + Send + Sync {
    fn as_aggregate(&self) -> Option<&dyn AggregateExtract> {
        None
    }

    fn as_variant(&self) -> Option<&dyn VariantExtract> {
        None
    }
}
