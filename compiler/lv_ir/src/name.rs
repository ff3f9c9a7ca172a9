//! Interned identifier.

use std::fmt;

/// Interned identifier.
///
/// A plain index into the `StringInterner` that produced it. Two `Name`s
/// from the same interner are equal iff their strings are equal.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);

    /// Create from a raw table index.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }

    /// Get the raw table index.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Table index as `usize`.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

#[cfg(test)]
mod tests;
