//! Type handle.
//!
//! All types live in the `TypeRegistry` and are referenced by a 32-bit
//! index. Type equality is index equality.

use std::fmt;

/// A 32-bit index into the type registry.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    // === Primitive Types (indices 0-4) ===

    /// The `int` type (64-bit signed integer).
    pub const INT: Self = Self(0);
    /// The `bool` type.
    pub const BOOL: Self = Self(1);
    /// The `char` type (Unicode scalar value).
    pub const CHAR: Self = Self(2);
    /// The `str` type (UTF-8 string).
    pub const STR: Self = Self(3);
    /// The unit type `()`, the payload of marker alternatives.
    pub const UNIT: Self = Self(4);

    /// Number of pre-registered primitive types.
    pub const PRIMITIVE_COUNT: u32 = 5;

    /// Create an index from a raw u32 value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Registry slot for this type.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Check if this is a primitive type.
    #[inline]
    pub const fn is_primitive(self) -> bool {
        self.0 < Self::PRIMITIVE_COUNT
    }

    /// Human-readable name for primitive types.
    #[inline]
    pub const fn primitive_name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("int"),
            1 => Some("bool"),
            2 => Some("char"),
            3 => Some("str"),
            4 => Some("()"),
            _ => None,
        }
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.primitive_name() {
            Some(name) => write!(f, "TypeId({name})"),
            None => write!(f, "TypeId({})", self.0),
        }
    }
}
