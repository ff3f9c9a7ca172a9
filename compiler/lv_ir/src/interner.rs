//! String interner for identifiers.
//!
//! Interned strings are leaked to `'static` so lookups can hand out plain
//! `&str` without holding the lock.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Name;

/// Error when interning a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternError {
    /// More than `u32::MAX` distinct strings.
    Overflow { count: usize },
}

impl fmt::Display for InternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InternError::Overflow { count } => write!(
                f,
                "interner exceeded capacity: {count} strings, max is {}",
                u32::MAX
            ),
        }
    }
}

impl std::error::Error for InternError {}

struct Table {
    map: FxHashMap<&'static str, Name>,
    strings: Vec<&'static str>,
}

/// Thread-safe string interner.
pub struct StringInterner {
    table: RwLock<Table>,
}

impl StringInterner {
    /// Create an interner holding only the empty string (`Name::EMPTY`).
    pub fn new() -> Self {
        let empty: &'static str = "";
        let mut map = FxHashMap::default();
        map.insert(empty, Name::EMPTY);
        StringInterner {
            table: RwLock::new(Table {
                map,
                strings: vec![empty],
            }),
        }
    }

    /// Try to intern a string, returning its `Name` or an error on overflow.
    pub fn try_intern(&self, s: &str) -> Result<Name, InternError> {
        if let Some(&name) = self.table.read().map.get(s) {
            return Ok(name);
        }

        let mut table = self.table.write();
        // Another writer may have won the race between the two locks.
        if let Some(&name) = table.map.get(s) {
            return Ok(name);
        }

        let raw = u32::try_from(table.strings.len()).map_err(|_| InternError::Overflow {
            count: table.strings.len(),
        })?;
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let name = Name::from_raw(raw);
        table.strings.push(leaked);
        table.map.insert(leaked, name);
        Ok(name)
    }

    /// Intern a string, returning its `Name`.
    ///
    /// # Panics
    /// Panics if more than `u32::MAX` strings are interned.
    pub fn intern(&self, s: &str) -> Name {
        self.try_intern(s).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Look up the string for a `Name`.
    ///
    /// Returns `""` for a `Name` this interner never produced.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.table
            .read()
            .strings
            .get(name.index())
            .copied()
            .unwrap_or("")
    }

    /// Number of interned strings (including the empty string).
    pub fn len(&self) -> usize {
        self.table.read().strings.len()
    }

    /// Always `false`: the empty string is pre-interned.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringInterner")
            .field("len", &self.len())
            .finish()
    }
}

/// Read-only name resolution.
///
/// Lets diagnostics and `Display` impls render names without depending on
/// the concrete interner type.
pub trait StringLookup {
    /// Resolve a `Name` to its string.
    fn lookup(&self, name: Name) -> &str;
}

impl StringLookup for StringInterner {
    fn lookup(&self, name: Name) -> &str {
        StringInterner::lookup(self, name)
    }
}

/// Cheaply clonable handle to a shared `StringInterner`.
#[derive(Clone, Default, Debug)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    /// Create a new shared interner.
    pub fn new() -> Self {
        SharedInterner(Arc::new(StringInterner::new()))
    }
}

impl std::ops::Deref for SharedInterner {
    type Target = StringInterner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl StringLookup for SharedInterner {
    fn lookup(&self, name: Name) -> &str {
        self.0.lookup(name)
    }
}

#[cfg(test)]
mod tests;
