//! Environment for `inspect` actions and guards.
//!
//! A stack of scopes owned by value. The bottom scope holds globals and is
//! never popped. Each matched arm pushes a scope for its pattern bindings and
//! pops it when the action finishes, so bindings never outlive the arm that
//! made them. Lookup and assignment walk the stack from the top down; inner
//! definitions shadow outer ones.

use std::fmt;

use rustc_hash::FxHashMap;

use lv_ir::Name;
use lv_patterns::{BindingLookup, Value};

/// Whether a variable binding can be reassigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutability {
    Mutable,
    /// Pattern bindings are always immutable.
    Immutable,
}

/// Error returned by `Environment::assign`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignError {
    /// The nearest definition of the name is immutable.
    Immutable,
    /// No scope defines the name.
    Undefined,
}

impl fmt::Display for AssignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignError::Immutable => f.write_str("cannot assign to an immutable binding"),
            AssignError::Undefined => f.write_str("cannot assign to an undefined name"),
        }
    }
}

impl std::error::Error for AssignError {}

#[derive(Clone, Debug)]
struct Binding {
    value: Value,
    mutability: Mutability,
}

type Scope = FxHashMap<Name, Binding>;

/// Scope stack, current scope at the top.
pub struct Environment {
    /// Never empty; `scopes[0]` is the global scope.
    scopes: Vec<Scope>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            scopes: vec![Scope::default()],
        }
    }

    /// Number of live scopes, globals included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    #[inline]
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Pop the current scope. The global scope is never popped.
    #[inline]
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Define a variable in the current scope, shadowing outer definitions.
    pub fn define(&mut self, name: Name, value: Value, mutability: Mutability) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, Binding { value, mutability });
        }
    }

    /// Define an immutable variable in the global scope.
    pub fn define_global(&mut self, name: Name, value: Value) {
        if let Some(global) = self.scopes.first_mut() {
            global.insert(
                name,
                Binding {
                    value,
                    mutability: Mutability::Immutable,
                },
            );
        }
    }

    pub fn lookup(&self, name: Name) -> Option<Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name))
            .map(|binding| binding.value.clone())
    }

    /// Reassign the nearest definition of `name`.
    pub fn assign(&mut self, name: Name, value: Value) -> Result<(), AssignError> {
        let binding = self
            .scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(&name))
            .ok_or(AssignError::Undefined)?;
        if binding.mutability == Mutability::Immutable {
            return Err(AssignError::Immutable);
        }
        binding.value = value;
        Ok(())
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("depth", &self.depth())
            .finish_non_exhaustive()
    }
}

impl BindingLookup for Environment {
    fn lookup(&self, name: Name) -> Option<Value> {
        Environment::lookup(self, name)
    }
}
