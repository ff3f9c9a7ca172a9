//! Assignable union storage and the three assignment-failure policies.
//!
//! A `UnionCell<P>` is a mutable slot holding a value of one union type.
//! Whole-value assignment replaces the active alternative and payload in one
//! step. When building the new value fails part-way, `P` decides what the
//! cell holds afterwards:
//!
//! | Policy            | After a failed `assign_with`                        |
//! |-------------------|-----------------------------------------------------|
//! | `Propagate`       | valueless; the error is returned                    |
//! | `Abort`           | the process is terminated                           |
//! | `FallbackToEmpty` | the declared `empty` alternative; reported, not raised |
//!
//! The policy is a type parameter, so the reachable states are fixed at
//! compile time: only a `UnionCell<Propagate>` can ever be valueless.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use lv_types::{AssignPolicyKind, TypeId, TypeRegistry, UnionDef};

use crate::errors::{not_default_constructible, policy_mismatch, shape_mismatch, valueless, EvalError};
use crate::value::{ActiveAlternative, UnionType, UnionValue, Value};

mod private {
    pub trait Sealed {}
}

/// What a failed assignment leaves behind.
#[derive(Debug)]
pub enum Recovery {
    /// The cell stays valueless and the error goes to the caller.
    Valueless(EvalError),
    /// The cell holds this value; the failure is reported as an outcome.
    Holding(UnionValue, EvalError),
}

/// Compile-time assignment-failure policy of a `UnionCell`.
pub trait AssignPolicy: private::Sealed {
    /// Name matching `AssignPolicyKind::label`.
    const LABEL: &'static str;

    /// Whether a union declared with `kind` may use this policy.
    fn admits(kind: &AssignPolicyKind) -> bool;

    /// Value to recover to, computed once when the cell is created.
    fn prepare(_registry: &TypeRegistry, _def: &Arc<UnionDef>) -> Result<Option<UnionValue>, EvalError> {
        Ok(None)
    }

    /// Decide what the cell holds after building the new value failed.
    fn recover(def: &UnionDef, fallback: Option<&UnionValue>, error: EvalError) -> Recovery;
}

/// Leave the union valueless and return the error.
#[derive(Copy, Clone, Debug, Default)]
pub struct Propagate;

/// Terminate the process.
#[derive(Copy, Clone, Debug, Default)]
pub struct Abort;

/// Switch to the declared empty alternative.
#[derive(Copy, Clone, Debug, Default)]
pub struct FallbackToEmpty;

impl private::Sealed for Propagate {}
impl private::Sealed for Abort {}
impl private::Sealed for FallbackToEmpty {}

impl AssignPolicy for Propagate {
    const LABEL: &'static str = "propagate";

    fn admits(kind: &AssignPolicyKind) -> bool {
        matches!(kind, AssignPolicyKind::Propagate)
    }

    fn recover(_def: &UnionDef, _fallback: Option<&UnionValue>, error: EvalError) -> Recovery {
        Recovery::Valueless(error)
    }
}

impl AssignPolicy for Abort {
    const LABEL: &'static str = "abort";

    fn admits(kind: &AssignPolicyKind) -> bool {
        matches!(kind, AssignPolicyKind::Abort)
    }

    fn recover(def: &UnionDef, _fallback: Option<&UnionValue>, error: EvalError) -> Recovery {
        tracing::error!(
            union = ?def.name,
            error = %error,
            "assignment failed under the abort policy; terminating"
        );
        std::process::abort()
    }
}

impl AssignPolicy for FallbackToEmpty {
    const LABEL: &'static str = "fallback-to-empty";

    fn admits(kind: &AssignPolicyKind) -> bool {
        matches!(kind, AssignPolicyKind::FallbackToEmpty { .. })
    }

    fn prepare(registry: &TypeRegistry, def: &Arc<UnionDef>) -> Result<Option<UnionValue>, EvalError> {
        let Some(index) = def.empty_index() else {
            return Err(not_default_constructible(registry.name_str(def.name)));
        };
        UnionType::new(registry, def.ty)?
            .default_alternative(index)
            .map(Some)
    }

    fn recover(def: &UnionDef, fallback: Option<&UnionValue>, error: EvalError) -> Recovery {
        match fallback {
            Some(empty) => {
                tracing::debug!(union = ?def.name, error = %error, "assignment fell back to empty");
                Recovery::Holding(empty.clone(), error)
            }
            // `prepare` always supplies the fallback for this policy.
            None => Recovery::Valueless(error),
        }
    }
}

/// Result of a successful (or recovered) assignment.
#[derive(Debug)]
pub enum AssignOutcome {
    /// The new value is in place.
    Assigned,
    /// Building the new value failed; the cell holds the empty alternative.
    FellBackToEmpty { cause: EvalError },
}

impl AssignOutcome {
    #[inline]
    pub fn is_assigned(&self) -> bool {
        matches!(self, AssignOutcome::Assigned)
    }
}

/// Mutable storage for one value of a union type.
pub struct UnionCell<P: AssignPolicy> {
    def: Arc<UnionDef>,
    name: &'static str,
    /// `None` only while valueless.
    current: Option<UnionValue>,
    fallback: Option<UnionValue>,
    _policy: PhantomData<P>,
}

impl<P: AssignPolicy> UnionCell<P> {
    /// Create a cell holding `initial`.
    ///
    /// Fails if the union's declared policy is not `P`.
    pub fn new(registry: &TypeRegistry, initial: UnionValue) -> Result<Self, EvalError> {
        let def = Arc::clone(initial.def());
        if !P::admits(&def.policy) {
            return Err(policy_mismatch(
                registry.name_str(def.name),
                def.policy.label(),
                P::LABEL,
            ));
        }
        let fallback = P::prepare(registry, &def)?;
        Ok(UnionCell {
            name: registry.name_str(def.name),
            def,
            current: Some(initial),
            fallback,
            _policy: PhantomData,
        })
    }

    /// Create a cell holding the union's default value.
    pub fn with_default(registry: &TypeRegistry, ty: TypeId) -> Result<Self, EvalError> {
        Self::new(registry, UnionValue::default_for(registry, ty)?)
    }

    #[inline]
    pub fn ty(&self) -> TypeId {
        self.def.ty
    }

    /// Whether a failed assignment left the cell without a value.
    #[inline]
    pub fn is_valueless(&self) -> bool {
        self.current.is_none()
    }

    /// The held value.
    pub fn get(&self) -> Result<&UnionValue, EvalError> {
        self.current
            .as_ref()
            .ok_or_else(|| valueless(self.name))
    }

    /// The held value as a `Value`, for matching.
    pub fn to_value(&self) -> Result<Value, EvalError> {
        self.get().map(|u| Value::Union(u.clone()))
    }

    /// Discriminator and name of the active alternative.
    ///
    /// Fails only when valueless.
    pub fn active_alternative(&self) -> Result<ActiveAlternative, EvalError> {
        self.get().map(UnionValue::active_alternative)
    }

    /// The payload, if `alternative` is active.
    pub fn payload_as(&self, registry: &TypeRegistry, alternative: &str) -> Result<&Value, EvalError> {
        self.get()?.payload_as(registry, alternative)
    }

    /// Replace the held value with an already-built one.
    ///
    /// Nothing can fail part-way, so the policy is not involved. A value of
    /// a different union type is rejected and the cell is left unchanged.
    pub fn assign(&mut self, value: UnionValue) -> Result<(), EvalError> {
        self.check_type(&value)?;
        self.current = Some(value);
        Ok(())
    }

    /// Release the held value, then build and store a new one.
    ///
    /// If `build` fails (or yields a value of another union type) the
    /// policy decides the outcome.
    pub fn assign_with<F>(&mut self, build: F) -> Result<AssignOutcome, EvalError>
    where
        F: FnOnce() -> Result<UnionValue, EvalError>,
    {
        self.current = None;
        let built = build().and_then(|value| self.check_type(&value).map(|()| value));
        match built {
            Ok(value) => {
                self.current = Some(value);
                Ok(AssignOutcome::Assigned)
            }
            Err(error) => match P::recover(&self.def, self.fallback.as_ref(), error) {
                Recovery::Valueless(error) => {
                    tracing::debug!(union = self.name, "assignment left union valueless");
                    Err(error)
                }
                Recovery::Holding(value, cause) => {
                    self.current = Some(value);
                    Ok(AssignOutcome::FellBackToEmpty { cause })
                }
            },
        }
    }

    fn check_type(&self, value: &UnionValue) -> Result<(), EvalError> {
        if value.ty() == self.def.ty {
            Ok(())
        } else {
            Err(shape_mismatch(
                &format!("a value of union `{}`", self.name),
                &format!("a value of union {:?}", value.def().name),
            ))
        }
    }
}

impl<P: AssignPolicy> fmt::Debug for UnionCell<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnionCell")
            .field("union", &self.name)
            .field("policy", &P::LABEL)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}
