//! Stack growth for deep recursion.
//!
//! Patterns and values nest as deeply as the data they describe: a long
//! linked list behind owning pointers gives a dereference chain as long as
//! the list. Recursive checking, matching and conformance walks go through
//! [`ensure_sufficient_stack`], which grows the stack on native targets when
//! less than the red zone remains.

/// Stack left before growing (100KB).
const RED_ZONE: usize = 100 * 1024;

/// Size of each growth (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if it is nearly exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deep_recursion_does_not_overflow() {
        fn depth(n: u64) -> u64 {
            ensure_sufficient_stack(|| if n == 0 { 0 } else { depth(n - 1) + 1 })
        }
        assert_eq!(depth(100_000), 100_000);
    }

    #[test]
    fn returns_closure_result() {
        let result: Result<i32, &str> = ensure_sufficient_stack(|| Ok(7));
        assert_eq!(result, Ok(7));
    }
}
