//! Diagnostic system for declaration-time errors.
//!
//! Every static error (a malformed union declaration, a pattern that does
//! not fit the type it is matched against) is reported as a `Diagnostic`:
//! - Error code for searchability
//! - Clear message (what went wrong)
//! - Primary span (where it went wrong)
//! - Notes and suggestions (how to fix)
//!
//! Runtime failures (no match, valueless union) are not diagnostics; they
//! live in `lv_patterns::EvalError`.

mod diagnostic;
mod error_code;

pub use diagnostic::{Diagnostic, Label};
pub use error_code::ErrorCode;
