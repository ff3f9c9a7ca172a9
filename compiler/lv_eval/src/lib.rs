//! lvariant evaluator: the `inspect` construct.
//!
//! This crate provides:
//! - `Environment`: scope stack that actions and guards read bindings from
//! - `InspectBuilder` / `Inspect`: statement and expression forms of
//!   `inspect`, over one or several subjects
//! - `MatchState`: the evaluator's explicit state machine
//!
//! # Example
//!
//! ```text
//! inspect (cmd) {
//!     set_score s => score = s;
//!     fire_missile _ => launch();
//! }
//! ```
//!
//! is built as
//!
//! ```text
//! InspectBuilder::new(command)
//!     .arm(Pattern::alternative(set_score, Pattern::bind(s)), |env| ...)
//!     .arm(Pattern::alternative(fire_missile, Pattern::wildcard()), |env| ...)
//!     .build(&mut registry)?
//!     .execute(&[cmd], &mut env)?
//! ```

mod environment;
mod inspect;

use std::sync::Once;

pub use environment::{AssignError, Environment, Mutability};
pub use inspect::{Action, Arm, Inspect, InspectBuilder, MatchState, StmtOutcome};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enable with `RUST_LOG=lv_eval=trace` to see
/// every `inspect` state transition, or `RUST_LOG=lv_patterns=debug` for
/// checker and assignment events.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
