use pretty_assertions::assert_eq;

use super::*;

#[test]
fn factory_message_matches_kind() {
    let err = wrong_alternative("fire_missile", "set_score");
    assert_eq!(
        err.kind,
        EvalErrorKind::WrongAlternative {
            expected: "fire_missile".to_string(),
            active: "set_score".to_string(),
        }
    );
    assert_eq!(err.message, err.kind.to_string());
    assert_eq!(
        err.to_string(),
        "alternative `fire_missile` requested but `set_score` is active"
    );
}

#[test]
fn no_match_is_distinct_from_valueless() {
    assert!(no_match().is_no_match());
    assert!(!valueless("Command").is_no_match());
    assert_eq!(
        valueless("Command").to_string(),
        "union `Command` is valueless after a failed assignment"
    );
}

#[test]
fn custom_errors_keep_their_message() {
    let err = EvalError::new("guard failed to evaluate").with_span(Span::new(2, 9));
    assert_eq!(
        err.kind,
        EvalErrorKind::Custom {
            message: "guard failed to evaluate".to_string()
        }
    );
    assert_eq!(err.span, Some(Span::new(2, 9)));
}

#[test]
fn policy_mismatch_names_both_policies() {
    let err = policy_mismatch("Slot", "fallback-to-empty", "abort");
    assert_eq!(
        err.message,
        "union `Slot` declares the fallback-to-empty assignment policy, not abort"
    );
}

#[test]
fn errors_are_std_errors() {
    fn takes_error(_: &dyn std::error::Error) {}
    takes_error(&no_match());
}
