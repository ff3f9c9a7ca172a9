use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_intern_dedup() {
    let interner = StringInterner::new();
    let a = interner.intern("set_score");
    let b = interner.intern("set_score");
    let c = interner.intern("fire_missile");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(interner.lookup(a), "set_score");
    assert_eq!(interner.lookup(c), "fire_missile");
}

#[test]
fn test_empty_preinterned() {
    let interner = StringInterner::new();
    assert_eq!(interner.intern(""), Name::EMPTY);
    assert_eq!(interner.len(), 1);
    assert!(!interner.is_empty());
}

#[test]
fn test_unknown_name_resolves_empty() {
    let interner = StringInterner::new();
    assert_eq!(interner.lookup(Name::from_raw(99)), "");
}

#[test]
fn test_shared_interner_clones_share_table() {
    let shared = SharedInterner::new();
    let other = shared.clone();
    let name = shared.intern("hitpoints");
    assert_eq!(other.lookup(name), "hitpoints");
    assert_eq!(StringLookup::lookup(&other, name), "hitpoints");
}

#[test]
fn test_concurrent_interning() {
    let shared = SharedInterner::new();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let interner = shared.clone();
            std::thread::spawn(move || interner.intern("coins"))
        })
        .collect();
    let names: Vec<Name> = handles
        .into_iter()
        .map(|h| h.join().unwrap_or_else(|_| panic!("interning thread panicked")))
        .collect();
    assert!(names.windows(2).all(|w| w[0] == w[1]));
}
