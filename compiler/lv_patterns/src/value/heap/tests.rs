use super::*;

#[test]
fn heap_deref() {
    let h = Heap::new(42i64);
    assert_eq!(*h, 42);
}

#[test]
fn heap_clone_shares_allocation() {
    let h1 = Heap::new(vec![1, 2, 3]);
    let h2 = h1.clone();
    assert_eq!(*h1, *h2);
    assert!(Heap::ptr_eq(&h1, &h2));
}

#[test]
fn heap_eq_is_structural() {
    let h1 = Heap::new("hello".to_string());
    let h2 = Heap::new("hello".to_string());
    let h3 = Heap::new("world".to_string());
    assert_eq!(h1, h2);
    assert_ne!(h1, h3);
}

#[test]
fn make_mut_copies_shared_contents() {
    let original = Heap::new(vec![1, 2, 3]);
    let mut copy = original.clone();
    copy.make_mut().push(4);

    assert_eq!(*original, vec![1, 2, 3]);
    assert_eq!(*copy, vec![1, 2, 3, 4]);
    assert!(!Heap::ptr_eq(&original, &copy));
}

#[test]
fn make_mut_reuses_unique_allocation() {
    let mut only = Heap::new(vec![1]);
    let before = std::ptr::from_ref(&*only);
    only.make_mut().push(2);
    assert_eq!(std::ptr::from_ref(&*only), before);
}
