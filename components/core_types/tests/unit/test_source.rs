//! Unit tests for SourcePosition

use core_types::SourcePosition;

#[test]
fn test_default_position() {
    let pos = SourcePosition::default();
    assert_eq!(pos.offset, 0);
}

#[test]
fn test_from_offset_after_newline() {
    let src = "void A() {}\nvoid B() {}";
    let pos = SourcePosition::from_offset(src, 12);
    assert_eq!(pos.line, 2);
    assert_eq!(pos.column, 1);
}

#[test]
fn test_from_offset_counts_chars_not_bytes() {
    let src = "\"é\" x";
    let pos = SourcePosition::from_offset(src, 5);
    assert_eq!(pos.column, 5);
}

#[test]
fn test_positions_are_copy_and_hashable() {
    use std::collections::HashSet;
    let a = SourcePosition::new(1, 1, 0);
    let b = a;
    let set: HashSet<_> = [a, b].into_iter().collect();
    assert_eq!(set.len(), 1);
}
