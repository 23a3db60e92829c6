use crate::{Conjunction, ListingExt, QuoteExt, difference, pluralize};

#[test]
fn listing_no_elements() {
    assert_eq!(std::iter::empty::<u8>().list(Conjunction::And), "");
}

#[test]
fn listing_one_element() {
    assert_eq!(std::iter::once("r1").list(Conjunction::Or), "r1");
}

#[test]
fn listing_three_elements() {
    assert_eq!(["int", "uint", "char"].into_iter().list(Conjunction::Or), "int, uint or char");
}

#[test]
fn listing_many_elements() {
    assert_eq!(
        (1..=5).list(Conjunction::And),
        "1, 2, 3, 4 and 5"
    );
}

#[test]
fn pluralization() {
    assert_eq!(pluralize!(0, "error"), "errors");
    assert_eq!(pluralize!(1, "error"), "error");
    assert_eq!(pluralize!(2, "warning"), "warnings");
}

#[test]
fn quoting() {
    assert_eq!("main".quote(), "‘main’");
}

#[test]
fn difference_marks_changed_lines() {
    let rendered = difference("alpha\nbeta\ngamma", "alpha\nbeta2\ngamma");

    assert!(rendered.contains("- beta\n"));
    assert!(rendered.contains("+ beta2\n"));
    assert!(rendered.contains("  alpha\n"));
}
