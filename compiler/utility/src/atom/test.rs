use super::Atom;

#[test]
fn predefined_atoms_resolve_to_their_strings() {
    assert_eq!(Atom::DEPRECATED.to_str(), "deprecated");
    assert_eq!(Atom::from("inline"), Atom::INLINE);
    assert_eq!(Atom::SP.to_str(), "sp");
}

#[test]
fn interning_is_idempotent() {
    let first = Atom::from("frobnicate");
    let second = Atom::from(String::from("frobnicate"));

    assert_eq!(first, second);
    assert_ne!(first, Atom::from("frobnicated"));
}

#[test]
fn names_of_functions_are_interned_on_demand() {
    let main = Atom::from("main");

    assert_eq!(main.to_str(), "main");
    assert_eq!(Atom::from(String::from("main")), main);
}
