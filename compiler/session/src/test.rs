use crate::{Session, UnstableOption, UnstableOptions};
use derivation::Elements;
use diagnostics::Diagnostic;
use span::{Location, span};
use std::str::FromStr;
use utility::{Atom, smallvec};

#[test]
fn reset_forgets_diagnostics_and_attributes() {
    let session = Session::test();
    let file = session.map_mut().add_str("@inline fn f();");
    let location = Location::new(file, span(0, 7));

    session.attributes().register(Atom::INLINE, smallvec![], location);
    let _ = Diagnostic::error().message("failure").at(location).report(session.engine());
    assert!(session.engine().errors_encountered());

    session.reset();

    assert!(!session.engine().errors_encountered());
    assert!(session.engine().active().is_empty());
    assert!(session.attributes().is_empty());
    assert_eq!(session.file(file).content(), "@inline fn f();");
}

#[test]
fn unstable_options_parse_from_dash_case() {
    let mut options = UnstableOptions::default();

    for name in ["emit-tree", "emit-lowered-tree"] {
        options.set(UnstableOption::from_str(name).unwrap());
    }

    assert_eq!(
        options,
        UnstableOptions { emit_tokens: false, emit_tree: true, emit_lowered_tree: true }
    );
    assert!(UnstableOption::from_str("emit_tree").is_err());
    assert_eq!(
        UnstableOption::elements().map(|option| option.name()).collect::<Vec<_>>(),
        ["emit-tokens", "emit-tree", "emit-lowered-tree", "help"]
    );
}
