use crate::{Class, Diagnostic, Engine, Policy, Severity, Subseverity, error::Health};
use span::{Location, SourceMap, span};
use std::rc::Rc;

#[test]
fn builder_records_every_part() {
    let mut map = SourceMap::default();
    let file = map.add_str("fn f();");
    let location = Location::new(file, span(3, 4));

    let diagnostic = Diagnostic::warning()
        .class(Class::Deprecated)
        .message("the function ‘f’ is deprecated")
        .at(location)
        .help("use ‘g’ instead")
        .untagged();

    assert_eq!(diagnostic.severity, Severity::Warning);
    assert_eq!(diagnostic.class, "deprecated");
    assert_eq!(diagnostic.location, Some(location));
    assert_eq!(diagnostic.subdiagnostics.len(), 1);
    assert_eq!(diagnostic.subdiagnostics[0].severity, Subseverity::Help);
}

#[test]
fn reporting_an_error_yields_a_witness() {
    let engine = Engine::new(Policy::default(), Rc::default());
    let mut health = Health::Untainted;

    let error = Diagnostic::error().class(Class::Syntax).message("unexpected end of input").report(&engine);
    health.taint(error);

    assert!(health.is_tainted());
    assert!(engine.errors_encountered());
}

#[test]
fn class_names_are_dash_cased() {
    assert_eq!(Class::UnusedAttribute.name(), "unused-attribute");
    assert_eq!(Class::Io.name(), "io");
    assert_eq!(Severity::Fatal.name(), "fatal");
}
