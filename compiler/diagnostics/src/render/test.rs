use crate::{Diagnostic, Severity, UntaggedDiagnostic, render::render};
use span::{FileName, Location, SourceMap, span};
use utility::{
    assert_text_eq,
    paint::{ColorChoice, paint_to_string},
};

#[track_caller]
fn assert_rendered(diagnostic: &UntaggedDiagnostic, map: &SourceMap, expected: &str) {
    let actual = paint_to_string(|painter| render(diagnostic, Some(map), painter), ColorChoice::Never);

    assert_text_eq(&actual, expected);
}

#[test]
fn diagnostic_without_location() {
    let map = SourceMap::default();
    let diagnostic = Diagnostic::error()
        .class("io")
        .message("could not read ‘main.food’")
        .untagged();

    assert_rendered(&diagnostic, &map, "error[io]: could not read ‘main.food’\n");
}

#[test]
fn diagnostic_without_class() {
    let map = SourceMap::default();
    let diagnostic = UntaggedDiagnostic::new(Severity::Warning, "", "something is off");

    assert_rendered(&diagnostic, &map, "warning: something is off\n");
}

#[test]
fn context_window_ends_at_the_diagnostic_line() {
    let mut map = SourceMap::default();
    let file = map.add(
        FileName::Path("lib.food".into()),
        "fn f() {\n    var x: int = 1;\n    x = x + y;\n}\n",
    );
    let diagnostic = Diagnostic::error()
        .class("undefined-name")
        .message("the name ‘y’ is not defined")
        .at(Location::new(file, span(41, 42)))
        .note("names have to be declared before they are used")
        .untagged();

    assert_rendered(
        &diagnostic,
        &map,
        "\
lib.food:3:13: error[undefined-name]: the name ‘y’ is not defined
fn f() {
    var x: int = 1;
    x = x + y;
~~~~~~~~~~~~^
note: names have to be declared before they are used
",
    );
}

#[test]
fn context_window_is_shorter_at_the_start_of_the_file() {
    let mut map = SourceMap::default();
    let file = map.add_str("fn g( {}\n");
    let diagnostic = Diagnostic::error()
        .class("syntax")
        .message("found ‘{’ but expected a parameter")
        .at(Location::new(file, span(6, 7)))
        .untagged();

    assert_rendered(
        &diagnostic,
        &map,
        "\
⟨anonymous⟩:1:7: error[syntax]: found ‘{’ but expected a parameter
fn g( {}
~~~~~~^
",
    );
}

#[test]
fn caret_at_the_first_column() {
    let mut map = SourceMap::default();
    let file = map.add_str("a\nb\nc\nd\n");
    let diagnostic = Diagnostic::warning()
        .class("unused-attribute")
        .message("unused attribute ‘frob’")
        .at(Location::new(file, span(6, 7)))
        .untagged();

    assert_rendered(
        &diagnostic,
        &map,
        "\
⟨anonymous⟩:4:1: warning[unused-attribute]: unused attribute ‘frob’
b
c
d
^
",
    );
}
