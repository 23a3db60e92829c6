use crate::{Expand, O0, Pass, lower};
use ast::{StatementKind, Tree};
use session::Session;
use utility::assert_text_eq;

fn lowered(source: &str) -> (Tree, bool) {
    let session = Session::test();
    let mut tree = parser::parse_source(source, &session);
    let errors = analyzer::analyze(&mut tree, &session);
    lower(&mut tree, &session);
    (tree, errors)
}

#[track_caller]
fn assert_lowered_function(source: &str, index: usize, expected: &str) {
    let (tree, errors) = lowered(source);
    assert!(!errors);
    assert_text_eq(&tree.pretty_print(tree.functions()[index]), expected);
}

#[test]
fn expand_desugars_expressions() {
    assert_lowered_function(
        "\
fn f(x: int) -> int {
    var n = nameof(x);
    var s = sizeof(x) + sizeof([char; 3]);
    x++;
    x -= 2;
    for var i = 0; i < 3; i++ { ; }
    return x;
}",
        0,
        r#"function f(x: int) -> int
    block
        variable-init n: text
            text-literal "x" : text const
        variable-init s: uint
            add : uint const
                integer-literal 8 : uint const
                integer-literal 12 : uint const
        expression
            assign : int
                identifier x : int lvalue
                add : int
                    identifier x : int lvalue
                    integer-literal 1 : int const
        expression
            assign : int
                identifier x : int lvalue
                subtract : int
                    identifier x : int lvalue
                    integer-literal 2 : int const
        for [break, continue]
            less : bool #loop-condition
                identifier i : int lvalue
                integer-literal 3 : int const
            assign : int #loop-increment
                identifier i : int lvalue
                add : int
                    identifier i : int lvalue
                    integer-literal 1 : int const
            variable-init i: int
                integer-literal 0 : int const
            block
        return
            identifier x : int lvalue
"#,
    );
}

#[test]
fn expand_keeps_assignments_to_places() {
    assert_lowered_function(
        "fn f() { var a: [int; 2] = {1, 2}; a[0] += 1; var b = a[1]++; b = b; }",
        0,
        "\
function f()
    block
        variable-init a: [int; 2]
            initializer-list : [int; 2] const
                integer-literal 1 : int const
                integer-literal 2 : int const
        expression
            add-assign : int
                index : int lvalue
                    identifier a : [int; 2] lvalue
                    integer-literal 0 : int const
                integer-literal 1 : int const
        variable-init b: int
            post-increment : int
                index : int lvalue
                    identifier a : [int; 2] lvalue
                    integer-literal 1 : int const
        expression
            assign : int
                identifier b : int lvalue
                identifier b : int lvalue
        return
",
    );
}

#[test]
fn o0_removes_placeholders_and_completes_returns() {
    let source = "\
fn g(c: int) {
    switch c { case 1: ; default: ; ; }
    if c == 0 { return; }
}
fn h() { return; }
fn k() -> int { return 1; }
fn e();";

    assert_lowered_function(
        source,
        0,
        "\
function g(c: int)
    block
        switch [break, case]
            identifier c : int lvalue
            block
                case 1
                default
        if
            equal : bool
                identifier c : int lvalue
                integer-literal 0 : int const
            block
                return
        return
",
    );

    let (tree, _) = lowered(source);
    let [_, h, k, e] = tree.functions()[..] else { panic!() };

    for function in [h, k] {
        let body = tree.function(function).body.unwrap();
        let statements = &tree.statement(body).statements;
        assert_eq!(statements.len(), 1);
        assert_eq!(tree.statement(statements[0]).kind, StatementKind::Return);
    }
    assert_eq!(tree.function(e).body, None);
}

#[test]
fn erroneous_expressions_are_left_alone() {
    let (tree, errors) = lowered("fn f() { y++; var s = sizeof(z); }");
    assert!(errors);

    let output = tree.pretty_print(tree.root());
    assert!(output.contains("post-increment"), "{output}");
    assert!(output.contains("size-of"), "{output}");
}

#[test]
fn passes_run_in_order_on_their_own() {
    let session = Session::test();
    let mut tree = parser::parse_source("fn f() { var x = 1; x *= 2; ; }", &session);
    assert!(!analyzer::analyze(&mut tree, &session));

    let mut expand = Expand::default();
    assert_eq!(expand.name(), "expand");
    expand.run(&mut tree, &session);

    let output = tree.pretty_print(tree.root());
    assert!(output.contains("multiply : int"), "{output}");
    assert!(output.contains("placeholder"), "{output}");

    let mut o0 = O0::default();
    assert_eq!(o0.name(), "o0");
    o0.run(&mut tree, &session);

    let output = tree.pretty_print(tree.root());
    assert!(!output.contains("placeholder"), "{output}");
    assert!(output.ends_with("\n            return\n"), "{output}");
}
