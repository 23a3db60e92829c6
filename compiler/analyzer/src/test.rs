use crate::analyze;
use ast::{Binding, FunctionProperties, Label, StatementObject, Tree};
use session::Session;
use utility::{Atom, assert_text_eq};

fn analyze_source(source: &str) -> (Tree, Session, bool) {
    let session = Session::test();
    let mut tree = parser::parse_source(source, &session);
    assert_eq!(diagnostics(&session), Vec::<String>::new(), "the source does not parse");

    let errors = analyze(&mut tree, &session);
    (tree, session, errors)
}

fn diagnostics(session: &Session) -> Vec<String> {
    session
        .engine()
        .active()
        .iter()
        .map(|diagnostic| {
            format!("{} {}: {}", diagnostic.severity.name(), diagnostic.class, diagnostic.message)
        })
        .collect()
}

#[track_caller]
fn assert_diagnostics(source: &str, expected: &[&str]) {
    let (_, session, _) = analyze_source(source);
    assert_eq!(diagnostics(&session), expected);
}

#[test]
fn binds_names_and_types() {
    let (tree, session, errors) = analyze_source(
        "\
fn add(a: int, b: int) -> int { var sum = a + b; return sum; }
fn main() { var x: int = add(1, 2); x = x * 2; }",
    );

    assert!(!errors);
    assert_eq!(diagnostics(&session), Vec::<String>::new());

    let add = tree.functions()[0];
    assert_text_eq(
        &tree.pretty_print(add),
        "\
function add(a: int, b: int) -> int
    block
        variable-init sum: int
            add : int
                identifier a : int lvalue
                identifier b : int lvalue
        return
            identifier sum : int lvalue
",
    );

    let body = tree.function(add).body.unwrap();
    let [variable, return_] = tree.statement(body).statements[..] else { panic!() };
    let sum = tree.statement(return_).expressions[0];
    assert_eq!(tree.expression(sum).binding(), Some(Binding::Variable(variable)));
}

#[test]
fn names_are_declared_in_order() {
    assert_diagnostics(
        "fn f() { y = 1; var y = 2; }",
        &[
            "error undefined-name: cannot find ‘y’ in this scope",
            "warning unused-variable: the variable ‘y’ is never used",
        ],
    );
}

#[test]
fn block_scopes_end_with_their_block() {
    assert_diagnostics(
        "fn f() { { var inner = 1; inner = 2; } inner = 3; }",
        &["error undefined-name: cannot find ‘inner’ in this scope"],
    );
}

#[test]
fn duplicate_definitions() {
    assert_diagnostics(
        "fn f(a: int, a: int) {} fn f() { var x = 1; var x = 2; }",
        &[
            "error duplicate-definition: the function ‘f’ is defined multiple times",
            "error duplicate-definition: the parameter ‘a’ is defined multiple times",
            "error duplicate-definition: the variable ‘x’ is already defined in this scope",
            "warning unused-variable: the variable ‘x’ is never used",
            "warning unused-variable: the variable ‘x’ is never used",
        ],
    );
}

#[test]
fn control_flow_permissions() {
    assert_diagnostics(
        "\
fn f() {
    break;
    while true { if false { continue; } }
    switch 1 { case 1: break; case 1: ; }
    case 2: ;
}",
        &[
            "error break-outside-loop: ‘break’ outside of a loop or a ‘switch’",
            "info constant-condition: the condition is always ‘false’",
            "error duplicate-case: the case ‘1’ is already covered by this switch",
            "error case-outside-switch: ‘case’ outside of a ‘switch’",
        ],
    );
}

#[test]
fn loops_permit_jumps_in_nested_blocks() {
    let (_, session, errors) = analyze_source(
        "fn f() { for var i = 0; i < 10; i++ { if i == 5 { break; } { continue; } } do { break; } while false; }",
    );

    assert!(!errors);
    assert_eq!(diagnostics(&session), Vec::<String>::new());
}

#[test]
fn labels_are_resolved() {
    let (tree, session, errors) = analyze_source("fn f() { goto end; goto nowhere; end: ; end: ; }");

    assert!(errors);
    assert_eq!(
        diagnostics(&session),
        [
            "error duplicate-label: the label ‘end’ is defined multiple times",
            "error undefined-label: there is no label ‘nowhere’ in this function",
        ]
    );

    let body = tree.function(tree.functions()[0]).body.unwrap();
    let goto = tree.statement(body).statements[0];
    assert_eq!(
        tree.statement(goto).objects,
        [StatementObject::Label(Label::new(Atom::from("end"), 0))]
    );
}

#[test]
fn return_values() {
    assert_diagnostics(
        "\
fn a() -> int { return; }
fn b() { return 1; }
fn c() -> bool { return 1; }
fn d() -> *int { return null; }
fn e() -> uint { return 1; }
fn g(n: int) -> int { if n == 0 { return 1; } }
fn h(n: int) -> int { if n == 0 { return 1; } else { { return 2; } } }
fn k(n: int) -> int { if n == 0 { return 1; } else if n == 1 { return 2; } }",
        &[
            "error missing-return-value: the function ‘a’ has to return a value of type ‘int’",
            "error unexpected-return-value: the function ‘b’ does not return a value",
            "error type-mismatch: expected a value of type ‘bool’ but found ‘int’",
            "error missing-return-value: the function ‘g’ may reach its end without returning a value of type ‘int’",
            "error missing-return-value: the function ‘k’ may reach its end without returning a value of type ‘int’",
        ],
    );
}

#[test]
fn oversized_types_are_rejected() {
    assert_diagnostics(
        "\
fn f(p: *[[int; 4294967295]; 4294967295]);
fn main() {
    var b: [[int; 4294967295]; 4294967295];
    var c = sizeof(b) + sizeof([[char; 4294967295]; 4294967295]);
    var d: [int; 4294967295];
    c = c + sizeof(d);
}",
        &[
            "error type-too-large: the type ‘*[[int; 4294967295]; 4294967295]’ is too large",
            "error type-too-large: the type ‘[[int; 4294967295]; 4294967295]’ is too large",
            "error type-too-large: the type ‘[[char; 4294967295]; 4294967295]’ is too large",
        ],
    );
}

#[test]
fn calls() {
    assert_diagnostics(
        "\
fn swap(ref a: int, out b: int) -> bool;
@deprecated(\"use something else\") fn old();
fn main() {
    var x = 1;
    var y = 2;
    swap(ref x, out y);
    swap(x, out y);
    swap(ref x, out 3);
    swap(ref x);
    old();
    x();
}",
        &[
            "error reference-kind-mismatch: the parameter ‘a’ is passed with ‘ref’ but the argument is passed by value",
            "error not-assignable: an argument passed with ‘out’ has to be assignable",
            "error argument-count: the function ‘swap’ takes 2 arguments but 1 was supplied",
            "warning deprecated: the function ‘old’ is deprecated",
            "error not-callable: ‘x’ is not a function",
        ],
    );
}

#[test]
fn mismatched_arguments_are_reported_once() {
    let (_, session, errors) = analyze_source("fn take(a: int, b: bool); fn main() { take(true, 1); }");

    assert!(errors);
    assert!(session.engine().errors_encountered());

    let active = session.engine().active();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].message, "mismatched argument types in the call of ‘take’");
    assert_eq!(
        active[0].subdiagnostics[0].message,
        "2 arguments do not match the signature ‘fn take(a: int, b: bool)’"
    );
}

#[test]
fn operators_and_casts() {
    assert_diagnostics(
        "\
fn f(a: int, b: uint) -> int {
    var c = a + b;
    var d = a + 1;
    @unused var e = \"x\" as int;
    var p: *int = &a;
    var q = *p;
    @unused var m = a.b;
    return c + d + q;
}",
        &[
            "info implicit-conversion: implicit conversion between ‘int’ and ‘uint’",
            "error invalid-cast: cannot cast a value of type ‘text’ to ‘int’",
            "error unsupported-expression: the operator ‘.’ is not supported",
        ],
    );
}

#[test]
fn assignments_need_a_place() {
    assert_diagnostics(
        "fn f() { var x = 1; x + 1 = 2; x = true; !x; }",
        &[
            "error not-assignable: cannot assign to this expression",
            "error type-mismatch: expected a value of type ‘int’ but found ‘bool’",
            "error type-mismatch: expected a value of type ‘bool’ but found ‘int’",
        ],
    );
}

#[test]
fn initializer_lists() {
    assert_diagnostics(
        "\
fn f() {
    var a: [int; 2] = {1, 2, 3};
    var b: [int; 2] = {x: 1};
    var c: int = {1};
    var d: [bool; 2] = {true, 1};
    assert(a[0] + b[1] + c == 0 && d[0]);
}",
        &[
            "error initializer-count: the initializer list has 3 elements but the array only holds 2",
            "error invalid-initializer: the elements of an array cannot be named",
            "error invalid-initializer: an initializer list can only initialize a variable of array type",
            "error type-mismatch: expected a value of type ‘bool’ but found ‘int’",
        ],
    );
}

#[test]
fn constant_assertions() {
    assert_diagnostics(
        "fn f() { assert(1 > 2); assert(true); assert(sizeof(int) == 8); }",
        &["error assertion-failed: this assertion always fails"],
    );
}

#[test]
fn inline_assembly() {
    let (tree, session, errors) =
        analyze_source("fn f(x: int) { asm(\"push {x}\", preserve(r1, r16), ignore(r1, sp)); }");

    assert!(!errors);
    assert_eq!(
        diagnostics(&session),
        [
            "warning unknown-register: unknown register ‘r16’",
            "warning conflicting-register: the register ‘r1’ is both preserved and ignored",
        ]
    );

    let function = tree.functions()[0];
    let body = tree.function(function).body.unwrap();
    let asm = tree.statement(body).statements[0];
    let symbol = tree.statement(asm).asm().unwrap().symbols[0];
    assert_eq!(tree.expression(symbol).binding(), Some(Binding::Parameter(function, 0)));
}

#[test]
fn function_attributes() {
    let (tree, session, errors) = analyze_source(
        "@inline @export fn f() {} @deprecated(1) fn g(); @frobnicate fn h(); @deprecated(\"gone\") fn i();",
    );

    assert!(errors);

    let properties: Vec<_> =
        tree.functions().iter().map(|&function| tree.function(function).properties.clone()).collect();
    assert_eq!(
        properties,
        [
            FunctionProperties { inline: true, export: true, deprecated: None },
            FunctionProperties { deprecated: Some(None), ..Default::default() },
            FunctionProperties::default(),
            FunctionProperties { deprecated: Some(Some(Atom::from("gone"))), ..Default::default() },
        ]
    );

    session.attributes().report_unused(session.engine());
    assert_eq!(
        diagnostics(&session),
        [
            "error invalid-attribute-argument: the attribute ‘deprecated’ takes an optional text argument but got an argument of kind integer",
            "warning unused-attribute: unused attribute ‘frobnicate’",
        ]
    );
}

#[test]
fn unused_variables_can_be_marked() {
    assert_diagnostics(
        "fn f() { @unused var a = 1; var b = 2; var c = 3; c = 4; }",
        &["warning unused-variable: the variable ‘b’ is never used"],
    );
}
