use crate::{parse_program, parse_source};
use ast::Tree;
use session::Session;
use std::{fs, path::PathBuf};
use utility::{Atom, assert_text_eq};

fn parse(source: &str) -> (Tree, Session) {
    let session = Session::test();
    let tree = parse_source(source, &session);
    (tree, session)
}

fn messages(session: &Session) -> Vec<String> {
    session.engine().active().iter().map(|diagnostic| format!("{}: {}", diagnostic.class, diagnostic.message)).collect()
}

#[track_caller]
fn assert_parse_eq(source: &str, expected: &str) {
    let (tree, session) = parse(source);

    assert_eq!(messages(&session), Vec::<String>::new());
    assert_text_eq(&tree.pretty_print(tree.root()), expected);
}

/// A fresh directory for tests touching the file system.
fn directory(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("food-parser-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&path);
    fs::create_dir_all(&path).unwrap();
    path
}

#[test]
fn operator_precedence() {
    assert_parse_eq(
        "fn f() { x = a + b * c << 1 as uint; var s = sizeof(*int) + sizeof(x); }",
        "\
program
    function f()
        block
            expression
                assign
                    identifier x
                    shift-left
                        add
                            identifier a
                            multiply
                                identifier b
                                identifier c
                        cast : uint const
                            integer-literal 1 const
            variable-init s
                add
                    size-of-type *int const
                    size-of
                        identifier x
",
    );
}

#[test]
fn assignments_are_right_associative() {
    assert_parse_eq(
        "fn f() { a = b += c ? d : e, f; }",
        "\
program
    function f()
        block
            expression
                comma
                    assign
                        identifier a
                        add-assign
                            identifier b
                            conditional
                                identifier c
                                identifier d
                                identifier e
                    identifier f
",
    );
}

#[test]
fn loops_and_labels() {
    assert_parse_eq(
        "\
fn main() -> int {
    for var i = 0; i < 3; i++ {
        if i == 1 { continue; } else { break; }
    }
top:
    goto top;
    return 0;
}",
        "\
program
    function main() -> int
        block
            for [break, continue]
                less #loop-condition
                    identifier i
                    integer-literal 3 const
                post-increment #loop-increment
                    identifier i
                variable-init i
                    integer-literal 0 const
                block
                    if
                        equal
                            identifier i
                            integer-literal 1 const
                        block
                            continue
                        block
                            break
            label top #0
            goto
                identifier top label-ref
            return
                integer-literal 0 const
",
    );
}

#[test]
fn switch_with_case_bodies() {
    assert_parse_eq(
        "\
fn f(x: int) {
    switch x {
        case 1:
        case -2: x = 0;
        default: ;
    }
    do { x--; } while x > 0;
}",
        "\
program
    function f(x: int)
        block
            switch [break, case]
                identifier x
                block
                    case 1
                    case -2
                        expression
                            assign
                                identifier x
                                integer-literal 0 const
                    default
                        placeholder
            do-while [break, continue]
                greater
                    identifier x
                    integer-literal 0 const
                block
                    expression
                        post-decrement
                            identifier x
",
    );
}

#[test]
fn inline_assembly_references_symbols() {
    assert_parse_eq(
        r#"fn f(x: int) { asm("mov r1, {x}", preserve(r1, r2), ignore(r2)); }"#,
        r#"program
    function f(x: int)
        block
            asm "mov r1, {x}" preserve(r1, r2) ignore(r2)
                identifier x
"#,
    );
}

#[test]
fn calls_and_initializer_lists() {
    assert_parse_eq(
        "fn f() { g(ref a, out b, 1); var v: [int; 2] = {x: 1, 2}; }",
        "\
program
    function f()
        block
            expression
                call
                    identifier g
                    argument-list modes(reference, output, value)
                        identifier a
                        identifier b
                        integer-literal 1 const
            variable-init v: [int; 2]
                initializer-list names(x, _) const
                    integer-literal 1 const
                    integer-literal 2 const
",
    );
}

#[test]
fn external_declarations() {
    assert_parse_eq(
        "fn put(c: char); fn swap(ref a: *int, out b: *int) -> bool;",
        "\
program
    function put(c: char) extern
    function swap(ref a: *int, out b: *int) -> bool extern
",
    );
}

#[test]
fn recovery_at_statement_and_function_boundaries() {
    let (tree, session) = parse(
        "\
fn f() { var = 1; return; }
fn ) garbage
fn g() { }",
    );

    assert_eq!(
        messages(&session),
        [
            "syntax: found ‘=’ but expected identifier",
            "syntax: found ‘)’ but expected identifier",
        ]
    );

    let names: Vec<_> = tree.functions().iter().map(|&function| tree.function(function).name).collect();
    assert_eq!(names, [Atom::from("f"), Atom::from("g")]);

    let body = tree.function(tree.functions()[0]).body.unwrap();
    assert_eq!(tree.statement(body).statements.len(), 1);
}

#[test]
fn duplicate_attributes() {
    let (tree, session) = parse("@inline @deprecated(\"old\") @inline fn f();");

    assert_eq!(messages(&session), ["duplicate-attribute: the attribute ‘inline’ is already present"]);

    let function = tree.functions()[0];
    assert_eq!(tree[function].attributes.len(), 2);
    assert_eq!(session.attributes().len(), 3);
}

#[test]
fn includes_are_resolved_once() {
    let directory = directory("include");
    let library = directory.join("library");
    fs::create_dir_all(&library).unwrap();

    fs::write(
        directory.join("main.food"),
        "include \"local.food\";\ninclude \"shared.food\";\ninclude \"local.food\";\nfn main() {}\n",
    )
    .unwrap();
    fs::write(directory.join("local.food"), "include \"main.food\";\nfn local();\n").unwrap();
    fs::write(library.join("shared.food"), "fn shared();\n").unwrap();

    let session = Session::new(session::Options {
        include_paths: vec![library],
        color: utility::paint::ColorChoice::Never,
        ..Default::default()
    });
    let tree = parse_program(&directory.join("main.food"), &session).unwrap();

    assert_eq!(messages(&session), Vec::<String>::new());
    let names: Vec<_> = tree.functions().iter().map(|&function| tree.function(function).name.to_str()).collect();
    assert_eq!(names, ["local", "shared", "main"]);
    assert_eq!(session.map().len(), 3);
}

#[test]
fn unresolved_include() {
    let (tree, session) = parse("include \"missing.food\";\nfn main() {}");

    assert_eq!(messages(&session), ["unresolved-include: could not resolve the include ‘missing.food’"]);
    assert_eq!(tree.functions().len(), 1);
}

#[test]
fn unreadable_root_file() {
    let session = Session::test();
    let path = directory("unreadable").join("absent.food");

    assert!(parse_program(&path, &session).is_err());
    assert_eq!(session.engine().active()[0].class, "io");
}
