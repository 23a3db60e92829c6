use crate::{Module, generate};
use session::Session;
use std::path::Path;
use utility::assert_text_eq;

fn generated(source: &str) -> Module {
    let session = Session::test();
    let mut tree = parser::parse_source(source, &session);
    assert!(!analyzer::analyze(&mut tree, &session), "the source contains errors");
    lowerer::lower(&mut tree, &session);

    generate(&tree, &session, Path::new("test.food"))
}

#[track_caller]
fn assert_unit_eq(source: &str, name: &str, expected: &str) {
    let module = generated(source);
    let Some(unit) = module.units.iter().find(|unit| unit.name.to_str() == name) else {
        panic!("there is no unit named ‘{name}’");
    };
    assert_text_eq(unit.text(), expected);
}

#[test]
fn one_unit_per_function() {
    let module = generated(
        "\
fn add(a: int, b: int) -> int { return a + b; }
@export @inline fn main() { var x = add(1, 2); x += 3; }
fn puts(s: text);",
    );

    assert_text_eq(
        &module.to_string(),
        "\
; generated from test.food

.unit add
.params a b
.line 1
    load a
    load b
    add
    retv
.end

.unit main
.global
.inline
.locals x
.line 2
    push 1
    push 2
    call add 2
    store x
    drop
    load x
    push 3
    add
    store x
    drop
    ret
.end

.unit puts
.extern
.params s
.end
",
    );
}

#[test]
fn loops_with_continue() {
    assert_unit_eq(
        "fn f(n: int) -> int { var total = 0; for var i = 0; i < n; i++ { if i == 3 { continue; } total += i; } return total; }",
        "f",
        "\
.unit f
.params n
.locals total i
.line 1
    push 0
    store total
    drop
    push 0
    store i
    drop
.L0:
    load i
    load n
    lt
    jz .L2
    load i
    push 3
    eq
    jz .L3
    jmp .L1
.L3:
    load total
    load i
    add
    store total
    drop
.L1:
    load i
    push 1
    add
    store i
    drop
    jmp .L0
.L2:
    load total
    retv
.end
",
    );
}

#[test]
fn switches_and_short_circuits() {
    assert_unit_eq(
        "\
fn g(c: int) -> bool { switch c { case 1: return true; case 2: break; default: ; } do { c -= 1; } while c > 0 && c != 5; return c == 0 ? false : true; }",
        "g",
        "\
.unit g
.params c
.locals $0
.line 1
    load c
    store $0
    drop
    load $0
    push 1
    eq
    jnz .L1
    load $0
    push 2
    eq
    jnz .L2
    jmp .L3
.L1:
    push 1
    retv
.L2:
    jmp .L0
.L3:
.L0:
.L4:
    load c
    push 1
    sub
    store c
    drop
.L5:
    load c
    push 0
    gt
    dup
    jz .L7
    drop
    load c
    push 5
    ne
.L7:
    jnz .L4
.L6:
    load c
    push 0
    eq
    jz .L8
    push 0
    jmp .L9
.L8:
    push 1
.L9:
    retv
.end
",
    );
}

#[test]
fn references_are_passed_as_addresses() {
    let source = "\
fn swap(ref a: int, ref b: int) { var t = a; a = b; b = t; }
fn main() { var x = 1; var y = 2; swap(ref x, ref y); }";

    assert_unit_eq(
        source,
        "swap",
        "\
.unit swap
.params &a &b
.locals t
.line 1
    load a
    loadv
    store t
    drop
    load a
    load b
    loadv
    storev
    drop
    load b
    load t
    storev
    drop
    ret
.end
",
    );
    assert_unit_eq(
        source,
        "main",
        "\
.unit main
.locals x y
.line 2
    push 1
    store x
    drop
    push 2
    store y
    drop
    addr x
    addr y
    call swap 2
    ret
.end
",
    );
}

#[test]
fn arrays_and_pointers() {
    assert_unit_eq(
        "fn h() -> int { var a: [int; 3] = {1, 2, 3}; var p: *int = &a[1]; return a[2] + *p; }",
        "h",
        "\
.unit h
.locals a p
.line 1
    addr a
    push 1
    storev
    drop
    addr a
    push 8
    add
    push 2
    storev
    drop
    addr a
    push 16
    add
    push 3
    storev
    drop
    addr a
    push 1
    push 8
    mul
    add
    store p
    drop
    addr a
    push 2
    push 8
    mul
    add
    loadv
    load p
    loadv
    add
    retv
.end
",
    );
}

#[test]
fn shadowing_variables_get_their_own_slots() {
    assert_unit_eq(
        "fn s(x: int) { var y = x; { var x = 2; y = x; } y = y; }",
        "s",
        "\
.unit s
.params x
.locals y x.1
.line 1
    load x
    store y
    drop
    push 2
    store x.1
    drop
    load x.1
    store y
    drop
    load y
    store y
    drop
    ret
.end
",
    );
}

#[test]
fn inline_assembly_and_conversions() {
    let source = "\
fn k(x: int) { asm(\"push {x}\", preserve(r1, r2), ignore(r2)); }
fn m(a: int) -> uint { return (a as uint) / 2; }";

    assert_unit_eq(
        source,
        "k",
        "\
.unit k
.params x
.line 1
    save r1
    push [x]
    restore r1
    ret
.end
",
    );
    assert_unit_eq(
        source,
        "m",
        "\
.unit m
.params a
.line 2
    load a
    conv int uint
    push 2
    divu
    retv
.end
",
    );
}
