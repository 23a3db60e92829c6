use crate::{BareToken::*, Source, Token, lex};
use diagnostics::{Engine, Policy};
use span::{SourceMap, Spanned, span};
use std::{cell::RefCell, rc::Rc};
use utility::difference;

struct Outcome {
    tokens: Vec<Token>,
    errors: Vec<String>,
}

fn lex_string(source: &str) -> Outcome {
    let map = Rc::new(RefCell::new(SourceMap::default()));
    let file = map.borrow_mut().add_str(source);
    let engine = Engine::new(Policy::default(), map.clone());

    let tokens = lex(&map.borrow()[file], file, &engine).bare;
    let errors = engine.active().iter().map(|diagnostic| diagnostic.message.to_string()).collect();

    Outcome { tokens, errors }
}

#[track_caller]
fn assert_lex_eq(source: &str, expected: Vec<Token>) {
    let actual = lex_string(source);

    assert!(actual.errors.is_empty(), "unexpected lexical errors: {:?}", actual.errors);

    if actual.tokens != expected {
        panic!(
            "the output by the lexer does not match the expected one:\n{}",
            difference(&format!("{expected:#?}"), &format!("{:#?}", actual.tokens)),
        );
    }
}

#[test]
fn function_header() {
    assert_lex_eq(
        "fn add(ref x: int) -> uint;",
        vec![
            Spanned::new(span(0, 2), Fn),
            Spanned::new(span(3, 6), Identifier("add".into())),
            Spanned::new(span(6, 7), OpeningRoundBracket),
            Spanned::new(span(7, 10), Ref),
            Spanned::new(span(11, 12), Identifier("x".into())),
            Spanned::new(span(12, 13), Colon),
            Spanned::new(span(14, 17), Int),
            Spanned::new(span(17, 18), ClosingRoundBracket),
            Spanned::new(span(19, 21), ThinArrowRight),
            Spanned::new(span(22, 26), UInt),
            Spanned::new(span(26, 27), Semicolon),
            Spanned::new(span(27, 27), EndOfInput),
        ],
    );
}

#[test]
fn maximal_munch_punctuation() {
    assert_lex_eq(
        "a<<=b>>c->d::e",
        vec![
            Spanned::new(span(0, 1), Identifier("a".into())),
            Spanned::new(span(1, 4), DoubleLessThanEquals),
            Spanned::new(span(4, 5), Identifier("b".into())),
            Spanned::new(span(5, 7), DoubleGreaterThan),
            Spanned::new(span(7, 8), Identifier("c".into())),
            Spanned::new(span(8, 10), ThinArrowRight),
            Spanned::new(span(10, 11), Identifier("d".into())),
            Spanned::new(span(11, 13), DoubleColon),
            Spanned::new(span(13, 14), Identifier("e".into())),
            Spanned::new(span(14, 14), EndOfInput),
        ],
    );
}

#[test]
fn comments_are_skipped() {
    assert_lex_eq(
        "// line\nx /* block\n * more */ y",
        vec![
            Spanned::new(span(8, 9), Identifier("x".into())),
            Spanned::new(span(30, 31), Identifier("y".into())),
            Spanned::new(span(31, 31), EndOfInput),
        ],
    );
}

#[test]
fn literals() {
    assert_lex_eq(
        r#"42 0xFF 'a' '\n' "hi\t\"you\"""#,
        vec![
            Spanned::new(span(0, 2), IntegerLiteral(42)),
            Spanned::new(span(3, 7), IntegerLiteral(255)),
            Spanned::new(span(8, 11), CharacterLiteral('a')),
            Spanned::new(span(12, 16), CharacterLiteral('\n')),
            Spanned::new(span(17, 30), TextLiteral("hi\t\"you\"".into())),
            Spanned::new(span(30, 30), EndOfInput),
        ],
    );
}

#[test]
fn lexical_errors_do_not_stop_lexing() {
    let outcome = lex_string("x # \"open\ny '\\q' 99999999999999999999999");

    assert_eq!(
        outcome.errors,
        [
            "invalid character ‘#’",
            "unterminated text literal",
            "invalid escape sequence ‘\\q’",
            "the integer literal ‘99999999999999999999999’ is too large",
        ]
    );
    let tokens: Vec<_> = outcome.tokens.into_iter().map(|token| token.bare).collect();
    assert_eq!(
        tokens,
        [
            Identifier("x".into()),
            TextLiteral("open".into()),
            Identifier("y".into()),
            CharacterLiteral('\0'),
            IntegerLiteral(0),
            EndOfInput,
        ]
    );
}

#[test]
fn token_display() {
    assert_eq!(Fn.to_string(), "keyword ‘fn’");
    assert_eq!(DoubleColon.to_string(), "‘::’");
    assert_eq!(Identifier("x".into()).to_string(), "identifier");
    assert_eq!(Source(&TextLiteral("a\"b".into())).to_string(), r#""a\"b""#);
    assert_eq!(Source(&PlusEquals).to_string(), "+=");
}
