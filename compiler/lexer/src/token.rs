//! The tokens emitted by the lexer.

use span::Spanned;
use std::fmt;
use utility::Atom;
use BareToken::*;

pub type Token = Spanned<BareToken>;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BareToken {
    //
    // Keywords
    //
    As,
    Asm,
    Assert,
    Bool,
    Break,
    Case,
    Char,
    Continue,
    Default,
    Do,
    Else,
    False,
    Fn,
    For,
    Goto,
    If,
    Ignore,
    Include,
    Int,
    NameOf,
    Null,
    Out,
    Preserve,
    Ref,
    Return,
    SizeOf,
    Switch,
    Text,
    True,
    UInt,
    Var,
    Void,
    While,
    //
    // Punctuation
    //
    Ampersand,
    AmpersandEquals,
    Asterisk,
    AsteriskEquals,
    At,
    Bar,
    BarEquals,
    Caret,
    CaretEquals,
    ClosingCurlyBracket,
    ClosingRoundBracket,
    ClosingSquareBracket,
    Colon,
    Comma,
    Dot,
    DoubleAmpersand,
    DoubleBar,
    DoubleColon,
    DoubleEquals,
    DoubleGreaterThan,
    DoubleGreaterThanEquals,
    DoubleLessThan,
    DoubleLessThanEquals,
    DoubleMinus,
    DoublePlus,
    Equals,
    ExclamationMark,
    ExclamationMarkEquals,
    GreaterThan,
    GreaterThanEquals,
    LessThan,
    LessThanEquals,
    Minus,
    MinusEquals,
    OpeningCurlyBracket,
    OpeningRoundBracket,
    OpeningSquareBracket,
    Percent,
    PercentEquals,
    Plus,
    PlusEquals,
    QuestionMark,
    Semicolon,
    Slash,
    SlashEquals,
    ThinArrowRight,
    Tilde,
    //
    // Other Tokens
    //
    CharacterLiteral(char),
    EndOfInput,
    Identifier(Atom),
    IntegerLiteral(u64),
    TextLiteral(Atom),
}

pub(crate) const KEYWORDS: &[(&str, BareToken)] = &[
    ("as", As),
    ("asm", Asm),
    ("assert", Assert),
    ("bool", Bool),
    ("break", Break),
    ("case", Case),
    ("char", Char),
    ("continue", Continue),
    ("default", Default),
    ("do", Do),
    ("else", Else),
    ("false", False),
    ("fn", Fn),
    ("for", For),
    ("goto", Goto),
    ("if", If),
    ("ignore", Ignore),
    ("include", Include),
    ("int", Int),
    ("nameof", NameOf),
    ("null", Null),
    ("out", Out),
    ("preserve", Preserve),
    ("ref", Ref),
    ("return", Return),
    ("sizeof", SizeOf),
    ("switch", Switch),
    ("text", Text),
    ("true", True),
    ("uint", UInt),
    ("var", Var),
    ("void", Void),
    ("while", While),
];

/// Punctuation ordered such that no entry is preceded by one of its prefixes.
pub(crate) const PUNCTUATION: &[(&str, BareToken)] = &[
    ("<<=", DoubleLessThanEquals),
    (">>=", DoubleGreaterThanEquals),
    ("&&", DoubleAmpersand),
    ("&=", AmpersandEquals),
    ("*=", AsteriskEquals),
    ("|=", BarEquals),
    ("||", DoubleBar),
    ("^=", CaretEquals),
    ("::", DoubleColon),
    ("==", DoubleEquals),
    ("<<", DoubleLessThan),
    ("<=", LessThanEquals),
    (">>", DoubleGreaterThan),
    (">=", GreaterThanEquals),
    ("--", DoubleMinus),
    ("-=", MinusEquals),
    ("->", ThinArrowRight),
    ("++", DoublePlus),
    ("+=", PlusEquals),
    ("!=", ExclamationMarkEquals),
    ("%=", PercentEquals),
    ("/=", SlashEquals),
    ("&", Ampersand),
    ("*", Asterisk),
    ("@", At),
    ("|", Bar),
    ("^", Caret),
    ("}", ClosingCurlyBracket),
    (")", ClosingRoundBracket),
    ("]", ClosingSquareBracket),
    (":", Colon),
    (",", Comma),
    (".", Dot),
    ("=", Equals),
    ("!", ExclamationMark),
    (">", GreaterThan),
    ("<", LessThan),
    ("-", Minus),
    ("{", OpeningCurlyBracket),
    ("(", OpeningRoundBracket),
    ("[", OpeningSquareBracket),
    ("%", Percent),
    ("+", Plus),
    ("?", QuestionMark),
    (";", Semicolon),
    ("/", Slash),
    ("~", Tilde),
];

pub(crate) fn parse_keyword(source: &str) -> Option<BareToken> {
    KEYWORDS.iter().find(|(keyword, _)| *keyword == source).map(|&(_, token)| token)
}

impl BareToken {
    /// The fixed source text of keywords and punctuation.
    pub fn text(self) -> Option<&'static str> {
        KEYWORDS
            .iter()
            .chain(PUNCTUATION)
            .find(|&&(_, token)| token == self)
            .map(|&(text, _)| text)
    }

    pub const fn is_keyword(self) -> bool {
        matches!(
            self,
            As | Asm
                | Assert
                | Bool
                | Break
                | Case
                | Char
                | Continue
                | Default
                | Do
                | Else
                | False
                | Fn
                | For
                | Goto
                | If
                | Ignore
                | Include
                | Int
                | NameOf
                | Null
                | Out
                | Preserve
                | Ref
                | Return
                | SizeOf
                | Switch
                | Text
                | True
                | UInt
                | Var
                | Void
                | While
        )
    }
}

impl fmt::Display for BareToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharacterLiteral(_) => f.write_str("character literal"),
            EndOfInput => f.write_str("end of input"),
            Identifier(_) => f.write_str("identifier"),
            IntegerLiteral(_) => f.write_str("integer literal"),
            TextLiteral(_) => f.write_str("text literal"),
            token => match token.text() {
                Some(text) if token.is_keyword() => write!(f, "keyword ‘{text}’"),
                Some(text) => write!(f, "‘{text}’"),
                None => unreachable!(),
            },
        }
    }
}

/// Render a token the way it would appear in source for `-Z emit-tokens`.
pub struct Source<'a>(pub &'a BareToken);

impl fmt::Display for Source<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self.0 {
            CharacterLiteral(character) => write!(f, "{character:?}"),
            EndOfInput => f.write_str("<eof>"),
            Identifier(name) => write!(f, "{name}"),
            IntegerLiteral(value) => write!(f, "{value}"),
            TextLiteral(text) => write!(f, "{:?}", text.to_str()),
            token => f.write_str(token.text().unwrap_or_default()),
        }
    }
}
