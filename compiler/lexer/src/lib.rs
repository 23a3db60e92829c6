//! The lexical analyzer (lexer).

use diagnostics::{
    Class, Diagnostic, Engine,
    error::{Health, Outcome},
};
use span::{ByteIndex, Location, SourceFile, SourceFileIndex, Span, Spanned};
use std::{iter::Peekable, str::CharIndices};
use token::{PUNCTUATION, parse_keyword};
use utility::{Atom, QuoteExt};

pub use token::{BareToken, Source, Token};

pub mod token;

#[cfg(test)]
mod test;

/// Split a source file into tokens.
///
/// Lexical errors are reported and skipped. The token stream always ends in
/// [`BareToken::EndOfInput`].
pub fn lex(file: &SourceFile, index: SourceFileIndex, engine: &Engine) -> Outcome<Vec<Token>> {
    let outcome = Lexer::new(file, index, engine).lex();
    log::trace!("lexed {} tokens", outcome.bare.len());
    outcome
}

struct Lexer<'a> {
    file: &'a SourceFile,
    index: SourceFileIndex,
    characters: Peekable<CharIndices<'a>>,
    tokens: Vec<Token>,
    start: ByteIndex,
    engine: &'a Engine,
    health: Health,
}

impl<'a> Lexer<'a> {
    fn new(file: &'a SourceFile, index: SourceFileIndex, engine: &'a Engine) -> Self {
        Self {
            file,
            index,
            characters: file.content().char_indices().peekable(),
            tokens: Vec::new(),
            start: ByteIndex::new(0),
            engine,
            health: Health::Untainted,
        }
    }

    fn lex(mut self) -> Outcome<Vec<Token>> {
        while let Some((index, character)) = self.characters.peek().copied() {
            self.start = ByteIndex::from(index);

            match character {
                character if character.is_whitespace() => self.advance(),
                '/' if self.rest().starts_with("//") => self.lex_line_comment(),
                '/' if self.rest().starts_with("/*") => self.lex_block_comment(),
                character if is_identifier_start(character) => self.lex_identifier(),
                character if character.is_ascii_digit() => self.lex_integer_literal(),
                '"' => self.lex_text_literal(),
                '\'' => self.lex_character_literal(),
                _ => self.lex_punctuation(character),
            }
        }

        self.start = ByteIndex::from(self.file.content().len());
        self.add(BareToken::EndOfInput);

        Outcome::new(self.tokens, self.health)
    }

    fn rest(&self) -> &'a str {
        &self.file.content()[self.start.usize()..]
    }

    fn advance(&mut self) {
        self.characters.next();
    }

    fn peek(&mut self) -> Option<char> {
        self.characters.peek().map(|&(_, character)| character)
    }

    fn end(&mut self) -> ByteIndex {
        match self.characters.peek() {
            Some(&(index, _)) => ByteIndex::from(index),
            None => ByteIndex::from(self.file.content().len()),
        }
    }

    fn span(&mut self) -> Span {
        Span::new(self.start, self.end())
    }

    fn source(&mut self) -> &'a str {
        let span = self.span();
        &self.file[span]
    }

    fn add(&mut self, token: BareToken) {
        let span = self.span();
        self.tokens.push(Spanned::new(span, token));
    }

    fn error(&mut self, span: Span, message: impl Into<utility::Str>) {
        let error = Diagnostic::error()
            .class(Class::Lexical)
            .message(message)
            .at(Location::new(self.index, span))
            .report(self.engine);
        self.health.taint(error);
    }

    fn take_while(&mut self, predicate: fn(char) -> bool) {
        while let Some(character) = self.peek() {
            if !predicate(character) {
                break;
            }
            self.advance();
        }
    }

    fn lex_line_comment(&mut self) {
        self.take_while(|character| character != '\n');
    }

    fn lex_block_comment(&mut self) {
        self.advance();
        self.advance();

        let mut previous = None;
        while let Some(character) = self.peek() {
            self.advance();
            if previous == Some('*') && character == '/' {
                return;
            }
            previous = Some(character);
        }

        let span = self.span();
        self.error(span, "unterminated block comment");
    }

    fn lex_identifier(&mut self) {
        self.take_while(is_identifier_middle);

        let source = self.source();
        match parse_keyword(source) {
            Some(keyword) => self.add(keyword),
            None => self.add(BareToken::Identifier(Atom::from(source))),
        }
    }

    fn lex_integer_literal(&mut self) {
        let hexadecimal = self.rest().starts_with("0x") || self.rest().starts_with("0X");

        let value = if hexadecimal {
            self.advance();
            self.advance();
            self.take_while(|character| character.is_ascii_hexdigit());
            let digits = &self.source()[2..];

            if digits.is_empty() {
                let span = self.span();
                self.error(span, "hexadecimal literal without digits");
                Some(0)
            } else {
                u64::from_str_radix(digits, 16).ok()
            }
        } else {
            self.take_while(|character| character.is_ascii_digit());
            self.source().parse().ok()
        };

        if self.peek().is_some_and(is_identifier_middle) {
            self.take_while(is_identifier_middle);
            let span = self.span();
            let source = self.source();
            self.error(span, format!("invalid integer literal {}", source.quote()));
            self.add(BareToken::IntegerLiteral(0));
            return;
        }

        let value = value.unwrap_or_else(|| {
            let span = self.span();
            let source = self.source();
            self.error(span, format!("the integer literal {} is too large", source.quote()));
            0
        });

        self.add(BareToken::IntegerLiteral(value));
    }

    fn lex_text_literal(&mut self) {
        self.advance();
        let mut content = String::new();

        loop {
            match self.peek() {
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\n') | None => {
                    let span = self.span();
                    self.error(span, "unterminated text literal");
                    break;
                }
                Some('\\') => {
                    if let Some(character) = self.lex_escape_sequence() {
                        content.push(character);
                    }
                }
                Some(character) => {
                    self.advance();
                    content.push(character);
                }
            }
        }

        self.add(BareToken::TextLiteral(content.into()));
    }

    fn lex_character_literal(&mut self) {
        self.advance();

        let character = match self.peek() {
            Some('\\') => self.lex_escape_sequence(),
            Some('\'') => {
                self.advance();
                let span = self.span();
                self.error(span, "empty character literal");
                self.add(BareToken::CharacterLiteral('\0'));
                return;
            }
            Some(character) if character != '\n' => {
                self.advance();
                Some(character)
            }
            _ => None,
        };

        if self.peek() == Some('\'') {
            self.advance();
        } else {
            self.take_while(|character| character != '\'' && character != '\n');
            if self.peek() == Some('\'') {
                self.advance();
            }
            let span = self.span();
            self.error(span, "unterminated character literal");
        }

        self.add(BareToken::CharacterLiteral(character.unwrap_or('\0')));
    }

    /// Lex an escape sequence starting at a backslash.
    fn lex_escape_sequence(&mut self) -> Option<char> {
        let start = self.end();
        self.advance();

        let character = match self.peek()? {
            'n' => '\n',
            't' => '\t',
            '\\' => '\\',
            '\'' => '\'',
            '"' => '"',
            '0' => '\0',
            character => {
                self.advance();
                let span = Span::new(start, self.end());
                self.error(span, format!("invalid escape sequence ‘\\{character}’"));
                return None;
            }
        };

        self.advance();
        Some(character)
    }

    fn lex_punctuation(&mut self, character: char) {
        let rest = self.rest();

        let Some(&(text, token)) = PUNCTUATION.iter().find(|(text, _)| rest.starts_with(text)) else {
            self.advance();
            let span = self.span();
            self.error(span, format!("invalid character {}", character.quote()));
            return;
        };

        for _ in text.chars() {
            self.advance();
        }
        self.add(token);
    }
}

fn is_identifier_start(character: char) -> bool {
    character.is_ascii_alphabetic() || character == '_'
}

fn is_identifier_middle(character: char) -> bool {
    character.is_ascii_alphanumeric() || character == '_'
}
