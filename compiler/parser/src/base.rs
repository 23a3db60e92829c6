use crate::Parser;
use diagnostics::{Class, Diagnostic, error::Result};
use lexer::{BareToken, Token};
use span::{Location, Span, Spanned};
use std::fmt;
use utility::{Atom, Conjunction, ListingExt};

impl Parser<'_> {
    /// Get the current token.
    pub(crate) fn token(&self) -> Token {
        self.tokens[self.index]
    }

    pub(crate) fn bare(&self) -> BareToken {
        self.token().bare
    }

    pub(crate) fn span(&self) -> Span {
        self.token().span
    }

    /// Look ahead by the given amount of tokens without going past the end of input.
    pub(crate) fn look_ahead(&self, amount: usize) -> BareToken {
        let index = (self.index + amount).min(self.tokens.len() - 1);
        self.tokens[index].bare
    }

    /// Step to the next token.
    ///
    /// Doesn't advance past [`BareToken::EndOfInput`].
    pub(crate) fn advance(&mut self) {
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
    }

    /// The span of the token consumed last.
    pub(crate) fn previous_span(&self) -> Span {
        match self.index.checked_sub(1) {
            Some(index) => self.tokens[index].span,
            None => self.span(),
        }
    }

    /// The span from the given start up to the end of the token consumed last.
    pub(crate) fn span_from(&self, start: Span) -> Span {
        start.merge(self.previous_span())
    }

    pub(crate) fn location(&self, span: Span) -> Location {
        Location::new(self.file, span)
    }

    pub(crate) fn expect(&self, expected: BareToken) -> Result<Token> {
        let token = self.token();

        if token.bare == expected {
            Ok(token)
        } else {
            Err(self.unexpected(Expected::Token(expected)))
        }
    }

    /// [Expect](Self::expect) the current token and [advance](Self::advance) on success.
    pub(crate) fn consume(&mut self, expected: BareToken) -> Result<Token> {
        let token = self.expect(expected)?;
        self.advance();
        Ok(token)
    }

    /// Consume the current token if it matches.
    ///
    /// Returns whether the token was found and skipped.
    #[must_use]
    pub(crate) fn maybe_consume(&mut self, token: BareToken) -> bool {
        if self.bare() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn consume_identifier(&mut self) -> Result<Spanned<Atom>> {
        match self.bare() {
            BareToken::Identifier(name) => {
                let span = self.span();
                self.advance();
                Ok(Spanned::new(span, name))
            }
            _ => Err(self.unexpected(Expected::Identifier)),
        }
    }

    pub(crate) fn consume_text(&mut self) -> Result<Spanned<Atom>> {
        match self.bare() {
            BareToken::TextLiteral(text) => {
                let span = self.span();
                self.advance();
                Ok(Spanned::new(span, text))
            }
            _ => Err(self.unexpected(Expected::Category("text literal"))),
        }
    }

    /// Report that the current token is not the expected one.
    pub(crate) fn unexpected(&self, expected: Expected) -> diagnostics::error::ErasedReportedError {
        let token = self.token();

        Diagnostic::error()
            .class(Class::Syntax)
            .message(format!("found {} but expected {expected}", token.bare))
            .at(self.location(token.span))
            .report(self.session.engine())
    }

    /// Skip tokens until the given predicate holds or the input ends.
    pub(crate) fn skip_until(&mut self, stop: fn(BareToken) -> bool) {
        while self.bare() != BareToken::EndOfInput && !stop(self.bare()) {
            self.advance();
        }
    }
}

pub(crate) enum Expected {
    Token(BareToken),
    Identifier,
    Category(&'static str),
    OneOf(Vec<Self>),
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(token) => write!(f, "{token}"),
            Self::Identifier => f.write_str("identifier"),
            Self::Category(name) => f.write_str(name),
            Self::OneOf(expected) => write!(f, "{}", expected.iter().list(Conjunction::Or)),
        }
    }
}
