//! The syntactic analyzer (parser).
//!
//! A recursive-descent parser building the [`Tree`] of a whole program.
//! Included files are parsed into the same tree as the including one.
//!
//! Syntax errors are reported and recovered from at statement and at function
//! boundaries.

use ast::{
    AttributeArgument, AttributeIndex, Function, NodeIndex, Parameter, ReferenceKind, Tree, Type,
};
use base::Expected;
use diagnostics::{
    Class, Diagnostic,
    error::{Health, Result},
};
use lexer::{BareToken, Token};
use session::Session;
use span::{Location, SourceFileIndex, Span};
use std::path::{Path, PathBuf};
use utility::{HashSet, QuoteExt, SmallVec};

mod base;
mod expression;
mod statement;

#[cfg(test)]
mod test;

/// Parse the file at the given path together with everything it includes.
///
/// Fails only if the file itself cannot be read.
pub fn parse_program(path: &Path, session: &Session) -> Result<Tree> {
    let file = load(path, None, session)?;

    let mut tree = Tree::new();
    let mut included = HashSet::default();
    included.insert(canonicalize(path));

    let health = parse_file(file, path.parent(), session, &mut tree, &mut included);
    log::debug!("parsed {} nodes from {} ({health:?})", tree.len(), path.display());

    Ok(tree)
}

/// Parse source text not backed by a file.
///
/// Includes are resolved against the include paths only.
pub fn parse_source(source: &str, session: &Session) -> Tree {
    let file = session.map_mut().add_str(source);

    let mut tree = Tree::new();
    let _ = parse_file(file, None, session, &mut tree, &mut HashSet::default());
    tree
}

fn parse_file(
    file: SourceFileIndex,
    directory: Option<&Path>,
    session: &Session,
    tree: &mut Tree,
    included: &mut HashSet<PathBuf>,
) -> Health {
    let outcome = lexer::lex(&session.file(file), file, session.engine());

    let mut parser = Parser {
        tokens: outcome.bare,
        index: 0,
        file,
        directory: directory.map(Path::to_owned),
        session,
        tree,
        included,
        labels: 0,
        health: outcome.health,
    };
    parser.parse_top_level();
    parser.health
}

fn load(path: &Path, location: Option<Location>, session: &Session) -> Result<SourceFileIndex> {
    let result = session.map_mut().load(path);

    result.map_err(|error| {
        Diagnostic::error()
            .class(Class::Io)
            .message(format!("could not read the file {}", path.display().quote()))
            .note(error.to_string())
            .at_optional(location)
            .report(session.engine())
    })
}

fn canonicalize(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_owned())
}

/// The parser of a single file.
pub(crate) struct Parser<'a> {
    tokens: Vec<Token>,
    index: usize,
    file: SourceFileIndex,
    directory: Option<PathBuf>,
    session: &'a Session,
    tree: &'a mut Tree,
    included: &'a mut HashSet<PathBuf>,
    /// The number of labels of the current function.
    labels: u32,
    health: Health,
}

impl Parser<'_> {
    /// Parse included files and functions until the end of input.
    ///
    /// # Grammar
    ///
    /// ```ebnf
    /// Program ::= (Include | Function)*
    /// Include ::= "include" Text-Literal ";"
    /// ```
    fn parse_top_level(&mut self) {
        loop {
            let start = self.index;

            let result = match self.bare() {
                BareToken::EndOfInput => break,
                BareToken::Include => self.parse_include(),
                _ => self.parse_function(),
            };

            if let Err(error) = result {
                self.health.taint(error);

                if self.index == start {
                    self.advance();
                }
                self.skip_until(|token| {
                    matches!(token, BareToken::Fn | BareToken::At | BareToken::Include)
                });
            }
        }
    }

    fn parse_include(&mut self) -> Result {
        let keyword = self.consume(BareToken::Include)?;
        let name = self.consume_text()?;
        self.consume(BareToken::Semicolon)?;

        let location = self.location(keyword.span.merge(name.span));
        let name = name.bare.to_str();

        let Some(path) = self.resolve_include(name) else {
            return Err(Diagnostic::error()
                .class(Class::UnresolvedInclude)
                .message(format!("could not resolve the include {}", name.quote()))
                .at(location)
                .help("add the directory containing the file to the include paths with ‘-I’")
                .report(self.session.engine()));
        };

        if !self.included.insert(canonicalize(&path)) {
            log::debug!("skipping {} which was already included", path.display());
            return Ok(());
        }

        let file = load(&path, Some(location), self.session)?;
        let health = parse_file(file, path.parent(), self.session, self.tree, self.included);
        self.health = self.health.and(health);

        Ok(())
    }

    /// Resolve an include against the directory of the current file first, then
    /// against the include paths in order.
    fn resolve_include(&self, name: &str) -> Option<PathBuf> {
        self.directory
            .iter()
            .chain(&self.session.options().include_paths)
            .map(|directory| directory.join(name))
            .find(|path| path.is_file())
    }

    /// Parse a function.
    ///
    /// # Grammar
    ///
    /// ```ebnf
    /// Function ::= Attribute* "fn" #Identifier "(" Parameters ")" ("->" Type)? (Block | ";")
    /// ```
    fn parse_function(&mut self) -> Result {
        let attributes = self.parse_attributes()?;
        self.consume(BareToken::Fn)?;
        let name = self.consume_identifier()?;
        let parameters = self.parse_parameters()?;

        let return_type =
            if self.maybe_consume(BareToken::ThinArrowRight) { self.parse_type()? } else { Type::Void };

        let function = Function::new(name.bare, parameters, return_type);
        let function = self.tree.add_function(function, Some(self.location(name.span)));
        self.attach_attributes(function, attributes);

        self.labels = 0;

        if !self.maybe_consume(BareToken::Semicolon) {
            let body = self.parse_block()?;
            self.tree.set_body(function, body);
        }

        self.tree.attach_function(function);
        Ok(())
    }

    /// Parse attributes registering them with the session.
    ///
    /// # Grammar
    ///
    /// ```ebnf
    /// Attribute ::= "@" #Identifier ("(" Attribute-Argument ("," Attribute-Argument)* ")")?
    /// Attribute-Argument ::= Integer-Literal | Text-Literal | "true" | "false" | #Identifier
    /// ```
    fn parse_attributes(&mut self) -> Result<Vec<AttributeIndex>> {
        let mut attributes = Vec::new();

        while self.bare() == BareToken::At {
            let start = self.span();
            self.advance();
            let name = self.consume_identifier()?;
            let origin = self.location(start.merge(name.span));

            let mut arguments = SmallVec::new();
            if self.maybe_consume(BareToken::OpeningRoundBracket) {
                loop {
                    arguments.push(self.parse_attribute_argument()?);
                    if !self.maybe_consume(BareToken::Comma) {
                        break;
                    }
                }
                self.consume(BareToken::ClosingRoundBracket)?;
            }

            attributes.push(self.session.attributes().register(name.bare, arguments, origin));
        }

        Ok(attributes)
    }

    fn parse_attribute_argument(&mut self) -> Result<AttributeArgument> {
        let argument = match self.bare() {
            BareToken::IntegerLiteral(value) => AttributeArgument::Integer(value),
            BareToken::TextLiteral(text) => AttributeArgument::Text(text),
            BareToken::True => AttributeArgument::Boolean(true),
            BareToken::False => AttributeArgument::Boolean(false),
            BareToken::Identifier(name) => AttributeArgument::Identifier(name),
            _ => return Err(self.unexpected(Expected::Category("attribute argument"))),
        };

        self.advance();
        Ok(argument)
    }

    fn attach_attributes(&mut self, node: NodeIndex, attributes: Vec<AttributeIndex>) {
        for attribute in attributes {
            let result = self.tree.add_attribute(
                node,
                attribute,
                self.session.attributes(),
                self.session.engine(),
            );

            if let Err(error) = result {
                self.health.taint(error);
            }
        }
    }

    /// Parse the parameters of a function including the round brackets.
    ///
    /// # Grammar
    ///
    /// ```ebnf
    /// Parameter ::= ("ref" | "out")? #Identifier ":" Type
    /// ```
    fn parse_parameters(&mut self) -> Result<Vec<Parameter>> {
        self.consume(BareToken::OpeningRoundBracket)?;
        let mut parameters = Vec::new();

        if self.maybe_consume(BareToken::ClosingRoundBracket) {
            return Ok(parameters);
        }

        loop {
            let start = self.span();
            let mode = self.parse_reference_kind();
            let name = self.consume_identifier()?;
            self.consume(BareToken::Colon)?;
            let type_ = self.parse_type()?;

            parameters.push(Parameter {
                name: name.bare,
                type_,
                mode,
                location: Some(self.location(self.span_from(start))),
            });

            if !self.maybe_consume(BareToken::Comma) {
                break;
            }
        }

        self.consume(BareToken::ClosingRoundBracket)?;
        Ok(parameters)
    }

    fn parse_reference_kind(&mut self) -> ReferenceKind {
        if self.maybe_consume(BareToken::Ref) {
            ReferenceKind::Reference
        } else if self.maybe_consume(BareToken::Out) {
            ReferenceKind::Output
        } else {
            ReferenceKind::Value
        }
    }

    /// Parse a type.
    ///
    /// # Grammar
    ///
    /// ```ebnf
    /// Type ::= "void" | "bool" | "int" | "uint" | "char" | "text" | "*" Type | "[" Type ";" Integer-Literal "]"
    /// ```
    fn parse_type(&mut self) -> Result<Type> {
        let type_ = match self.bare() {
            BareToken::Void => Type::Void,
            BareToken::Bool => Type::Bool,
            BareToken::Int => Type::Int,
            BareToken::UInt => Type::UInt,
            BareToken::Char => Type::Char,
            BareToken::Text => Type::Text,
            BareToken::Asterisk => {
                self.advance();
                return Ok(Type::Pointer(Box::new(self.parse_type()?)));
            }
            BareToken::OpeningSquareBracket => {
                self.advance();
                let element = self.parse_type()?;
                self.consume(BareToken::Semicolon)?;
                let length = self.parse_array_length()?;
                self.consume(BareToken::ClosingSquareBracket)?;
                return Ok(Type::Array(Box::new(element), length));
            }
            _ => return Err(self.unexpected(Expected::Category("type"))),
        };

        self.advance();
        Ok(type_)
    }

    fn parse_array_length(&mut self) -> Result<u32> {
        let BareToken::IntegerLiteral(length) = self.bare() else {
            return Err(self.unexpected(Expected::Category("array length")));
        };
        let span = self.span();
        self.advance();

        u32::try_from(length).map_err(|_| {
            Diagnostic::error()
                .class(Class::Syntax)
                .message(format!("the array length {length} is too large"))
                .at(self.location(span))
                .report(self.session.engine())
        })
    }

    /// Whether the current token starts a type rather than an expression.
    fn starts_type(&self) -> bool {
        let mut amount = 0;
        while self.look_ahead(amount) == BareToken::Asterisk {
            amount += 1;
        }

        matches!(
            self.look_ahead(amount),
            BareToken::Void
                | BareToken::Bool
                | BareToken::Int
                | BareToken::UInt
                | BareToken::Char
                | BareToken::Text
                | BareToken::OpeningSquareBracket
        )
    }

    fn span_of(&self, node: NodeIndex) -> Span {
        self.tree.location(node).map_or_else(|| self.previous_span(), |location| location.span)
    }
}
