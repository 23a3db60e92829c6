use crate::{Parser, base::Expected};
use ast::{
    Expression, InlineAsmBlock, LOOP_CONDITION, LOOP_INCREMENT, Label, Literal, NodeIndex,
    ScopeFlags, Statement, StatementKind, StatementObject, Variable,
};
use diagnostics::{Class, Diagnostic, error::Result};
use lexer::BareToken;
use span::Span;
use utility::Atom;

impl Parser<'_> {
    /// Parse a block.
    ///
    /// # Grammar
    ///
    /// ```ebnf
    /// Block ::= "{" Statement* "}"
    /// ```
    pub(crate) fn parse_block(&mut self) -> Result<NodeIndex> {
        let start = self.consume(BareToken::OpeningCurlyBracket)?.span;
        let statements = self.parse_statements(|token| token == BareToken::ClosingCurlyBracket);
        self.consume(BareToken::ClosingCurlyBracket)?;

        Ok(self.add(Statement::new(StatementKind::Block).with_statements(statements), start))
    }

    /// Parse statements until the given token or the end of input, recovering from errors.
    fn parse_statements(&mut self, stop: fn(BareToken) -> bool) -> Vec<NodeIndex> {
        let mut statements = Vec::new();

        while !stop(self.bare()) && self.bare() != BareToken::EndOfInput {
            match self.parse_statement() {
                Ok(statement) => statements.push(statement),
                Err(error) => {
                    self.health.taint(error);
                    self.skip_until(|token| {
                        matches!(token, BareToken::Semicolon | BareToken::ClosingCurlyBracket)
                    });
                    let _ = self.maybe_consume(BareToken::Semicolon);
                }
            }
        }

        statements
    }

    fn add(&mut self, statement: Statement, start: Span) -> NodeIndex {
        let location = self.location(self.span_from(start));
        self.tree.add_statement(statement, Some(location))
    }

    fn parse_statement(&mut self) -> Result<NodeIndex> {
        let attributes = self.parse_attributes()?;
        let statement = self.parse_bare_statement()?;
        self.attach_attributes(statement, attributes);
        Ok(statement)
    }

    fn parse_bare_statement(&mut self) -> Result<NodeIndex> {
        let start = self.span();

        match self.bare() {
            BareToken::OpeningCurlyBracket => self.parse_block(),
            BareToken::Var => {
                let variable = self.parse_variable()?;
                self.consume(BareToken::Semicolon)?;
                Ok(variable)
            }
            BareToken::If => self.parse_if(),
            BareToken::While => {
                self.advance();
                let condition = self.parse_expression()?;
                let body = self.parse_block()?;

                let statement = Statement::new(StatementKind::While)
                    .with_expressions(vec![condition])
                    .with_statements(vec![body])
                    .with_flags(ScopeFlags::BREAK | ScopeFlags::CONTINUE);
                Ok(self.add(statement, start))
            }
            BareToken::Do => {
                self.advance();
                let body = self.parse_block()?;
                self.consume(BareToken::While)?;
                let condition = self.parse_expression()?;
                self.consume(BareToken::Semicolon)?;

                let statement = Statement::new(StatementKind::DoWhile)
                    .with_expressions(vec![condition])
                    .with_statements(vec![body])
                    .with_flags(ScopeFlags::BREAK | ScopeFlags::CONTINUE);
                Ok(self.add(statement, start))
            }
            BareToken::For => self.parse_for(),
            BareToken::Switch => {
                self.advance();
                let scrutinee = self.parse_expression()?;
                let body = self.parse_block()?;

                let statement = Statement::new(StatementKind::Switch)
                    .with_expressions(vec![scrutinee])
                    .with_statements(vec![body])
                    .with_flags(ScopeFlags::BREAK | ScopeFlags::CASE);
                Ok(self.add(statement, start))
            }
            BareToken::Case => {
                self.advance();
                let value = self.parse_case_value()?;
                self.consume(BareToken::Colon)?;
                let statements = self.parse_case_body();

                let statement = Statement::new(StatementKind::Case)
                    .with_object(StatementObject::CaseValue(value))
                    .with_statements(statements);
                Ok(self.add(statement, start))
            }
            BareToken::Default => {
                self.advance();
                self.consume(BareToken::Colon)?;
                let statements = self.parse_case_body();

                let statement = Statement::new(StatementKind::Default).with_statements(statements);
                Ok(self.add(statement, start))
            }
            BareToken::Break => self.parse_jump(StatementKind::Break),
            BareToken::Continue => self.parse_jump(StatementKind::Continue),
            BareToken::Goto => {
                self.advance();
                let name = self.consume_identifier()?;
                self.consume(BareToken::Semicolon)?;

                let mut label = Expression::identifier(name.bare);
                label.is_label_ref = true;
                let label = self.tree.add_expression(label, Some(self.location(name.span)));

                let statement = Statement::new(StatementKind::Goto).with_expressions(vec![label]);
                Ok(self.add(statement, start))
            }
            BareToken::Identifier(name) if self.look_ahead(1) == BareToken::Colon => {
                self.advance();
                self.advance();

                let label = Label::new(name, self.labels);
                self.labels += 1;

                let statement = Statement::new(StatementKind::Label).with_object(StatementObject::Label(label));
                Ok(self.add(statement, start))
            }
            BareToken::Return => {
                self.advance();

                let mut expressions = Vec::new();
                if self.bare() != BareToken::Semicolon {
                    expressions.push(self.parse_expression()?);
                }
                self.consume(BareToken::Semicolon)?;

                Ok(self.add(Statement::new(StatementKind::Return).with_expressions(expressions), start))
            }
            BareToken::Asm => self.parse_asm(),
            BareToken::Assert => {
                self.advance();
                self.consume(BareToken::OpeningRoundBracket)?;
                let condition = self.parse_expression()?;
                self.consume(BareToken::ClosingRoundBracket)?;
                self.consume(BareToken::Semicolon)?;

                let statement = Statement::new(StatementKind::Assert).with_expressions(vec![condition]);
                Ok(self.add(statement, start))
            }
            BareToken::Semicolon => {
                self.advance();
                Ok(self.add(Statement::new(StatementKind::Placeholder), start))
            }
            _ => {
                let statement = self.parse_expression_statement()?;
                self.consume(BareToken::Semicolon)?;
                Ok(statement)
            }
        }
    }

    /// Parse a variable declaration without the terminating semicolon.
    ///
    /// # Grammar
    ///
    /// ```ebnf
    /// Variable ::= "var" #Identifier (":" Type)? ("=" Expression)?
    /// ```
    fn parse_variable(&mut self) -> Result<NodeIndex> {
        let start = self.consume(BareToken::Var)?.span;
        let name = self.consume_identifier()?;

        let type_ = if self.maybe_consume(BareToken::Colon) { Some(self.parse_type()?) } else { None };

        let mut expressions = Vec::new();
        if self.maybe_consume(BareToken::Equals) {
            expressions.push(self.parse_assignment()?);
        }

        let statement = Statement::new(StatementKind::VariableInit)
            .with_expressions(expressions)
            .with_object(StatementObject::Variable(Variable { name: name.bare, type_ }));
        Ok(self.add(statement, start))
    }

    fn parse_expression_statement(&mut self) -> Result<NodeIndex> {
        let start = self.span();
        let expression = self.parse_expression()?;
        Ok(self.add(Statement::new(StatementKind::Expression).with_expressions(vec![expression]), start))
    }

    /// # Grammar
    ///
    /// ```ebnf
    /// If ::= "if" Expression Block ("else" (If | Block))?
    /// ```
    fn parse_if(&mut self) -> Result<NodeIndex> {
        let start = self.consume(BareToken::If)?.span;
        let condition = self.parse_expression()?;
        let mut statements = vec![self.parse_block()?];

        if self.maybe_consume(BareToken::Else) {
            let alternative = match self.bare() {
                BareToken::If => self.parse_if()?,
                _ => self.parse_block()?,
            };
            statements.push(alternative);
        }

        let statement = Statement::new(StatementKind::If)
            .with_expressions(vec![condition])
            .with_statements(statements);
        Ok(self.add(statement, start))
    }

    /// Parse a `for` loop.
    ///
    /// The initializer becomes the first nested statement, a placeholder if absent.
    /// The condition and the step are decorated expressions.
    ///
    /// # Grammar
    ///
    /// ```ebnf
    /// For ::= "for" (Variable | Expression)? ";" Expression? ";" Expression? Block
    /// ```
    fn parse_for(&mut self) -> Result<NodeIndex> {
        let start = self.consume(BareToken::For)?.span;

        let initializer = match self.bare() {
            BareToken::Semicolon => {
                let span = self.span();
                self.tree.add_statement(
                    Statement::new(StatementKind::Placeholder),
                    Some(self.location(span)),
                )
            }
            BareToken::Var => self.parse_variable()?,
            _ => self.parse_expression_statement()?,
        };
        self.consume(BareToken::Semicolon)?;

        let mut expressions = Vec::new();

        if self.bare() != BareToken::Semicolon {
            let condition = self.parse_expression()?;
            self.tree.expression_mut(condition).decorations.insert(LOOP_CONDITION.into());
            expressions.push(condition);
        }
        self.consume(BareToken::Semicolon)?;

        if self.bare() != BareToken::OpeningCurlyBracket {
            let step = self.parse_expression()?;
            self.tree.expression_mut(step).decorations.insert(LOOP_INCREMENT.into());
            expressions.push(step);
        }

        let body = self.parse_block()?;

        let statement = Statement::new(StatementKind::For)
            .with_expressions(expressions)
            .with_statements(vec![initializer, body])
            .with_flags(ScopeFlags::BREAK | ScopeFlags::CONTINUE);
        Ok(self.add(statement, start))
    }

    fn parse_case_value(&mut self) -> Result<Literal> {
        let negative = self.maybe_consume(BareToken::Minus);
        let span = self.span();

        let value = match self.bare() {
            BareToken::IntegerLiteral(value) => {
                let value = i128::from(value);
                let value = if negative { -value } else { value };

                match i64::try_from(value) {
                    Ok(value) => Literal::Integer(value),
                    Err(_) => {
                        return Err(Diagnostic::error()
                            .class(Class::Syntax)
                            .message(format!("the case value {value} does not fit into ‘int’"))
                            .at(self.location(span))
                            .report(self.session.engine()));
                    }
                }
            }
            BareToken::CharacterLiteral(character) if !negative => Literal::Character(character),
            BareToken::True if !negative => Literal::Boolean(true),
            BareToken::False if !negative => Literal::Boolean(false),
            _ => return Err(self.unexpected(Expected::Category("case value"))),
        };

        self.advance();
        Ok(value)
    }

    fn parse_case_body(&mut self) -> Vec<NodeIndex> {
        self.parse_statements(|token| {
            matches!(token, BareToken::Case | BareToken::Default | BareToken::ClosingCurlyBracket)
        })
    }

    fn parse_jump(&mut self, kind: StatementKind) -> Result<NodeIndex> {
        let start = self.span();
        self.advance();
        self.consume(BareToken::Semicolon)?;
        Ok(self.add(Statement::new(kind), start))
    }

    /// Parse inline assembly.
    ///
    /// Every symbol referenced as `{name}` in the template becomes an identifier
    /// expression owned by the statement.
    ///
    /// # Grammar
    ///
    /// ```ebnf
    /// Asm ::= "asm" "(" Text-Literal ("," ("preserve" | "ignore") Registers)* ")" ";"
    /// Registers ::= "(" #Identifier ("," #Identifier)* ")"
    /// ```
    fn parse_asm(&mut self) -> Result<NodeIndex> {
        let start = self.consume(BareToken::Asm)?.span;
        self.consume(BareToken::OpeningRoundBracket)?;
        let template = self.consume_text()?;
        let mut block = InlineAsmBlock::new(template.bare);

        while self.maybe_consume(BareToken::Comma) {
            match self.bare() {
                BareToken::Preserve => {
                    self.advance();
                    block.preserve.extend(self.parse_registers()?);
                }
                BareToken::Ignore => {
                    self.advance();
                    block.ignore.extend(self.parse_registers()?);
                }
                _ => {
                    return Err(self.unexpected(Expected::OneOf(vec![
                        Expected::Token(BareToken::Preserve),
                        Expected::Token(BareToken::Ignore),
                    ])));
                }
            }
        }

        self.consume(BareToken::ClosingRoundBracket)?;
        self.consume(BareToken::Semicolon)?;

        let location = self.location(template.span);
        for name in InlineAsmBlock::referenced_symbols(template.bare.to_str()) {
            let symbol = self.tree.add_expression(Expression::identifier(name.into()), Some(location));
            block.symbols.push(symbol);
        }

        Ok(self.add(Statement::new(StatementKind::Asm).with_object(StatementObject::Asm(block)), start))
    }

    fn parse_registers(&mut self) -> Result<Vec<Atom>> {
        self.consume(BareToken::OpeningRoundBracket)?;
        let mut registers = Vec::new();

        loop {
            registers.push(self.consume_identifier()?.bare);
            if !self.maybe_consume(BareToken::Comma) {
                break;
            }
        }

        self.consume(BareToken::ClosingRoundBracket)?;
        Ok(registers)
    }
}
