use crate::{Parser, base::Expected};
use ast::{Aggregate, Expression, ExpressionKind, Leaf, NodeIndex};
use diagnostics::error::Result;
use lexer::BareToken;
use span::Span;

/// Binary operators between the conditional and the cast level, loosest first.
const BINARY_OPERATORS: &[&[(BareToken, ExpressionKind)]] = &[
    &[(BareToken::DoubleBar, ExpressionKind::LogicalOr)],
    &[(BareToken::DoubleAmpersand, ExpressionKind::LogicalAnd)],
    &[(BareToken::Bar, ExpressionKind::BitwiseOr)],
    &[(BareToken::Caret, ExpressionKind::BitwiseXor)],
    &[(BareToken::Ampersand, ExpressionKind::BitwiseAnd)],
    &[
        (BareToken::DoubleEquals, ExpressionKind::Equal),
        (BareToken::ExclamationMarkEquals, ExpressionKind::NotEqual),
    ],
    &[
        (BareToken::LessThan, ExpressionKind::Less),
        (BareToken::LessThanEquals, ExpressionKind::LessEqual),
        (BareToken::GreaterThan, ExpressionKind::Greater),
        (BareToken::GreaterThanEquals, ExpressionKind::GreaterEqual),
    ],
    &[
        (BareToken::DoubleLessThan, ExpressionKind::ShiftLeft),
        (BareToken::DoubleGreaterThan, ExpressionKind::ShiftRight),
    ],
    &[(BareToken::Plus, ExpressionKind::Add), (BareToken::Minus, ExpressionKind::Subtract)],
    &[
        (BareToken::Asterisk, ExpressionKind::Multiply),
        (BareToken::Slash, ExpressionKind::Divide),
        (BareToken::Percent, ExpressionKind::Remainder),
    ],
];

const ASSIGNMENT_OPERATORS: &[(BareToken, ExpressionKind)] = &[
    (BareToken::Equals, ExpressionKind::Assign),
    (BareToken::PlusEquals, ExpressionKind::AddAssign),
    (BareToken::MinusEquals, ExpressionKind::SubtractAssign),
    (BareToken::AsteriskEquals, ExpressionKind::MultiplyAssign),
    (BareToken::SlashEquals, ExpressionKind::DivideAssign),
    (BareToken::PercentEquals, ExpressionKind::RemainderAssign),
    (BareToken::DoubleLessThanEquals, ExpressionKind::ShiftLeftAssign),
    (BareToken::DoubleGreaterThanEquals, ExpressionKind::ShiftRightAssign),
    (BareToken::AmpersandEquals, ExpressionKind::BitwiseAndAssign),
    (BareToken::BarEquals, ExpressionKind::BitwiseOrAssign),
    (BareToken::CaretEquals, ExpressionKind::BitwiseXorAssign),
];

const PREFIX_OPERATORS: &[(BareToken, ExpressionKind)] = &[
    (BareToken::Minus, ExpressionKind::Negate),
    (BareToken::Plus, ExpressionKind::Plus),
    (BareToken::ExclamationMark, ExpressionKind::LogicalNot),
    (BareToken::Tilde, ExpressionKind::BitwiseNot),
    (BareToken::Asterisk, ExpressionKind::Dereference),
    (BareToken::Ampersand, ExpressionKind::AddressOf),
    (BareToken::DoublePlus, ExpressionKind::PreIncrement),
    (BareToken::DoubleMinus, ExpressionKind::PreDecrement),
];

fn lookup(operators: &[(BareToken, ExpressionKind)], token: BareToken) -> Option<ExpressionKind> {
    operators.iter().find(|&&(operator, _)| operator == token).map(|&(_, kind)| kind)
}

impl Parser<'_> {
    fn add_expression(&mut self, expression: Expression, span: Span) -> NodeIndex {
        let location = self.location(span);
        self.tree.add_expression(expression, Some(location))
    }

    fn add_binary(&mut self, kind: ExpressionKind, left: NodeIndex, right: NodeIndex) -> NodeIndex {
        let span = self.span_of(left).merge(self.span_of(right));
        self.add_expression(Expression::binary(kind, left, right), span)
    }

    /// Parse an expression including the comma operator.
    ///
    /// # Grammar
    ///
    /// ```ebnf
    /// Expression ::= Assignment ("," Assignment)*
    /// ```
    pub(crate) fn parse_expression(&mut self) -> Result<NodeIndex> {
        let mut left = self.parse_assignment()?;

        while self.maybe_consume(BareToken::Comma) {
            let right = self.parse_assignment()?;
            left = self.add_binary(ExpressionKind::Comma, left, right);
        }

        Ok(left)
    }

    /// Parse an assignment which is right-associative.
    pub(crate) fn parse_assignment(&mut self) -> Result<NodeIndex> {
        let target = self.parse_conditional()?;

        let Some(kind) = lookup(ASSIGNMENT_OPERATORS, self.bare()) else {
            return Ok(target);
        };
        self.advance();

        let value = self.parse_assignment()?;
        Ok(self.add_binary(kind, target, value))
    }

    /// # Grammar
    ///
    /// ```ebnf
    /// Conditional ::= Binary ("?" Expression ":" Conditional)?
    /// ```
    fn parse_conditional(&mut self) -> Result<NodeIndex> {
        let condition = self.parse_binary(0)?;

        if !self.maybe_consume(BareToken::QuestionMark) {
            return Ok(condition);
        }

        let consequent = self.parse_expression()?;
        self.consume(BareToken::Colon)?;
        let alternative = self.parse_conditional()?;

        let span = self.span_of(condition).merge(self.span_of(alternative));
        Ok(self.add_expression(
            Expression::ternary(ExpressionKind::Conditional, [condition, consequent, alternative]),
            span,
        ))
    }

    /// Parse left-associative binary operators from the given precedence level upwards.
    fn parse_binary(&mut self, level: usize) -> Result<NodeIndex> {
        let Some(operators) = BINARY_OPERATORS.get(level) else {
            return self.parse_cast();
        };

        let mut left = self.parse_binary(level + 1)?;

        while let Some(kind) = lookup(operators, self.bare()) {
            self.advance();
            let right = self.parse_binary(level + 1)?;
            left = self.add_binary(kind, left, right);
        }

        Ok(left)
    }

    /// Parse casts whose target type becomes the type of the expression.
    ///
    /// # Grammar
    ///
    /// ```ebnf
    /// Cast ::= Prefix ("as" Type)*
    /// ```
    fn parse_cast(&mut self) -> Result<NodeIndex> {
        let mut operand = self.parse_prefix()?;

        while self.maybe_consume(BareToken::As) {
            let type_ = self.parse_type()?;
            let span = self.span_from(self.span_of(operand));
            operand =
                self.add_expression(Expression::unary(ExpressionKind::Cast, operand).typed(type_), span);
        }

        Ok(operand)
    }

    /// # Grammar
    ///
    /// ```ebnf
    /// Prefix ::= ("-" | "+" | "!" | "~" | "*" | "&" | "++" | "--") Prefix
    ///     | "sizeof" "(" (Type | Expression) ")"
    ///     | "nameof" "(" #Identifier ")"
    ///     | Postfix
    /// ```
    fn parse_prefix(&mut self) -> Result<NodeIndex> {
        let start = self.span();

        if let Some(kind) = lookup(PREFIX_OPERATORS, self.bare()) {
            self.advance();
            let operand = self.parse_prefix()?;
            let span = self.span_from(start);
            return Ok(self.add_expression(Expression::unary(kind, operand), span));
        }

        match self.bare() {
            BareToken::SizeOf => {
                self.advance();
                self.consume(BareToken::OpeningRoundBracket)?;

                let expression = if self.starts_type() {
                    let type_ = self.parse_type()?;
                    Expression::childless(ExpressionKind::SizeOfType, Leaf::Type(type_))
                } else {
                    Expression::unary(ExpressionKind::SizeOf, self.parse_expression()?)
                };

                self.consume(BareToken::ClosingRoundBracket)?;
                let span = self.span_from(start);
                Ok(self.add_expression(expression, span))
            }
            BareToken::NameOf => {
                self.advance();
                self.consume(BareToken::OpeningRoundBracket)?;
                let name = self.consume_identifier()?;
                self.consume(BareToken::ClosingRoundBracket)?;

                let name = self.add_expression(Expression::identifier(name.bare), name.span);
                let span = self.span_from(start);
                Ok(self.add_expression(Expression::unary(ExpressionKind::NameOf, name), span))
            }
            _ => self.parse_postfix(),
        }
    }

    /// # Grammar
    ///
    /// ```ebnf
    /// Postfix ::= Primary
    ///     ( "(" Arguments? ")"
    ///     | "[" Expression "]"
    ///     | ("." | "->" | "::") #Identifier
    ///     | "++" | "--"
    ///     )*
    /// ```
    fn parse_postfix(&mut self) -> Result<NodeIndex> {
        let mut operand = self.parse_primary()?;

        loop {
            let start = self.span_of(operand);

            operand = match self.bare() {
                BareToken::OpeningRoundBracket => {
                    let arguments = self.parse_arguments()?;
                    self.add_binary(ExpressionKind::Call, operand, arguments)
                }
                BareToken::OpeningSquareBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    self.consume(BareToken::ClosingSquareBracket)?;
                    let span = self.span_from(start);
                    self.add_expression(Expression::binary(ExpressionKind::Index, operand, index), span)
                }
                token @ (BareToken::Dot | BareToken::ThinArrowRight | BareToken::DoubleColon) => {
                    self.advance();
                    let member = self.consume_identifier()?;
                    let member = self.add_expression(Expression::identifier(member.bare), member.span);

                    let kind = match token {
                        BareToken::Dot => ExpressionKind::Member,
                        BareToken::ThinArrowRight => ExpressionKind::PointerMember,
                        _ => ExpressionKind::Scope,
                    };
                    self.add_binary(kind, operand, member)
                }
                token @ (BareToken::DoublePlus | BareToken::DoubleMinus) => {
                    self.advance();
                    let kind = match token {
                        BareToken::DoublePlus => ExpressionKind::PostIncrement,
                        _ => ExpressionKind::PostDecrement,
                    };
                    let span = self.span_from(start);
                    self.add_expression(Expression::unary(kind, operand), span)
                }
                _ => return Ok(operand),
            };
        }
    }

    /// Parse the argument list of a call including the round brackets.
    ///
    /// # Grammar
    ///
    /// ```ebnf
    /// Arguments ::= Argument ("," Argument)*
    /// Argument ::= ("ref" | "out")? Assignment
    /// ```
    fn parse_arguments(&mut self) -> Result<NodeIndex> {
        let start = self.consume(BareToken::OpeningRoundBracket)?.span;
        let mut children = Vec::new();
        let mut references = Vec::new();

        if self.bare() != BareToken::ClosingRoundBracket {
            loop {
                references.push(self.parse_reference_kind());
                children.push(self.parse_assignment()?);

                if !self.maybe_consume(BareToken::Comma) {
                    break;
                }
            }
        }

        self.consume(BareToken::ClosingRoundBracket)?;

        let aggregate = Aggregate { children, names: None, references: Some(references) };
        let span = self.span_from(start);
        Ok(self.add_expression(Expression::aggregate(ExpressionKind::ArgumentList, aggregate), span))
    }

    /// # Grammar
    ///
    /// ```ebnf
    /// Primary ::= Literal | #Identifier | "(" Expression ")" | "{" Members? "}"
    /// Members ::= Member ("," Member)* ","?
    /// Member ::= (#Identifier ":")? Assignment
    /// ```
    fn parse_primary(&mut self) -> Result<NodeIndex> {
        let span = self.span();

        let expression = match self.bare() {
            BareToken::IntegerLiteral(value) => Expression::integer(value),
            BareToken::CharacterLiteral(character) => {
                Expression::childless(ExpressionKind::CharacterLiteral, Leaf::Character(character))
            }
            BareToken::TextLiteral(text) => Expression::text(text),
            BareToken::True => Expression::boolean(true),
            BareToken::False => Expression::boolean(false),
            BareToken::Null => Expression::childless(ExpressionKind::NullLiteral, Leaf::Null),
            BareToken::Identifier(name) => Expression::identifier(name),
            BareToken::OpeningRoundBracket => {
                self.advance();
                let expression = self.parse_expression()?;
                self.consume(BareToken::ClosingRoundBracket)?;
                return Ok(expression);
            }
            BareToken::OpeningCurlyBracket => return self.parse_initializer_list(),
            _ => return Err(self.unexpected(Expected::Category("expression"))),
        };

        self.advance();
        Ok(self.add_expression(expression, span))
    }

    fn parse_initializer_list(&mut self) -> Result<NodeIndex> {
        let start = self.consume(BareToken::OpeningCurlyBracket)?.span;
        let mut children = Vec::new();
        let mut names = Vec::new();

        while self.bare() != BareToken::ClosingCurlyBracket {
            let name = match (self.bare(), self.look_ahead(1)) {
                (BareToken::Identifier(name), BareToken::Colon) => {
                    self.advance();
                    self.advance();
                    Some(name)
                }
                _ => None,
            };

            names.push(name);
            children.push(self.parse_assignment()?);

            if !self.maybe_consume(BareToken::Comma) {
                break;
            }
        }

        self.consume(BareToken::ClosingCurlyBracket)?;

        let names = names.iter().any(Option::is_some).then_some(names);
        let aggregate = Aggregate { children, names, references: None };
        let span = self.span_from(start);
        Ok(self.add_expression(Expression::aggregate(ExpressionKind::InitializerList, aggregate), span))
    }
}
