use crate::Analyzer;
use ast::{Binding, ExpressionKind, Leaf, NodeIndex, ReferenceKind, Shape, Type};
use diagnostics::{Class, Diagnostic, error::ErasedReportedError};
use utility::{QuoteExt, pluralize};

impl Analyzer<'_> {
    /// Bind the type of an expression and of its operands.
    ///
    /// Yields `None` if the expression is erroneous. The error has been reported by then.
    pub(crate) fn analyze_expression(&mut self, node: NodeIndex) -> Option<Type> {
        let type_ = self.bind_expression(node);

        if let Some(type_) = &type_ {
            self.tree.expression_mut(node).type_ = Some(type_.clone());
        }

        type_
    }

    fn bind_expression(&mut self, node: NodeIndex) -> Option<Type> {
        use ExpressionKind::*;

        let expression = self.tree.expression(node);
        let kind = expression.kind;
        let operands = expression.operands().to_vec();

        match kind {
            IntegerLiteral => Some(Type::Int),
            BooleanLiteral => Some(Type::Bool),
            CharacterLiteral => Some(Type::Char),
            TextLiteral => Some(Type::Text),
            NullLiteral => Some(Type::Pointer(Box::new(Type::Void))),
            Identifier => self.analyze_identifier(node),
            SizeOf => {
                self.analyze_expression(operands[0])?;
                Some(Type::UInt)
            }
            SizeOfType => {
                if let Some(Leaf::Type(type_)) = self.tree.expression(node).leaf() {
                    let type_ = type_.clone();
                    self.check_size(&type_, self.location(node));
                }
                Some(Type::UInt)
            }
            NameOf => {
                self.resolve(operands[0])?;
                Some(Type::Text)
            }
            Cast => self.analyze_cast(node, operands[0]),
            Call => self.analyze_call(node, operands[0], operands[1]),
            ArgumentList => unreachable!("argument list {node:?} outside of a call"),
            InitializerList => {
                let error = Diagnostic::error()
                    .class(Class::InvalidInitializer)
                    .message("an initializer list can only initialize a variable of array type")
                    .at_optional(self.location(node))
                    .report(self.session.engine());
                self.poison(error)
            }
            Index => self.analyze_index(node, operands[0], operands[1]),
            Member | PointerMember | Scope => {
                let error = Diagnostic::error()
                    .class(Class::UnsupportedExpression)
                    .message(format!(
                        "the operator {} is not supported",
                        kind.symbol().unwrap_or_default().quote()
                    ))
                    .at_optional(self.location(node))
                    .report(self.session.engine());
                self.poison(error)
            }
            Conditional => {
                self.analyze_condition(operands[0], false);
                let consequent = self.analyze_expression(operands[1]);
                let alternative = self.analyze_expression(operands[2]);
                let (consequent, alternative) = (consequent?, alternative?);

                if consequent.accepts(&alternative) {
                    Some(consequent)
                } else if alternative.accepts(&consequent) {
                    Some(alternative)
                } else {
                    let error = self.mismatch(operands[2], &consequent, &alternative);
                    self.poison(error)
                }
            }
            Comma => {
                self.analyze_expression(operands[0]);
                self.analyze_expression(operands[1])
            }
            Negate | Plus | BitwiseNot => {
                let type_ = self.analyze_expression(operands[0])?;

                if !type_.is_integer() {
                    let error = self.inapplicable_operator(node, kind, &[&type_]);
                    return self.poison(error);
                }

                Some(type_)
            }
            LogicalNot => {
                let type_ = self.analyze_expression(operands[0])?;

                if type_ != Type::Bool {
                    let error = self.mismatch(operands[0], &Type::Bool, &type_);
                    return self.poison(error);
                }

                Some(Type::Bool)
            }
            AddressOf => {
                let type_ = self.analyze_expression(operands[0])?;

                if !self.tree.expression(operands[0]).lvalue {
                    let error = Diagnostic::error()
                        .class(Class::NotAssignable)
                        .message("cannot take the address of a temporary value")
                        .at_optional(self.location(operands[0]))
                        .report(self.session.engine());
                    return self.poison(error);
                }

                Some(Type::Pointer(Box::new(type_)))
            }
            Dereference => match self.analyze_expression(operands[0])? {
                Type::Pointer(pointee) if *pointee != Type::Void => {
                    self.tree.expression_mut(node).lvalue = true;
                    Some(*pointee)
                }
                type_ => {
                    let error = Diagnostic::error()
                        .class(Class::TypeMismatch)
                        .message(format!("cannot dereference a value of type {}", type_.quote()))
                        .at_optional(self.location(node))
                        .report(self.session.engine());
                    self.poison(error)
                }
            },
            PreIncrement | PreDecrement | PostIncrement | PostDecrement => {
                let type_ = self.analyze_expression(operands[0])?;
                self.require_lvalue(operands[0])?;

                if !type_.is_integer() && !type_.is_pointer() {
                    let error = self.inapplicable_operator(node, kind, &[&type_]);
                    return self.poison(error);
                }

                Some(type_)
            }
            Add | Subtract | Multiply | Divide | Remainder | ShiftLeft | ShiftRight | BitwiseAnd
            | BitwiseOr | BitwiseXor => {
                let left = self.analyze_expression(operands[0]);
                let right = self.analyze_expression(operands[1]);
                self.arithmetic(node, kind, [operands[0], operands[1]], left?, right?)
            }
            Equal | NotEqual | Less | LessEqual | Greater | GreaterEqual => {
                let left = self.analyze_expression(operands[0]);
                let right = self.analyze_expression(operands[1]);
                let (left, right) = (left?, right?);

                let comparable = if left.is_integer() && right.is_integer() {
                    self.unify_integers(node, [operands[0], operands[1]], left.clone(), right.clone());
                    true
                } else if matches!(kind, Equal | NotEqual) {
                    left.accepts(&right) || right.accepts(&left)
                } else {
                    left.is_pointer() && right.is_pointer()
                };

                if !comparable {
                    let error = self.inapplicable_operator(node, kind, &[&left, &right]);
                    return self.poison(error);
                }

                Some(Type::Bool)
            }
            LogicalAnd | LogicalOr => {
                for operand in operands {
                    let Some(type_) = self.analyze_expression(operand) else { continue };

                    if type_ != Type::Bool {
                        let error = self.mismatch(operand, &Type::Bool, &type_);
                        self.health.taint(error);
                    }
                }

                Some(Type::Bool)
            }
            Assign => {
                let target = self.analyze_expression(operands[0]);
                let value = self.analyze_expression(operands[1]);
                let target = target?;
                self.require_lvalue(operands[0])?;
                let value = value?;

                if !target.accepts(&value) {
                    let error = self.mismatch(operands[1], &target, &value);
                    return self.poison(error);
                }

                Some(target)
            }
            AddAssign | SubtractAssign | MultiplyAssign | DivideAssign | RemainderAssign
            | ShiftLeftAssign | ShiftRightAssign | BitwiseAndAssign | BitwiseOrAssign
            | BitwiseXorAssign => {
                let target = self.analyze_expression(operands[0]);
                let value = self.analyze_expression(operands[1]);
                let target = target?;
                self.require_lvalue(operands[0])?;

                let operator = kind.compound_operator()?;
                let result =
                    self.arithmetic(node, operator, [operands[0], operands[1]], target.clone(), value?)?;

                if !target.accepts(&result) {
                    let error = self.mismatch(node, &target, &result);
                    return self.poison(error);
                }

                Some(target)
            }
        }
    }

    /// Resolve an identifier through the scopes enclosing it and record the binding.
    fn resolve(&mut self, node: NodeIndex) -> Option<Binding> {
        let name = self.tree.expression(node).name()?;

        let Some(binding) = self.tree.lookup(node, name) else {
            let error = Diagnostic::error()
                .class(Class::UndefinedName)
                .message(format!("cannot find {} in this scope", name.quote()))
                .at_optional(self.location(node))
                .report(self.session.engine());
            self.health.taint(error);
            return None;
        };

        if let Shape::Childless(Leaf::Identifier { binding: slot, .. }) =
            &mut self.tree.expression_mut(node).shape
        {
            *slot = Some(binding);
        }

        if let Binding::Variable(variable) = binding {
            self.context.referenced.insert(variable);
        }

        Some(binding)
    }

    fn analyze_identifier(&mut self, node: NodeIndex) -> Option<Type> {
        if self.tree.expression(node).is_label_ref {
            return None;
        }

        let type_ = match self.resolve(node)? {
            Binding::Function(function) => {
                let error = Diagnostic::error()
                    .class(Class::TypeMismatch)
                    .message(format!(
                        "the function {} cannot be used as a value",
                        self.tree.function(function).name.quote()
                    ))
                    .at_optional(self.location(node))
                    .report(self.session.engine());
                return self.poison(error);
            }
            Binding::Parameter(function, index) => {
                self.tree.function(function).parameters[index].type_.clone()
            }
            Binding::Variable(variable) => {
                self.tree.statement(variable).variable().and_then(|variable| variable.type_.clone())?
            }
        };

        self.tree.expression_mut(node).lvalue = true;
        Some(type_)
    }

    fn analyze_cast(&mut self, node: NodeIndex, operand: NodeIndex) -> Option<Type> {
        let source = self.analyze_expression(operand)?;
        let target = self.tree.expression(node).type_.clone()?;
        self.check_size(&target, self.location(node));

        let scalar = |type_: &Type| type_.is_integer() || *type_ == Type::Bool;
        let valid = source == target
            || (scalar(&source) && scalar(&target))
            || (source.is_pointer() && (target.is_pointer() || target.is_integer()));

        if !valid {
            let error = Diagnostic::error()
                .class(Class::InvalidCast)
                .message(format!("cannot cast a value of type {} to {}", source.quote(), target.quote()))
                .at_optional(self.location(node))
                .report(self.session.engine());
            return self.poison(error);
        }

        Some(target)
    }

    fn analyze_call(&mut self, node: NodeIndex, callee: NodeIndex, arguments: NodeIndex) -> Option<Type> {
        let function = self.callee(callee);

        let Shape::Aggregate(aggregate) = &self.tree.expression(arguments).shape else {
            unreachable!("the arguments {arguments:?} of a call are not an aggregate")
        };
        let aggregate = aggregate.clone();

        let types: Vec<_> =
            aggregate.children.iter().map(|&argument| self.analyze_expression(argument)).collect();

        let function = self.tree.function(function?).clone();

        if types.len() != function.parameters.len() {
            let error = Diagnostic::error()
                .class(Class::ArgumentCount)
                .message(format!(
                    "the function {} takes {} {} but {} {} supplied",
                    function.name.quote(),
                    function.parameters.len(),
                    pluralize!(function.parameters.len(), "argument"),
                    types.len(),
                    if types.len() == 1 { "was" } else { "were" },
                ))
                .at_optional(self.location(node))
                .note(format!("the signature is {}", function.signature().quote()))
                .report(self.session.engine());
            self.health.taint(error);
            return Some(function.return_type);
        }

        for (index, (&argument, parameter)) in aggregate.children.iter().zip(&function.parameters).enumerate() {
            let mode = aggregate.reference(index);

            if mode != parameter.mode {
                let error = Diagnostic::error()
                    .class(Class::ReferenceKindMismatch)
                    .message(format!(
                        "the parameter {} is passed {} but the argument is passed {}",
                        parameter.name.quote(),
                        describe_passing(parameter.mode),
                        describe_passing(mode),
                    ))
                    .at_optional(self.location(argument))
                    .report(self.session.engine());
                self.health.taint(error);
            } else if let Some(keyword) = mode.keyword() {
                if types[index].is_some() && !self.tree.expression(argument).lvalue {
                    let error = Diagnostic::error()
                        .class(Class::NotAssignable)
                        .message(format!("an argument passed with {} has to be assignable", keyword.quote()))
                        .at_optional(self.location(argument))
                        .report(self.session.engine());
                    self.health.taint(error);
                }
            }
        }

        self.check_argument_types(node, &function, &aggregate.children, &types);

        if let Some(reason) = function.properties.deprecated {
            Diagnostic::warning()
                .class(Class::Deprecated)
                .message(format!("the function {} is deprecated", function.name.quote()))
                .at_optional(self.location(callee))
                .with(|diagnostic| match reason {
                    Some(reason) => diagnostic.note(reason.to_str()),
                    None => diagnostic,
                })
                .report(self.session.engine());
        }

        Some(function.return_type)
    }

    fn callee(&mut self, callee: NodeIndex) -> Option<NodeIndex> {
        let expression = self.tree.expression(callee);

        let description = if expression.kind == ExpressionKind::Identifier {
            let name = expression.name()?;

            match self.resolve(callee)? {
                Binding::Function(function) => return Some(function),
                _ => format!("{} is not a function", name.quote()),
            }
        } else {
            self.analyze_expression(callee);
            "this expression is not a function".to_owned()
        };

        let error = Diagnostic::error()
            .class(Class::NotCallable)
            .message(description)
            .at_optional(self.location(callee))
            .report(self.session.engine());
        self.health.taint(error);
        None
    }

    /// Check the arguments against the parameters.
    ///
    /// The mismatches are reported speculatively and replaced by a single error
    /// naming the signature of the function.
    fn check_argument_types(
        &mut self,
        node: NodeIndex,
        function: &ast::Function,
        arguments: &[NodeIndex],
        types: &[Option<Type>],
    ) {
        let engine = self.session.engine();
        let point = engine.create_restoration_point();
        let mut mismatches = 0;

        for ((&argument, type_), parameter) in arguments.iter().zip(types).zip(&function.parameters) {
            let Some(type_) = type_ else { continue };

            if !parameter.type_.accepts(type_) {
                let _ = self.mismatch(argument, &parameter.type_, type_);
                mismatches += 1;
            }
        }

        if mismatches == 0 {
            return;
        }

        engine.load_restoration_point(point);

        let error = Diagnostic::error()
            .class(Class::TypeMismatch)
            .message(format!(
                "mismatched argument types in the call of {}",
                function.name.quote()
            ))
            .at_optional(self.location(node))
            .note(format!(
                "{mismatches} {} {} not match the signature {}",
                pluralize!(mismatches, "argument"),
                if mismatches == 1 { "does" } else { "do" },
                function.signature().quote(),
            ))
            .report(engine);
        self.health.taint(error);
    }

    fn analyze_index(&mut self, node: NodeIndex, base: NodeIndex, index: NodeIndex) -> Option<Type> {
        let base_type = self.analyze_expression(base);

        if let Some(index_type) = self.analyze_expression(index) {
            if !index_type.is_integer() {
                let error = self.mismatch(index, &Type::Int, &index_type);
                self.health.taint(error);
            }
        }

        let element = match base_type? {
            Type::Array(element, _) => *element,
            Type::Pointer(pointee) if *pointee != Type::Void => *pointee,
            type_ => {
                let error = Diagnostic::error()
                    .class(Class::TypeMismatch)
                    .message(format!("cannot index into a value of type {}", type_.quote()))
                    .at_optional(self.location(base))
                    .report(self.session.engine());
                return self.poison(error);
            }
        };

        self.tree.expression_mut(node).lvalue = true;
        Some(element)
    }

    /// The type of an arithmetic or bitwise operation.
    ///
    /// Pointers may be offset by integers.
    fn arithmetic(
        &mut self,
        node: NodeIndex,
        operator: ExpressionKind,
        operands: [NodeIndex; 2],
        left: Type,
        right: Type,
    ) -> Option<Type> {
        let offset = matches!(operator, ExpressionKind::Add | ExpressionKind::Subtract);

        if left.is_pointer() && right.is_integer() && offset {
            return Some(left);
        }
        if left.is_integer() && right.is_pointer() && operator == ExpressionKind::Add {
            return Some(right);
        }
        if left.is_integer() && right.is_integer() {
            return Some(self.unify_integers(node, operands, left, right));
        }

        let error = self.inapplicable_operator(node, operator, &[&left, &right]);
        self.poison(error)
    }

    /// The common type of two integers.
    ///
    /// Mixing `int` and `uint` is noted unless one side is a constant adopting the
    /// type of the other.
    fn unify_integers(&mut self, node: NodeIndex, operands: [NodeIndex; 2], left: Type, right: Type) -> Type {
        if left == right {
            return left;
        }
        if left == Type::Char {
            return right;
        }
        if right == Type::Char {
            return left;
        }

        let [left_constant, right_constant] =
            operands.map(|operand| self.tree.expression(operand).const_expr);

        if !left_constant && !right_constant {
            Diagnostic::info()
                .class(Class::ImplicitConversion)
                .message(format!("implicit conversion between {} and {}", left.clone().quote(), right.clone().quote()))
                .at_optional(self.location(node))
                .report(self.session.engine());
        }

        if left_constant { right } else { left }
    }

    fn require_lvalue(&mut self, target: NodeIndex) -> Option<()> {
        if self.tree.expression(target).lvalue {
            return Some(());
        }

        let error = Diagnostic::error()
            .class(Class::NotAssignable)
            .message("cannot assign to this expression")
            .at_optional(self.location(target))
            .report(self.session.engine());
        self.health.taint(error);
        None
    }

    pub(crate) fn mismatch(&self, node: NodeIndex, expected: &Type, actual: &Type) -> ErasedReportedError {
        Diagnostic::error()
            .class(Class::TypeMismatch)
            .message(format!("expected a value of type {} but found {}", expected.quote(), actual.quote()))
            .at_optional(self.location(node))
            .report(self.session.engine())
    }

    fn inapplicable_operator(&self, node: NodeIndex, operator: ExpressionKind, types: &[&Type]) -> ErasedReportedError {
        let types = match types {
            [type_] => type_.quote(),
            [left, right] => format!("{} and {}", left.quote(), right.quote()),
            _ => unreachable!(),
        };

        Diagnostic::error()
            .class(Class::TypeMismatch)
            .message(format!(
                "the operator {} cannot be applied to {types}",
                operator.symbol().unwrap_or_default().quote()
            ))
            .at_optional(self.location(node))
            .report(self.session.engine())
    }
}

fn describe_passing(mode: ReferenceKind) -> String {
    match mode.keyword() {
        Some(keyword) => format!("with {}", keyword.quote()),
        None => "by value".to_owned(),
    }
}
