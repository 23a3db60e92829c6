use crate::{
    Analyzer,
    constant::{Value, evaluate},
};
use ast::{
    Binding, ExpressionKind, InlineAsmBlock, LOOP_CONDITION, NodeIndex, Shape, StatementKind,
    StatementObject, Type,
};
use diagnostics::{Class, Diagnostic};
use utility::{Atom, QuoteExt};

impl Analyzer<'_> {
    pub(crate) fn analyze_statement(&mut self, node: NodeIndex) {
        let statement = self.tree.statement(node);
        let kind = statement.kind;
        let expressions = statement.expressions.clone();
        let statements = statement.statements.clone();

        match kind {
            StatementKind::Block => self.analyze_statements(&statements),
            StatementKind::Label | StatementKind::Placeholder => {}
            StatementKind::If => {
                self.analyze_condition(expressions[0], true);
                self.analyze_statements(&statements);
            }
            StatementKind::While | StatementKind::DoWhile => {
                self.analyze_condition(expressions[0], false);
                self.analyze_statements(&statements);
            }
            StatementKind::For => {
                self.analyze_statement(statements[0]);

                for expression in expressions {
                    if self.tree.expression(expression).is_decorated(LOOP_CONDITION) {
                        self.analyze_condition(expression, false);
                    } else {
                        self.analyze_expression(expression);
                    }
                }

                self.analyze_statement(statements[1]);
            }
            StatementKind::Switch => {
                if let Some(type_) = self.analyze_expression(expressions[0]) {
                    if !type_.is_integer() && type_ != Type::Bool {
                        let error = Diagnostic::error()
                            .class(Class::TypeMismatch)
                            .message(format!("cannot switch over a value of type {}", type_.quote()))
                            .at_optional(self.location(expressions[0]))
                            .report(self.session.engine());
                        self.health.taint(error);
                    }
                }

                self.analyze_statements(&statements);
            }
            StatementKind::Case | StatementKind::Default => {
                match self.tree.find_nearest_switch(node) {
                    Some(switch) => {
                        if kind == StatementKind::Case {
                            self.check_case(node, switch);
                        }
                    }
                    None => {
                        let error = Diagnostic::error()
                            .class(Class::CaseOutsideSwitch)
                            .message(format!("{} outside of a {}", kind.name().quote(), "switch".quote()))
                            .at_optional(self.location(node))
                            .report(self.session.engine());
                        self.health.taint(error);
                    }
                }

                self.analyze_statements(&statements);
            }
            StatementKind::Break => {
                if !self.tree.break_allowed(node) {
                    let error = Diagnostic::error()
                        .class(Class::BreakOutsideLoop)
                        .message(format!("{} outside of a loop or a {}", "break".quote(), "switch".quote()))
                        .at_optional(self.location(node))
                        .report(self.session.engine());
                    self.health.taint(error);
                }
            }
            StatementKind::Continue => {
                if !self.tree.continue_allowed(node) {
                    let error = Diagnostic::error()
                        .class(Class::ContinueOutsideLoop)
                        .message(format!("{} outside of a loop", "continue".quote()))
                        .at_optional(self.location(node))
                        .report(self.session.engine());
                    self.health.taint(error);
                }
            }
            StatementKind::Goto => self.resolve_label(node, expressions[0]),
            StatementKind::Return => self.analyze_return(node, expressions.first().copied()),
            StatementKind::Asm => {
                let Some(block) = self.tree.statement(node).asm().cloned() else { return };
                self.check_registers(node, &block);

                for symbol in block.symbols {
                    self.analyze_expression(symbol);
                }
            }
            StatementKind::VariableInit => self.analyze_variable(node, expressions.first().copied()),
            StatementKind::Expression => {
                self.analyze_expression(expressions[0]);
            }
            StatementKind::Assert => {
                self.analyze_condition(expressions[0], false);

                if self.tree.expression(expressions[0]).const_expr
                    && evaluate(self.tree, expressions[0]) == Some(Value::Boolean(false))
                {
                    let error = Diagnostic::error()
                        .class(Class::AssertionFailed)
                        .message("this assertion always fails")
                        .at_optional(self.location(node))
                        .report(self.session.engine());
                    self.health.taint(error);
                }
            }
        }
    }

    fn analyze_statements(&mut self, statements: &[NodeIndex]) {
        for &statement in statements {
            self.analyze_statement(statement);
        }
    }

    pub(crate) fn analyze_condition(&mut self, node: NodeIndex, report_constant: bool) {
        let Some(type_) = self.analyze_expression(node) else { return };

        if type_ != Type::Bool {
            let error = self.mismatch(node, &Type::Bool, &type_);
            self.health.taint(error);
            return;
        }

        if report_constant && self.tree.expression(node).const_expr {
            let message = match evaluate(self.tree, node) {
                Some(Value::Boolean(value)) => format!("the condition is always {}", value.quote()),
                _ => "the condition is constant".to_owned(),
            };

            Diagnostic::info()
                .class(Class::ConstantCondition)
                .message(message)
                .at_optional(self.location(node))
                .report(self.session.engine());
        }
    }

    fn check_case(&mut self, node: NodeIndex, switch: NodeIndex) {
        let Some(value) = self.tree.statement(node).case_value() else { return };

        if !self.cases.entry(switch).or_default().insert(value) {
            let error = Diagnostic::error()
                .class(Class::DuplicateCase)
                .message(format!("the case {} is already covered by this switch", value.quote()))
                .at_optional(self.location(node))
                .report(self.session.engine());
            self.health.taint(error);
        }

        let scrutinee = self.tree.statement(switch).expressions[0];
        if let Some(expected) = self.tree.expression(scrutinee).type_.clone() {
            if !expected.accepts(&value.type_()) {
                let error = self.mismatch(node, &expected, &value.type_());
                self.health.taint(error);
            }
        }
    }

    /// Attach the label a `goto` jumps to.
    fn resolve_label(&mut self, node: NodeIndex, target: NodeIndex) {
        let Some(name) = self.tree.expression(target).name() else { return };

        match self.context.labels.get(&name).copied() {
            Some(label) => self.tree.statement_mut(node).objects.push(StatementObject::Label(label)),
            None => {
                let error = Diagnostic::error()
                    .class(Class::UndefinedLabel)
                    .message(format!("there is no label {} in this function", name.quote()))
                    .at_optional(self.location(target))
                    .report(self.session.engine());
                self.health.taint(error);
            }
        }
    }

    fn analyze_return(&mut self, node: NodeIndex, value: Option<NodeIndex>) {
        let Some(function) = self.tree.find_nearest_function(node) else { return };
        let function = self.tree.function(function);
        let name = function.name;
        let expected = function.return_type.clone();

        let error = match (value, expected) {
            (None, Type::Void) => return,
            (None, expected) => Diagnostic::error()
                .class(Class::MissingReturnValue)
                .message(format!(
                    "the function {} has to return a value of type {}",
                    name.quote(),
                    expected.quote()
                ))
                .at_optional(self.location(node))
                .report(self.session.engine()),
            (Some(value), Type::Void) => {
                self.analyze_expression(value);

                Diagnostic::error()
                    .class(Class::UnexpectedReturnValue)
                    .message(format!("the function {} does not return a value", name.quote()))
                    .at_optional(self.location(value))
                    .report(self.session.engine())
            }
            (Some(value), expected) => {
                let Some(actual) = self.analyze_expression(value) else { return };
                if expected.accepts(&actual) {
                    return;
                }
                self.mismatch(value, &expected, &actual)
            }
        };

        self.health.taint(error);
    }

    fn analyze_variable(&mut self, node: NodeIndex, initializer: Option<NodeIndex>) {
        let Some(variable) = self.tree.statement(node).variable().cloned() else { return };
        let name = variable.name;

        let type_ = match (variable.type_, initializer) {
            (declared, Some(initializer))
                if self.tree.expression(initializer).kind == ExpressionKind::InitializerList =>
            {
                self.analyze_initializer_list(initializer, declared.as_ref());
                declared
            }
            (Some(declared), Some(initializer)) => {
                if let Some(actual) = self.analyze_expression(initializer) {
                    if !declared.accepts(&actual) {
                        let error = self.mismatch(initializer, &declared, &actual);
                        self.health.taint(error);
                    }
                }
                Some(declared)
            }
            (None, Some(initializer)) => self.analyze_expression(initializer),
            (declared @ Some(_), None) => declared,
            (None, None) => {
                let error = Diagnostic::error()
                    .class(Class::TypeMismatch)
                    .message(format!("cannot infer the type of the variable {}", name.quote()))
                    .at_optional(self.location(node))
                    .help("add a type annotation or an initializer")
                    .report(self.session.engine());
                self.health.taint(error);
                None
            }
        };

        let type_ = match type_ {
            Some(Type::Void) => {
                let error = Diagnostic::error()
                    .class(Class::TypeMismatch)
                    .message(format!("the variable {} cannot be of type {}", name.quote(), Type::Void.quote()))
                    .at_optional(self.location(node))
                    .report(self.session.engine());
                self.health.taint(error);
                None
            }
            type_ => type_,
        };

        if let Some(type_) = &type_ {
            self.check_size(type_, self.location(node));
        }

        if let Some(variable) = self.tree.statement_mut(node).variable_mut() {
            variable.type_ = type_;
        }

        if let Some(scope) = self.tree.find_nearest_parent_scope(node) {
            let previous = self.tree[scope]
                .scope_mut()
                .and_then(|scope| scope.declare(name, Binding::Variable(node)));

            if previous.is_some() {
                let error = Diagnostic::error()
                    .class(Class::DuplicateDefinition)
                    .message(format!("the variable {} is already defined in this scope", name.quote()))
                    .at_optional(self.location(node))
                    .report(self.session.engine());
                self.health.taint(error);
            }
        }

        self.context.variables.push(node);

        if self.tree.has_attribute(node, Atom::UNUSED, self.session.attributes()).is_some() {
            self.context.exempt.insert(node);
        }
    }

    fn analyze_initializer_list(&mut self, node: NodeIndex, declared: Option<&Type>) {
        let Shape::Aggregate(aggregate) = &self.tree.expression(node).shape else { return };
        let aggregate = aggregate.clone();

        let Some(Type::Array(element, length)) = declared else {
            let error = Diagnostic::error()
                .class(Class::InvalidInitializer)
                .message("an initializer list can only initialize a variable of array type")
                .at_optional(self.location(node))
                .report(self.session.engine());
            self.health.taint(error);
            return;
        };

        if aggregate.names.is_some() {
            let error = Diagnostic::error()
                .class(Class::InvalidInitializer)
                .message("the elements of an array cannot be named")
                .at_optional(self.location(node))
                .report(self.session.engine());
            self.health.taint(error);
        }

        if aggregate.children.len() > *length as usize {
            let error = Diagnostic::error()
                .class(Class::InitializerCount)
                .message(format!(
                    "the initializer list has {} elements but the array only holds {length}",
                    aggregate.children.len(),
                ))
                .at_optional(self.location(node))
                .report(self.session.engine());
            self.health.taint(error);
        }

        for child in aggregate.children {
            let Some(actual) = self.analyze_expression(child) else { continue };

            if !element.accepts(&actual) {
                let error = self.mismatch(child, element, &actual);
                self.health.taint(error);
            }
        }

        self.tree.expression_mut(node).type_ = declared.cloned();
    }

    fn check_registers(&mut self, node: NodeIndex, block: &InlineAsmBlock) {
        for &register in block.preserve.iter().chain(&block.ignore) {
            if !is_register(register) {
                Diagnostic::warning()
                    .class(Class::UnknownRegister)
                    .message(format!("unknown register {}", register.quote()))
                    .at_optional(self.location(node))
                    .help(format!(
                        "the registers are {} to {}, {} and {}",
                        "r0".quote(),
                        "r15".quote(),
                        Atom::SP.quote(),
                        Atom::FP.quote(),
                    ))
                    .report(self.session.engine());
            }
        }

        for register in &block.preserve {
            if block.ignore.contains(register) {
                Diagnostic::warning()
                    .class(Class::ConflictingRegister)
                    .message(format!("the register {} is both preserved and ignored", register.quote()))
                    .at_optional(self.location(node))
                    .report(self.session.engine());
            }
        }
    }
}

fn is_register(name: Atom) -> bool {
    if name == Atom::SP || name == Atom::FP {
        return true;
    }

    let Some(number) = name.to_str().strip_prefix('r') else { return false };

    !number.is_empty()
        && number.bytes().all(|byte| byte.is_ascii_digit())
        && (number.len() == 1 || !number.starts_with('0'))
        && number.parse::<u8>().is_ok_and(|number| number < 16)
}
