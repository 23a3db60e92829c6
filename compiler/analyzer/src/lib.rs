//! The semantic analyzer.
//!
//! Binds names and types, checks where control may flow and queries the
//! attributes known to the language. Every problem is reported to the engine of
//! the session and analysis carries on with the next statement.

use ast::{
    AttributeArgument, Binding, FunctionProperties, Label, Literal, NodeIndex, StatementKind, Tree, Type,
};
use diagnostics::{Class, Diagnostic, error::{ErasedReportedError, Health}};
use session::Session;
use span::Location;
use utility::{Atom, HashMap, HashSet, QuoteExt};

mod constant;
mod expression;
mod statement;

#[cfg(test)]
mod test;

/// Analyze the whole program.
///
/// Returns whether errors were found.
pub fn analyze(tree: &mut Tree, session: &Session) -> bool {
    let mut analyzer = Analyzer {
        tree,
        session,
        context: FunctionContext::default(),
        cases: HashMap::default(),
        health: Health::Untainted,
    };

    analyzer.declare_functions();

    for function in analyzer.tree.functions().to_vec() {
        analyzer.analyze_function(function);
    }

    log::debug!("analyzed {} functions ({:?})", analyzer.tree.functions().len(), analyzer.health);
    analyzer.health.is_tainted()
}

struct Analyzer<'a> {
    tree: &'a mut Tree,
    session: &'a Session,
    context: FunctionContext,
    /// The case values seen so far per `switch`.
    cases: HashMap<NodeIndex, HashSet<Literal>>,
    health: Health,
}

/// What the analyzer tracks while walking the body of a function.
#[derive(Default)]
struct FunctionContext {
    labels: HashMap<Atom, Label>,
    /// The `var` statements in declaration order.
    variables: Vec<NodeIndex>,
    referenced: HashSet<NodeIndex>,
    /// Variables marked `@unused`.
    exempt: HashSet<NodeIndex>,
}

impl Analyzer<'_> {
    fn location(&self, node: NodeIndex) -> Option<Location> {
        self.tree.location(node)
    }

    /// Record the error and give up on typing the current expression.
    fn poison(&mut self, error: ErasedReportedError) -> Option<Type> {
        self.health.taint(error);
        None
    }

    /// Bind every function in the program scope and query its attributes.
    ///
    /// This happens upfront so that functions may be called before their definition.
    fn declare_functions(&mut self) {
        for function in self.tree.functions().to_vec() {
            let name = self.tree.function(function).name;

            if self.tree.program_scope_mut().declare(name, Binding::Function(function)).is_some() {
                let error = Diagnostic::error()
                    .class(Class::DuplicateDefinition)
                    .message(format!("the function {} is defined multiple times", name.quote()))
                    .at_optional(self.location(function))
                    .report(self.session.engine());
                self.health.taint(error);
            }

            self.query_function_attributes(function);
        }
    }

    fn query_function_attributes(&mut self, function: NodeIndex) {
        let registry = self.session.attributes();

        let mut properties = FunctionProperties {
            inline: self.tree.has_attribute(function, Atom::INLINE, registry).is_some(),
            export: self.tree.has_attribute(function, Atom::EXPORT, registry).is_some(),
            deprecated: None,
        };

        if let Some(arguments) = self.tree.has_attribute(function, Atom::DEPRECATED, registry) {
            properties.deprecated = match arguments.as_slice() {
                [] => Some(None),
                &[AttributeArgument::Text(reason)] => Some(Some(reason)),
                arguments => {
                    let origin = self.tree[function]
                        .attributes
                        .iter()
                        .find(|&attribute| registry.name(attribute) == Atom::DEPRECATED)
                        .map(|attribute| registry.get(attribute).origin);

                    let found = match arguments {
                        [AttributeArgument::Text(_), ..] => "several arguments".to_owned(),
                        [argument, ..] => format!("an argument of kind {}", argument.kind()),
                        [] => unreachable!(),
                    };

                    let error = Diagnostic::error()
                        .class(Class::InvalidAttributeArgument)
                        .message(format!(
                            "the attribute {} takes an optional text argument but got {found}",
                            Atom::DEPRECATED.quote()
                        ))
                        .at_optional(origin)
                        .report(self.session.engine());
                    self.health.taint(error);

                    Some(None)
                }
            };
        }

        self.tree.function_mut(function).properties = properties;
    }

    fn analyze_function(&mut self, function: NodeIndex) {
        self.context = FunctionContext::default();
        self.declare_parameters(function);

        let signature = self.tree.function(function);
        let types: Vec<_> = signature
            .parameters
            .iter()
            .map(|parameter| (parameter.type_.clone(), parameter.location))
            .chain([(signature.return_type.clone(), self.location(function))])
            .collect();
        for (type_, location) in types {
            self.check_size(&type_, location);
        }

        let Some(body) = self.tree.function(function).body else { return };

        self.collect_labels(body);
        self.analyze_statement(body);
        self.check_end_of_body(function, body);
        self.report_unused_variables();
    }

    /// Require non-void functions to return before the end of their body.
    fn check_end_of_body(&mut self, function: NodeIndex, body: NodeIndex) {
        let signature = self.tree.function(function);
        if signature.return_type == Type::Void || self.diverges(body) {
            return;
        }

        let error = Diagnostic::error()
            .class(Class::MissingReturnValue)
            .message(format!(
                "the function {} may reach its end without returning a value of type {}",
                signature.name.quote(),
                signature.return_type.clone().quote()
            ))
            .at_optional(self.location(function))
            .report(self.session.engine());
        self.health.taint(error);
    }

    /// Whether control never flows past the given statement.
    fn diverges(&self, node: NodeIndex) -> bool {
        let Some(statement) = self.tree.as_statement(node) else { return false };

        match statement.kind {
            StatementKind::Return => true,
            StatementKind::Block => statement.statements.last().is_some_and(|&last| self.diverges(last)),
            StatementKind::If => match statement.statements[..] {
                [then, otherwise] => self.diverges(then) && self.diverges(otherwise),
                _ => false,
            },
            _ => false,
        }
    }

    /// Reject types whose values or pointees are too large to be addressed.
    fn check_size(&mut self, type_: &Type, location: Option<Location>) {
        if is_measurable(type_) {
            return;
        }

        let error = Diagnostic::error()
            .class(Class::TypeTooLarge)
            .message(format!("the type {} is too large", type_.quote()))
            .at_optional(location)
            .note("the size of a value may not exceed 2^64 bytes")
            .report(self.session.engine());
        self.health.taint(error);
    }

    fn declare_parameters(&mut self, function: NodeIndex) {
        let parameters: Vec<_> = self
            .tree
            .function(function)
            .parameters
            .iter()
            .map(|parameter| (parameter.name, parameter.location))
            .collect();

        for (index, (name, location)) in parameters.into_iter().enumerate() {
            let scope = &mut self.tree.function_mut(function).scope;

            if scope.declare(name, Binding::Parameter(function, index)).is_some() {
                let error = Diagnostic::error()
                    .class(Class::DuplicateDefinition)
                    .message(format!("the parameter {} is defined multiple times", name.quote()))
                    .at_optional(location)
                    .report(self.session.engine());
                self.health.taint(error);
            }
        }
    }

    /// Gather the labels of a function body since `goto` may jump forward.
    fn collect_labels(&mut self, body: NodeIndex) {
        let mut stack = vec![body];

        while let Some(node) = stack.pop() {
            let Some(statement) = self.tree.as_statement(node) else { continue };

            if let Some(label) = statement.label() {
                if self.context.labels.contains_key(&label.name) {
                    let error = Diagnostic::error()
                        .class(Class::DuplicateLabel)
                        .message(format!("the label {} is defined multiple times", label.name.quote()))
                        .at_optional(self.tree.location(node))
                        .report(self.session.engine());
                    self.health.taint(error);
                } else {
                    self.context.labels.insert(label.name, label);
                }
            }

            stack.extend(statement.statements.iter().rev());
        }
    }

    fn report_unused_variables(&mut self) {
        for variable in std::mem::take(&mut self.context.variables) {
            if self.context.referenced.contains(&variable) || self.context.exempt.contains(&variable) {
                continue;
            }

            let Some(declaration) = self.tree.statement(variable).variable() else { continue };

            Diagnostic::warning()
                .class(Class::UnusedVariable)
                .message(format!("the variable {} is never used", declaration.name.quote()))
                .at_optional(self.location(variable))
                .help(format!("mark the variable with {} if this is intended", "@unused".quote()))
                .report(self.session.engine());
        }
    }
}

fn is_measurable(type_: &Type) -> bool {
    type_.size().is_some()
        && match type_ {
            Type::Pointer(inner) | Type::Array(inner, _) => is_measurable(inner),
            _ => true,
        }
}
