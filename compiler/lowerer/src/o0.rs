use crate::{Pass, descendants};
use ast::{NodeIndex, Statement, StatementKind, Tree, Type};
use session::Session;

/// The lowering done without optimizations.
///
/// Drops placeholder statements from statement lists and appends the implicit
/// `return` to functions returning nothing.
#[derive(Default)]
pub struct O0 {
    rewrites: usize,
}

impl Pass for O0 {
    fn name(&self) -> &'static str {
        "o0"
    }

    fn run(&mut self, tree: &mut Tree, _: &Session) {
        self.rewrites = 0;

        for node in descendants(tree, tree.root()) {
            let Some(statement) = tree.as_statement(node) else { continue };

            if matches!(statement.kind, StatementKind::Block | StatementKind::Case | StatementKind::Default) {
                self.remove_placeholders(tree, node);
            }
        }

        for function in tree.functions().to_vec() {
            self.complete_returns(tree, function);
        }

        log::debug!("{} made {} rewrites", self.name(), self.rewrites);
    }
}

impl O0 {
    fn remove_placeholders(&mut self, tree: &mut Tree, node: NodeIndex) {
        let statements = &tree.statement(node).statements;
        let retained: Vec<_> = statements
            .iter()
            .copied()
            .filter(|&statement| tree.statement(statement).kind != StatementKind::Placeholder)
            .collect();

        if retained.len() != statements.len() {
            self.rewrites += statements.len() - retained.len();
            tree.set_statements(node, retained);
        }
    }

    fn complete_returns(&mut self, tree: &mut Tree, function: NodeIndex) {
        let declaration = tree.function(function);
        let Some(body) = declaration.body else { return };
        if declaration.return_type != Type::Void {
            return;
        }

        let mut statements = tree.statement(body).statements.clone();
        let returns = statements
            .last()
            .is_some_and(|&last| tree.statement(last).kind == StatementKind::Return);
        if returns {
            return;
        }

        let location = tree.location(body);
        statements.push(tree.add_statement(Statement::new(StatementKind::Return), location));
        tree.set_statements(body, statements);
        self.rewrites += 1;
    }
}
