use crate::{Pass, descendants};
use ast::{
    BareNode, Expression, ExpressionKind, LOOP_INCREMENT, Leaf, NodeIndex, StatementKind, Tree, Type,
};
use session::Session;

/// Desugaring of convenience expressions.
///
/// * `nameof(x)` becomes the text literal `"x"`
/// * `sizeof` becomes an integer literal
/// * `x++` and friends in statement position become `x += 1`
/// * `x op= y` becomes `x = x op y` if `x` is an identifier
///
/// Expressions whose type is unknown due to earlier errors are left alone.
#[derive(Default)]
pub struct Expand {
    rewrites: usize,
}

impl Pass for Expand {
    fn name(&self) -> &'static str {
        "expand"
    }

    fn run(&mut self, tree: &mut Tree, _: &Session) {
        self.rewrites = 0;
        let root = tree.root();

        // Operands come first so that rewritten operands are in place before their parent.
        for node in descendants(tree, root).into_iter().rev() {
            if tree.as_expression(node).is_none() || !tree.is_part_of(node, root) {
                continue;
            }

            self.expand(tree, node);
        }

        log::debug!("{} made {} rewrites", self.name(), self.rewrites);
    }
}

impl Expand {
    fn expand(&mut self, tree: &mut Tree, node: NodeIndex) {
        let expression = tree.expression(node);

        match expression.kind {
            ExpressionKind::NameOf => {
                let Some(name) = tree.expression(expression.operands()[0]).name() else { return };
                self.substitute(tree, node, Expression::text(name).typed(Type::Text));
            }
            ExpressionKind::SizeOf | ExpressionKind::SizeOfType => {
                let size = match expression.leaf() {
                    Some(Leaf::Type(type_)) => type_.size(),
                    _ => tree.expression(expression.operands()[0]).type_.as_ref().and_then(Type::size),
                };
                let Some(size) = size else { return };
                let type_ = expression.type_.clone().unwrap_or(Type::UInt);

                self.substitute(tree, node, Expression::integer(size).typed(type_));
            }
            kind if kind.is_increment() && in_statement_position(tree, node) => {
                let node = self.expand_increment(tree, node);
                self.expand_compound_assignment(tree, node);
            }
            kind if kind.compound_operator().is_some() => self.expand_compound_assignment(tree, node),
            _ => {}
        }
    }

    /// Put a new childless expression in the place of the given one.
    fn substitute(&mut self, tree: &mut Tree, node: NodeIndex, mut expression: Expression) {
        let old = tree.expression(node);
        expression.decorations = old.decorations.clone();
        let location = tree.location(node);

        let new = tree.add_expression(expression, location);
        tree.replace(node, new);
        tree.rederive_const_expr(new);
        self.rewrites += 1;
    }

    /// Rewrite `x++` to `x += 1`, yielding the assignment.
    fn expand_increment(&mut self, tree: &mut Tree, node: NodeIndex) -> NodeIndex {
        let expression = tree.expression(node);
        let operand = expression.operands()[0];
        let kind = match expression.kind {
            ExpressionKind::PreIncrement | ExpressionKind::PostIncrement => ExpressionKind::AddAssign,
            _ => ExpressionKind::SubtractAssign,
        };
        let Some(type_) = expression.type_.clone() else { return node };
        let decorations = expression.decorations.clone();
        let location = tree.location(node);

        let target = tree.duplicate(operand);
        let one = tree.add_expression(Expression::integer(1).typed(Type::Int), location);

        let mut assignment = Expression::binary(kind, target, one).typed(type_);
        assignment.decorations = decorations;

        let assignment = tree.add_expression(assignment, location);
        tree.replace(node, assignment);
        tree.rederive_const_expr(assignment);
        self.rewrites += 1;

        assignment
    }

    /// Rewrite `x op= y` to `x = x op y`.
    fn expand_compound_assignment(&mut self, tree: &mut Tree, node: NodeIndex) {
        let expression = tree.expression(node);
        let Some(operator) = expression.kind.compound_operator() else { return };
        let Some(type_) = expression.type_.clone() else { return };
        let &[target, value] = expression.operands() else { return };

        if tree.expression(target).kind != ExpressionKind::Identifier {
            return;
        }

        let location = tree.location(node);
        let copy = tree.duplicate(target);
        tree.wrap(value, location, |value| Expression::binary(operator, copy, value).typed(type_));
        tree.expression_mut(node).kind = ExpressionKind::Assign;
        tree.rederive_const_expr(node);
        self.rewrites += 1;
    }
}

/// Whether the value of the expression is discarded.
fn in_statement_position(tree: &Tree, node: NodeIndex) -> bool {
    if tree.expression(node).is_decorated(LOOP_INCREMENT) {
        return true;
    }

    let Some(parent) = tree.parent(node) else { return false };
    matches!(
        &tree[parent].bare,
        BareNode::Statement(statement) if statement.kind == StatementKind::Expression
    )
}
