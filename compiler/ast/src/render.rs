//! Pretty-printing of subtrees for inspection.

use crate::{
    BareNode, Expression, Leaf, NodeIndex, ScopeFlags, Shape, Statement, StatementKind,
    StatementObject, Tree,
};
use joinery::JoinableIterator;
use std::fmt::Write;

const INDENTATION: usize = 4;

impl Tree {
    /// Render a node and its descendants, one line per node.
    pub fn pretty_print(&self, node: NodeIndex) -> String {
        let mut output = String::new();
        self.render(node, 0, &mut output);
        output
    }

    fn render(&self, node: NodeIndex, depth: usize, output: &mut String) {
        let _ = write!(output, "{:width$}", "", width = depth * INDENTATION);

        match &self[node].bare {
            BareNode::Program { .. } => *output += "program",
            BareNode::Function(function) => {
                *output += "function ";
                *output += function.signature().trim_start_matches("fn ");
                if function.body.is_none() {
                    *output += " extern";
                }
            }
            BareNode::Statement(statement) => render_statement(statement, output),
            BareNode::Expression(expression) => render_expression(expression, output),
        }

        output.push('\n');

        for child in self.children(node) {
            self.render(child, depth + 1, output);
        }
    }
}

fn render_statement(statement: &Statement, output: &mut String) {
    *output += statement.kind.name();

    for object in &statement.objects {
        match object {
            StatementObject::CaseValue(value) => {
                let _ = write!(output, " {value}");
            }
            StatementObject::Label(label) => {
                let arrow = if statement.kind == StatementKind::Goto { " -> " } else { " " };
                let _ = write!(output, "{arrow}{} #{}", label.name, label.index);
            }
            StatementObject::Variable(variable) => {
                let _ = write!(output, " {}", variable.name);
                if let Some(type_) = &variable.type_ {
                    let _ = write!(output, ": {type_}");
                }
            }
            StatementObject::Asm(block) => {
                let _ = write!(output, " {:?}", block.template.to_str());
                if !block.preserve.is_empty() {
                    let _ = write!(output, " preserve({})", block.preserve.iter().join_with(", "));
                }
                if !block.ignore.is_empty() {
                    let _ = write!(output, " ignore({})", block.ignore.iter().join_with(", "));
                }
            }
        }
    }

    if !statement.flags.is_empty() {
        let flags = [
            (ScopeFlags::BREAK, "break"),
            (ScopeFlags::CONTINUE, "continue"),
            (ScopeFlags::CASE, "case"),
        ];
        let flags = flags
            .into_iter()
            .filter(|&(flag, _)| statement.flags.contains(flag))
            .map(|(_, name)| name);
        let _ = write!(output, " [{}]", flags.join_with(", "));
    }
}

fn render_expression(expression: &Expression, output: &mut String) {
    *output += expression.kind.name();

    if let Some(leaf) = expression.leaf() {
        let _ = match leaf {
            Leaf::Integer(value) => write!(output, " {value}"),
            Leaf::Boolean(value) => write!(output, " {value}"),
            Leaf::Character(character) => write!(output, " {character:?}"),
            Leaf::Text(text) => write!(output, " {:?}", text.to_str()),
            Leaf::Null => Ok(()),
            Leaf::Identifier { name, .. } => write!(output, " {name}"),
            Leaf::Type(type_) => write!(output, " {type_}"),
        };
    }

    if let Shape::Aggregate(aggregate) = &expression.shape {
        if let Some(names) = &aggregate.names {
            let names = names.iter().map(|name| name.map_or("_", |name| name.to_str()));
            let _ = write!(output, " names({})", names.join_with(", "));
        }
        if let Some(references) = &aggregate.references {
            let modes = references.iter().map(|mode| mode.name());
            let _ = write!(output, " modes({})", modes.join_with(", "));
        }
    }

    if let Some(type_) = &expression.type_ {
        let _ = write!(output, " : {type_}");
    }
    if expression.const_expr {
        *output += " const";
    }
    if expression.lvalue {
        *output += " lvalue";
    }
    if expression.is_label_ref {
        *output += " label-ref";
    }
    for decoration in &expression.decorations {
        let _ = write!(output, " #{decoration}");
    }
}

#[cfg(test)]
mod test;
