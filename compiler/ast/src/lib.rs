//! The syntax tree of Food.
//!
//! Nodes live in an arena owned by the [`Tree`] and refer to each other through
//! [`NodeIndex`]es. Every node but the program root records its parent, and the
//! parent lists it among its [children](Tree::children). Every mutating operation
//! of the tree keeps those two relations in agreement.

use diagnostics::error::Result;
use index_map::IndexMap;
use span::Location;
use std::{fmt, iter::Flatten};
use utility::{Atom, HashMap};

pub use asm::InlineAsmBlock;
pub use attribute::{
    Arguments, Attribute, AttributeArgument, AttributeClause, AttributeIndex, AttributeRegistry,
};
pub use expression::{
    Aggregate, Expression, ExpressionKind, LOOP_CONDITION, LOOP_INCREMENT, Leaf, ReferenceKind,
    Shape,
};
pub use statement::{Label, Literal, ScopeFlags, Statement, StatementKind, StatementObject, Variable};

mod asm;
mod attribute;
mod expression;
mod render;
mod statement;

/// The identity of a node within its tree.
///
/// Handed out in increasing order and never reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, index_map::Index)]
pub struct NodeIndex(u32);

impl fmt::Debug for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub parent: Option<NodeIndex>,
    pub attributes: AttributeClause,
    pub location: Option<Location>,
    pub bare: BareNode,
}

impl Node {
    /// The lexical scope the node opens, if it is a scope node.
    pub fn scope(&self) -> Option<&Scope> {
        match &self.bare {
            BareNode::Program { scope, .. } => Some(scope),
            BareNode::Function(function) => Some(&function.scope),
            BareNode::Statement(statement) => Some(&statement.scope),
            BareNode::Expression(_) => None,
        }
    }

    pub fn scope_mut(&mut self) -> Option<&mut Scope> {
        match &mut self.bare {
            BareNode::Program { scope, .. } => Some(scope),
            BareNode::Function(function) => Some(&mut function.scope),
            BareNode::Statement(statement) => Some(&mut statement.scope),
            BareNode::Expression(_) => None,
        }
    }
}

#[derive(Clone, Debug)]
pub enum BareNode {
    Program { functions: Vec<NodeIndex>, scope: Scope },
    Function(Function),
    Statement(Statement),
    Expression(Expression),
}

#[derive(Clone, Debug)]
pub struct Function {
    pub name: Atom,
    pub parameters: Vec<Parameter>,
    pub return_type: Type,
    /// The block forming the body. Absent for external declarations.
    pub body: Option<NodeIndex>,
    pub scope: Scope,
    pub properties: FunctionProperties,
}

impl Function {
    pub fn new(name: Atom, parameters: Vec<Parameter>, return_type: Type) -> Self {
        Self {
            name,
            parameters,
            return_type,
            body: None,
            scope: Scope::default(),
            properties: FunctionProperties::default(),
        }
    }

    /// The signature as written in source, e.g. `fn f(ref x: int) -> bool`.
    pub fn signature(&self) -> String {
        let mut signature = format!("fn {}(", self.name);

        for (index, parameter) in self.parameters.iter().enumerate() {
            if index != 0 {
                signature += ", ";
            }
            if let Some(keyword) = parameter.mode.keyword() {
                signature += keyword;
                signature += " ";
            }
            signature += &format!("{}: {}", parameter.name, parameter.type_);
        }

        signature += ")";

        if self.return_type != Type::Void {
            signature += &format!(" -> {}", self.return_type);
        }

        signature
    }
}

/// What the analyzer learned from the attributes of a function.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct FunctionProperties {
    pub inline: bool,
    pub export: bool,
    /// Set if the function is deprecated, together with the optional reason.
    pub deprecated: Option<Option<Atom>>,
}

#[derive(Clone, Debug)]
pub struct Parameter {
    pub name: Atom,
    pub type_: Type,
    pub mode: ReferenceKind,
    pub location: Option<Location>,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Type {
    Void,
    Bool,
    Int,
    UInt,
    Char,
    Text,
    Pointer(Box<Type>),
    Array(Box<Type>, u32),
}

impl Type {
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Int | Self::UInt | Self::Char)
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Self::Pointer(_))
    }

    /// The size in bytes of a value of this type.
    ///
    /// Returns `None` if the size of an array does not fit into 64 bits.
    pub fn size(&self) -> Option<u64> {
        Some(match self {
            Self::Void => 0,
            Self::Bool => 1,
            Self::Char => 4,
            Self::Int | Self::UInt | Self::Pointer(_) => 8,
            Self::Text => 16,
            Self::Array(element, length) => element.size()?.checked_mul(u64::from(*length))?,
        })
    }

    /// Whether a value of type `other` may be stored in a location of this type.
    ///
    /// `null` is represented by a pointer to `void` and fits every pointer.
    pub fn accepts(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Pointer(_), Self::Pointer(pointee)) if **pointee == Self::Void => true,
            (Self::Int | Self::UInt, Self::Int | Self::UInt) => true,
            (this, other) => this == other,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => f.write_str("void"),
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::UInt => f.write_str("uint"),
            Self::Char => f.write_str("char"),
            Self::Text => f.write_str("text"),
            Self::Pointer(pointee) => write!(f, "*{pointee}"),
            Self::Array(element, length) => write!(f, "[{element}; {length}]"),
        }
    }
}

/// The names declared in a lexical scope.
#[derive(Clone, Default, Debug)]
pub struct Scope {
    pub bindings: HashMap<Atom, Binding>,
}

impl Scope {
    /// Bind a name, handing back the previous binding if the name was taken.
    pub fn declare(&mut self, name: Atom, binding: Binding) -> Option<Binding> {
        match self.bindings.get(&name) {
            Some(&previous) => Some(previous),
            None => {
                self.bindings.insert(name, binding);
                None
            }
        }
    }

    pub fn lookup(&self, name: Atom) -> Option<Binding> {
        self.bindings.get(&name).copied()
    }
}

/// What a name refers to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Binding {
    Function(NodeIndex),
    /// The function and the position of the parameter.
    Parameter(NodeIndex, usize),
    /// The declaring `var` statement.
    Variable(NodeIndex),
}

/// The syntax tree of a whole program.
#[derive(Clone)]
pub struct Tree {
    nodes: IndexMap<NodeIndex, Node>,
    root: NodeIndex,
}

impl Tree {
    pub fn new() -> Self {
        let mut nodes = IndexMap::new();
        let root = nodes.insert(Node {
            parent: None,
            attributes: AttributeClause::default(),
            location: None,
            bare: BareNode::Program { functions: Vec::new(), scope: Scope::default() },
        });

        Self { nodes, root }
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn insert(&mut self, bare: BareNode, location: Option<Location>) -> NodeIndex {
        let index = self.nodes.insert(Node {
            parent: None,
            attributes: AttributeClause::default(),
            location,
            bare,
        });

        let children: Vec<_> = self.children(index).collect();
        for child in children {
            self.adopt(index, child);
        }

        index
    }

    fn adopt(&mut self, parent: NodeIndex, child: NodeIndex) {
        let node = &mut self.nodes[child];
        assert!(
            node.parent.is_none() || node.parent == Some(parent),
            "node {child:?} already belongs to {:?}",
            node.parent
        );
        node.parent = Some(parent);
    }

    /// Add an expression taking ownership of its operands.
    ///
    /// For composite expressions, the constness is the conjunction of the operands' one.
    pub fn add_expression(&mut self, mut expression: Expression, location: Option<Location>) -> NodeIndex {
        if expression.shape.arity() != Some(0) {
            expression.const_expr = self.operands_are_constant(&expression);
        }

        self.insert(BareNode::Expression(expression), location)
    }

    pub fn add_statement(&mut self, statement: Statement, location: Option<Location>) -> NodeIndex {
        self.insert(BareNode::Statement(statement), location)
    }

    pub fn add_function(&mut self, function: Function, location: Option<Location>) -> NodeIndex {
        self.insert(BareNode::Function(function), location)
    }

    /// Make the function a top-level declaration of the program.
    pub fn attach_function(&mut self, function: NodeIndex) {
        let root = self.root;
        self.adopt(root, function);

        let BareNode::Program { functions, .. } = &mut self.nodes[root].bare else {
            unreachable!()
        };
        functions.push(function);
    }

    fn operands_are_constant(&self, expression: &Expression) -> bool {
        expression.operands().iter().all(|&operand| self.expression(operand).const_expr)
    }

    pub fn functions(&self) -> &[NodeIndex] {
        self.program().0
    }

    pub fn program(&self) -> (&[NodeIndex], &Scope) {
        match &self.nodes[self.root].bare {
            BareNode::Program { functions, scope } => (functions, scope),
            _ => unreachable!(),
        }
    }

    pub fn program_scope_mut(&mut self) -> &mut Scope {
        match &mut self.nodes[self.root].bare {
            BareNode::Program { scope, .. } => scope,
            _ => unreachable!(),
        }
    }

    pub fn function(&self, node: NodeIndex) -> &Function {
        match &self.nodes[node].bare {
            BareNode::Function(function) => function,
            bare => panic!("{node:?} is not a function but {}", bare.description()),
        }
    }

    pub fn function_mut(&mut self, node: NodeIndex) -> &mut Function {
        match &mut self.nodes[node].bare {
            BareNode::Function(function) => function,
            bare => panic!("{node:?} is not a function but {}", bare.description()),
        }
    }

    pub fn statement(&self, node: NodeIndex) -> &Statement {
        match &self.nodes[node].bare {
            BareNode::Statement(statement) => statement,
            bare => panic!("{node:?} is not a statement but {}", bare.description()),
        }
    }

    pub fn statement_mut(&mut self, node: NodeIndex) -> &mut Statement {
        match &mut self.nodes[node].bare {
            BareNode::Statement(statement) => statement,
            bare => panic!("{node:?} is not a statement but {}", bare.description()),
        }
    }

    pub fn expression(&self, node: NodeIndex) -> &Expression {
        match &self.nodes[node].bare {
            BareNode::Expression(expression) => expression,
            bare => panic!("{node:?} is not an expression but {}", bare.description()),
        }
    }

    pub fn expression_mut(&mut self, node: NodeIndex) -> &mut Expression {
        match &mut self.nodes[node].bare {
            BareNode::Expression(expression) => expression,
            bare => panic!("{node:?} is not an expression but {}", bare.description()),
        }
    }

    pub fn as_statement(&self, node: NodeIndex) -> Option<&Statement> {
        match &self.nodes[node].bare {
            BareNode::Statement(statement) => Some(statement),
            _ => None,
        }
    }

    pub fn as_expression(&self, node: NodeIndex) -> Option<&Expression> {
        match &self.nodes[node].bare {
            BareNode::Expression(expression) => Some(expression),
            _ => None,
        }
    }

    pub fn parent(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.nodes[node].parent
    }

    pub fn location(&self, node: NodeIndex) -> Option<Location> {
        self.nodes[node].location
    }

    /// Add an attribute to the clause of the given node.
    pub fn add_attribute(
        &mut self,
        node: NodeIndex,
        attribute: AttributeIndex,
        registry: &AttributeRegistry,
        engine: &diagnostics::Engine,
    ) -> Result {
        self.nodes[node].attributes.add(attribute, registry, engine)
    }

    /// Query the attribute clause of the given node.
    pub fn has_attribute(
        &self,
        node: NodeIndex,
        name: Atom,
        registry: &AttributeRegistry,
    ) -> Option<Arguments> {
        self.nodes[node].attributes.has(name, registry)
    }

    /// The children of a node in source order.
    ///
    /// The iterator borrows the tree and thus always reflects its current state.
    pub fn children(&self, node: NodeIndex) -> Children<'_> {
        let empty: &[NodeIndex] = &[];

        let parts = match &self.nodes[node].bare {
            BareNode::Program { functions, .. } => [functions.as_slice(), empty, empty],
            BareNode::Function(function) => [function.body.as_slice(), empty, empty],
            BareNode::Statement(statement) => [
                statement.expressions.as_slice(),
                statement.statements.as_slice(),
                statement.asm().map_or(empty, |block| block.symbols.as_slice()),
            ],
            BareNode::Expression(expression) => [expression.operands(), empty, empty],
        };

        parts.into_iter().flatten().copied()
    }

    /// The children of a node which are expressions.
    pub fn children_expressions(&self, node: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.children(node)
            .filter(|&child| matches!(self.nodes[child].bare, BareNode::Expression(_)))
    }

    /// Every expression below the given node in pre-order, excluding the node itself.
    pub fn recursive_children_expressions(&self, node: NodeIndex) -> RecursiveExpressions<'_> {
        RecursiveExpressions { tree: self, stack: self.children_expressions_reversed(node) }
    }

    fn children_expressions_reversed(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<_> = self.children_expressions(node).collect();
        children.reverse();
        children
    }

    /// The ancestors of a node from its parent up to the root.
    pub fn ancestors(&self, node: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        std::iter::successors(self.parent(node), |&node| self.parent(node))
    }

    fn self_and_ancestors(&self, node: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        std::iter::successors(Some(node), |&node| self.parent(node))
    }

    /// The function containing the node, the node itself if it is one.
    pub fn find_nearest_function(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.self_and_ancestors(node)
            .find(|&node| matches!(self.nodes[node].bare, BareNode::Function(_)))
    }

    /// The nearest scope node, the node itself if it opens a scope.
    pub fn find_scope_tree(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.self_and_ancestors(node).find(|&node| self.nodes[node].scope().is_some())
    }

    /// The nearest scope node strictly above the given node.
    pub fn find_nearest_parent_scope(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.ancestors(node).find(|&node| self.nodes[node].scope().is_some())
    }

    /// Whether `node` lies within the subtree rooted at `ancestor`.
    pub fn is_part_of(&self, node: NodeIndex, ancestor: NodeIndex) -> bool {
        self.self_and_ancestors(node).any(|node| node == ancestor)
    }

    /// Look a name up through the chain of scopes enclosing the node.
    pub fn lookup(&self, node: NodeIndex, name: Atom) -> Option<Binding> {
        self.self_and_ancestors(node)
            .filter_map(|node| self.nodes[node].scope())
            .find_map(|scope| scope.lookup(name))
    }

    /// Replace the operands of an expression.
    ///
    /// The number of operands has to match the arity of the expression unless
    /// it is an aggregate. The constness is not re-derived.
    ///
    /// # Panics
    ///
    /// Panics on an arity mismatch.
    pub fn set_children(&mut self, node: NodeIndex, children: &[NodeIndex]) {
        let expression = self.expression_mut(node);

        if let Some(arity) = expression.shape.arity() {
            assert_eq!(
                arity,
                children.len(),
                "{} expression {node:?} takes {arity} operands, got {}",
                expression.kind.name(),
                children.len()
            );
        }

        let previous: Vec<_> = expression.operands().to_vec();
        match &mut expression.shape {
            Shape::Aggregate(aggregate) => aggregate.replace(children),
            shape => shape.children_mut().copy_from_slice(children),
        }

        self.rehome(node, &previous, children);
    }

    pub fn set_statements(&mut self, node: NodeIndex, statements: Vec<NodeIndex>) {
        let previous = std::mem::replace(&mut self.statement_mut(node).statements, statements.clone());
        self.rehome(node, &previous, &statements);
    }

    pub fn set_expressions(&mut self, node: NodeIndex, expressions: Vec<NodeIndex>) {
        let previous =
            std::mem::replace(&mut self.statement_mut(node).expressions, expressions.clone());
        self.rehome(node, &previous, &expressions);
    }

    /// Set the body of a function.
    pub fn set_body(&mut self, function: NodeIndex, body: NodeIndex) {
        let previous = self.function_mut(function).body.replace(body);
        self.rehome(function, previous.as_slice(), &[body]);
    }

    fn rehome(&mut self, parent: NodeIndex, previous: &[NodeIndex], current: &[NodeIndex]) {
        for &child in previous {
            if !current.contains(&child) {
                self.nodes[child].parent = None;
            }
        }
        for &child in current {
            self.nodes[child].parent = Some(parent);
        }
    }

    /// Put `new` into the place `old` occupies in its parent.
    ///
    /// The old node is detached and kept in the arena.
    ///
    /// # Panics
    ///
    /// Panics if `old` is the root or if `new` belongs to another parent.
    pub fn replace(&mut self, old: NodeIndex, new: NodeIndex) {
        let Some(parent) = self.parent(old) else {
            panic!("the root {old:?} cannot be replaced");
        };
        if let Some(owner) = self.parent(new) {
            assert_eq!(owner, old, "node {new:?} already belongs to {owner:?}");
        }

        self.substitute(parent, old, new);
        self.nodes[old].parent = None;
        self.nodes[new].parent = Some(parent);
    }

    /// Put a new expression built around `node` into the place `node` occupies.
    ///
    /// The builder receives `node` which has to end up among the operands of the
    /// wrapper. Returns the wrapper.
    pub fn wrap(
        &mut self,
        node: NodeIndex,
        location: Option<Location>,
        build: impl FnOnce(NodeIndex) -> Expression,
    ) -> NodeIndex {
        let parent = self.parent(node);
        let wrapper = self.nodes.insert(Node {
            parent,
            attributes: AttributeClause::default(),
            location,
            bare: BareNode::Expression(build(node)),
        });

        if let Some(parent) = parent {
            self.substitute(parent, node, wrapper);
        }

        let children: Vec<_> = self.children(wrapper).collect();
        assert!(children.contains(&node), "the wrapper {wrapper:?} does not contain {node:?}");
        self.nodes[node].parent = None;
        for child in children {
            self.adopt(wrapper, child);
        }

        self.rederive_const_expr(wrapper);
        wrapper
    }

    fn substitute(&mut self, parent: NodeIndex, old: NodeIndex, new: NodeIndex) {
        let substitute = |slot: &mut NodeIndex| {
            if *slot == old {
                *slot = new;
            }
        };

        match &mut self.nodes[parent].bare {
            BareNode::Program { functions, .. } => functions.iter_mut().for_each(substitute),
            BareNode::Function(function) => function.body.iter_mut().for_each(substitute),
            BareNode::Statement(statement) => {
                statement.expressions.iter_mut().for_each(substitute);
                statement.statements.iter_mut().for_each(substitute);
                if let Some(block) = statement.asm_mut() {
                    block.symbols.iter_mut().for_each(substitute);
                }
            }
            BareNode::Expression(expression) => {
                expression.shape.children_mut().iter_mut().for_each(substitute);
            }
        }
    }

    /// Deep-copy the subtree rooted at the given node.
    ///
    /// The copy is detached. Bindings are kept as they are.
    pub fn duplicate(&mut self, node: NodeIndex) -> NodeIndex {
        let original = self.nodes[node].clone();
        let copy = self.nodes.insert(Node { parent: None, ..original });

        let children: Vec<_> = self.children(copy).collect();
        let mut copies = Vec::with_capacity(children.len());
        for child in children {
            let duplicate = self.duplicate(child);
            self.nodes[duplicate].parent = Some(copy);
            copies.push(duplicate);
        }

        let mut copies = copies.into_iter();
        let mut next = |slot: &mut NodeIndex| {
            if let Some(copy) = copies.next() {
                *slot = copy;
            }
        };

        match &mut self.nodes[copy].bare {
            BareNode::Program { .. } => panic!("the program cannot be duplicated"),
            BareNode::Function(function) => function.body.iter_mut().for_each(&mut next),
            BareNode::Statement(statement) => {
                statement.expressions.iter_mut().for_each(&mut next);
                statement.statements.iter_mut().for_each(&mut next);
                if let Some(block) = statement.asm_mut() {
                    block.symbols.iter_mut().for_each(&mut next);
                }
            }
            BareNode::Expression(expression) => {
                expression.shape.children_mut().iter_mut().for_each(&mut next);
            }
        }

        copy
    }

    /// Recompute the constness of an expression and of every expression above it.
    pub fn rederive_const_expr(&mut self, node: NodeIndex) {
        let mut current = Some(node);

        while let Some(node) = current {
            let Some(expression) = self.as_expression(node) else { break };

            let const_expr = match expression.shape.arity() {
                Some(0) => expression.kind.is_constant_leaf(),
                _ => self.operands_are_constant(expression),
            };
            self.expression_mut(node).const_expr = const_expr;

            current = self.parent(node);
        }
    }

    /// Whether `break` is permitted at the given statement.
    pub fn break_allowed(&self, node: NodeIndex) -> bool {
        self.find_flagged_statement(node, ScopeFlags::BREAK).is_some()
    }

    pub fn continue_allowed(&self, node: NodeIndex) -> bool {
        self.find_flagged_statement(node, ScopeFlags::CONTINUE).is_some()
    }

    pub fn case_allowed(&self, node: NodeIndex) -> bool {
        self.find_flagged_statement(node, ScopeFlags::CASE).is_some()
    }

    /// The loop or switch a `break` at the given statement leaves.
    pub fn find_nearest_breakable_statement(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.find_flagged_statement(node, ScopeFlags::BREAK)
    }

    /// The loop a `continue` at the given statement restarts.
    pub fn find_nearest_continuable_statement(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.find_flagged_statement(node, ScopeFlags::CONTINUE)
    }

    pub fn find_nearest_switch(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.find_flagged_statement(node, ScopeFlags::CASE)
    }

    /// Walk up the chain of statements starting at the given one until one sets the flag.
    ///
    /// The chain ends at the first ancestor that is not a statement.
    fn find_flagged_statement(&self, node: NodeIndex, flag: ScopeFlags) -> Option<NodeIndex> {
        self.self_and_ancestors(node)
            .skip_while(|&node| matches!(self.nodes[node].bare, BareNode::Expression(_)))
            .map_while(|node| Some((node, self.as_statement(node)?)))
            .find(|(_, statement)| statement.flags.contains(flag))
            .map(|(node, _)| node)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &Node)> {
        self.nodes.iter()
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<NodeIndex> for Tree {
    type Output = Node;

    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.nodes[index]
    }
}

impl std::ops::IndexMut<NodeIndex> for Tree {
    fn index_mut(&mut self, index: NodeIndex) -> &mut Self::Output {
        &mut self.nodes[index]
    }
}

impl BareNode {
    fn description(&self) -> &'static str {
        match self {
            Self::Program { .. } => "the program",
            Self::Function(_) => "a function",
            Self::Statement(_) => "a statement",
            Self::Expression(_) => "an expression",
        }
    }
}

pub type Children<'a> =
    std::iter::Copied<Flatten<std::array::IntoIter<&'a [NodeIndex], 3>>>;

/// A pre-order walk over the expressions of a subtree.
pub struct RecursiveExpressions<'a> {
    tree: &'a Tree,
    stack: Vec<NodeIndex>,
}

impl Iterator for RecursiveExpressions<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(self.tree.children_expressions_reversed(node));
        Some(node)
    }
}
