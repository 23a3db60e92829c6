use crate::{Binding, NodeIndex, Type};
use derivation::Str;
use std::collections::BTreeSet;
use utility::{Atom, Str};

/// An expression.
///
/// The shape fixes the number of operands. The bound [`Type`] is absent until
/// the analyzer has visited the expression.
#[derive(Clone, Debug)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub shape: Shape,
    pub type_: Option<Type>,
    pub lvalue: bool,
    /// Whether the expression can be evaluated at compile time.
    ///
    /// Derived from the operands when the expression is added to the tree.
    pub const_expr: bool,
    /// Whether this identifier names a label rather than a value.
    pub is_label_ref: bool,
    /// Free-form tags marking the expression for later lookup.
    pub decorations: BTreeSet<Str>,
}

impl Expression {
    pub fn new(kind: ExpressionKind, shape: Shape) -> Self {
        Self {
            kind,
            shape,
            type_: None,
            lvalue: false,
            const_expr: kind.is_constant_leaf(),
            is_label_ref: false,
            decorations: BTreeSet::new(),
        }
    }

    pub fn childless(kind: ExpressionKind, leaf: Leaf) -> Self {
        Self::new(kind, Shape::Childless(leaf))
    }

    pub fn unary(kind: ExpressionKind, operand: NodeIndex) -> Self {
        Self::new(kind, Shape::Unary(operand))
    }

    pub fn binary(kind: ExpressionKind, left: NodeIndex, right: NodeIndex) -> Self {
        Self::new(kind, Shape::Binary([left, right]))
    }

    pub fn ternary(kind: ExpressionKind, operands: [NodeIndex; 3]) -> Self {
        Self::new(kind, Shape::Ternary(operands))
    }

    pub fn aggregate(kind: ExpressionKind, aggregate: Aggregate) -> Self {
        Self::new(kind, Shape::Aggregate(aggregate))
    }

    pub fn identifier(name: Atom) -> Self {
        Self::childless(ExpressionKind::Identifier, Leaf::Identifier { name, binding: None })
    }

    pub fn integer(value: u64) -> Self {
        Self::childless(ExpressionKind::IntegerLiteral, Leaf::Integer(value))
    }

    pub fn boolean(value: bool) -> Self {
        Self::childless(ExpressionKind::BooleanLiteral, Leaf::Boolean(value))
    }

    pub fn text(value: Atom) -> Self {
        Self::childless(ExpressionKind::TextLiteral, Leaf::Text(value))
    }

    #[must_use]
    pub fn typed(mut self, type_: Type) -> Self {
        self.type_ = Some(type_);
        self
    }

    #[must_use]
    pub fn decorated(mut self, decoration: impl Into<Str>) -> Self {
        self.decorations.insert(decoration.into());
        self
    }

    pub fn is_decorated(&self, decoration: &str) -> bool {
        self.decorations.contains(decoration)
    }

    pub fn leaf(&self) -> Option<&Leaf> {
        match &self.shape {
            Shape::Childless(leaf) => Some(leaf),
            _ => None,
        }
    }

    /// The name of an identifier expression.
    pub fn name(&self) -> Option<Atom> {
        match self.leaf()? {
            &Leaf::Identifier { name, .. } => Some(name),
            _ => None,
        }
    }

    /// What an identifier expression was resolved to.
    pub fn binding(&self) -> Option<Binding> {
        match self.leaf()? {
            &Leaf::Identifier { binding, .. } => binding,
            _ => None,
        }
    }

    pub fn operands(&self) -> &[NodeIndex] {
        self.shape.children()
    }
}

/// Marks the step expression of a `for` loop.
pub const LOOP_INCREMENT: &str = "loop-increment";
/// Marks the condition of a `for` loop.
pub const LOOP_CONDITION: &str = "loop-condition";

/// The arity-fixing part of an [`Expression`].
#[derive(Clone, Debug)]
pub enum Shape {
    Childless(Leaf),
    Unary(NodeIndex),
    Binary([NodeIndex; 2]),
    Ternary([NodeIndex; 3]),
    Aggregate(Aggregate),
}

impl Shape {
    pub fn children(&self) -> &[NodeIndex] {
        match self {
            Self::Childless(_) => &[],
            Self::Unary(operand) => std::slice::from_ref(operand),
            Self::Binary(operands) => operands,
            Self::Ternary(operands) => operands,
            Self::Aggregate(aggregate) => &aggregate.children,
        }
    }

    pub fn children_mut(&mut self) -> &mut [NodeIndex] {
        match self {
            Self::Childless(_) => &mut [],
            Self::Unary(operand) => std::slice::from_mut(operand),
            Self::Binary(operands) => operands,
            Self::Ternary(operands) => operands,
            Self::Aggregate(aggregate) => &mut aggregate.children,
        }
    }

    /// The fixed number of children, `None` for aggregates.
    pub fn arity(&self) -> Option<usize> {
        match self {
            Self::Childless(_) => Some(0),
            Self::Unary(_) => Some(1),
            Self::Binary(_) => Some(2),
            Self::Ternary(_) => Some(3),
            Self::Aggregate(_) => None,
        }
    }
}

/// The payload of a childless expression.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Leaf {
    Integer(u64),
    Boolean(bool),
    Character(char),
    Text(Atom),
    Null,
    Identifier { name: Atom, binding: Option<Binding> },
    /// The operand of `sizeof(TYPE)`.
    Type(Type),
}

/// The operands of a variable-arity expression.
///
/// Initializer lists may name their members and argument lists tag each argument
/// with the way it is passed.
#[derive(Clone, Default, Debug)]
pub struct Aggregate {
    pub children: Vec<NodeIndex>,
    pub names: Option<Vec<Option<Atom>>>,
    pub references: Option<Vec<ReferenceKind>>,
}

impl Aggregate {
    pub fn new(children: Vec<NodeIndex>) -> Self {
        Self {
            children,
            names: None,
            references: None,
        }
    }

    pub fn name(&self, index: usize) -> Option<Atom> {
        self.names.as_ref()?.get(index).copied().flatten()
    }

    pub fn reference(&self, index: usize) -> ReferenceKind {
        self.references
            .as_ref()
            .and_then(|references| references.get(index).copied())
            .unwrap_or_default()
    }

    /// Replace the whole sequence of children keeping the names and reference kinds
    /// aligned with it.
    pub(crate) fn replace(&mut self, children: &[NodeIndex]) {
        self.children = children.to_vec();

        if let Some(names) = &mut self.names {
            names.resize(children.len(), None);
        }
        if let Some(references) = &mut self.references {
            references.resize(children.len(), ReferenceKind::Value);
        }
    }
}

/// How an argument is passed to a parameter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Str)]
#[format(dash_case)]
pub enum ReferenceKind {
    /// By value.
    #[default]
    Value,
    /// By reference, written `ref`.
    Reference,
    /// By reference to be written to, written `out`.
    Output,
}

impl ReferenceKind {
    /// The keyword introducing the passing mode, if any.
    pub const fn keyword(self) -> Option<&'static str> {
        match self {
            Self::Value => None,
            Self::Reference => Some("ref"),
            Self::Output => Some("out"),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Str)]
#[format(dash_case)]
pub enum ExpressionKind {
    IntegerLiteral,
    BooleanLiteral,
    CharacterLiteral,
    TextLiteral,
    NullLiteral,
    Identifier,
    SizeOf,
    SizeOfType,
    NameOf,
    Cast,
    Call,
    ArgumentList,
    InitializerList,
    Index,
    Member,
    PointerMember,
    Scope,
    Conditional,
    Comma,
    Negate,
    Plus,
    BitwiseNot,
    LogicalNot,
    AddressOf,
    Dereference,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    ShiftLeft,
    ShiftRight,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    LogicalAnd,
    LogicalOr,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Assign,
    AddAssign,
    SubtractAssign,
    MultiplyAssign,
    DivideAssign,
    RemainderAssign,
    ShiftLeftAssign,
    ShiftRightAssign,
    BitwiseAndAssign,
    BitwiseOrAssign,
    BitwiseXorAssign,
}

impl ExpressionKind {
    pub const fn is_literal(self) -> bool {
        matches!(
            self,
            Self::IntegerLiteral
                | Self::BooleanLiteral
                | Self::CharacterLiteral
                | Self::TextLiteral
                | Self::NullLiteral
        )
    }

    /// Whether a childless expression of this kind is known at compile time.
    pub const fn is_constant_leaf(self) -> bool {
        self.is_literal() || matches!(self, Self::SizeOfType)
    }

    pub const fn is_assignment(self) -> bool {
        matches!(self, Self::Assign) || self.compound_operator().is_some()
    }

    /// The operator a compound assignment applies, e.g. `Add` for `AddAssign`.
    pub const fn compound_operator(self) -> Option<Self> {
        Some(match self {
            Self::AddAssign => Self::Add,
            Self::SubtractAssign => Self::Subtract,
            Self::MultiplyAssign => Self::Multiply,
            Self::DivideAssign => Self::Divide,
            Self::RemainderAssign => Self::Remainder,
            Self::ShiftLeftAssign => Self::ShiftLeft,
            Self::ShiftRightAssign => Self::ShiftRight,
            Self::BitwiseAndAssign => Self::BitwiseAnd,
            Self::BitwiseOrAssign => Self::BitwiseOr,
            Self::BitwiseXorAssign => Self::BitwiseXor,
            _ => return None,
        })
    }

    /// Arithmetic and bitwise operators on integers.
    pub const fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Self::Add
                | Self::Subtract
                | Self::Multiply
                | Self::Divide
                | Self::Remainder
                | Self::ShiftLeft
                | Self::ShiftRight
                | Self::BitwiseAnd
                | Self::BitwiseOr
                | Self::BitwiseXor
        )
    }

    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::NotEqual
                | Self::Less
                | Self::LessEqual
                | Self::Greater
                | Self::GreaterEqual
        )
    }

    pub const fn is_increment(self) -> bool {
        matches!(
            self,
            Self::PreIncrement | Self::PreDecrement | Self::PostIncrement | Self::PostDecrement
        )
    }

    /// The source representation of operators.
    pub const fn symbol(self) -> Option<&'static str> {
        Some(match self {
            Self::Negate | Self::Subtract => "-",
            Self::Plus | Self::Add => "+",
            Self::BitwiseNot => "~",
            Self::LogicalNot => "!",
            Self::AddressOf | Self::BitwiseAnd => "&",
            Self::Dereference | Self::Multiply => "*",
            Self::PreIncrement | Self::PostIncrement => "++",
            Self::PreDecrement | Self::PostDecrement => "--",
            Self::Divide => "/",
            Self::Remainder => "%",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
            Self::BitwiseOr => "|",
            Self::BitwiseXor => "^",
            Self::LogicalAnd => "&&",
            Self::LogicalOr => "||",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::Assign => "=",
            Self::AddAssign => "+=",
            Self::SubtractAssign => "-=",
            Self::MultiplyAssign => "*=",
            Self::DivideAssign => "/=",
            Self::RemainderAssign => "%=",
            Self::ShiftLeftAssign => "<<=",
            Self::ShiftRightAssign => ">>=",
            Self::BitwiseAndAssign => "&=",
            Self::BitwiseOrAssign => "|=",
            Self::BitwiseXorAssign => "^=",
            Self::Member => ".",
            Self::PointerMember => "->",
            Self::Scope => "::",
            Self::Comma => ",",
            _ => return None,
        })
    }
}
