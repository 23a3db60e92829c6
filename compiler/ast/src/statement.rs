use crate::{InlineAsmBlock, NodeIndex, Scope, Type};
use derivation::Str;
use std::fmt;
use utility::Atom;

/// A statement.
///
/// Every statement opens a lexical scope. Variables declared by `var` statements
/// are bound in the scope of the nearest scope node above them.
#[derive(Clone, Debug)]
pub struct Statement {
    pub kind: StatementKind,
    pub expressions: Vec<NodeIndex>,
    pub statements: Vec<NodeIndex>,
    pub objects: Vec<StatementObject>,
    /// Permissions this statement grants to itself and the statements nested in it.
    pub flags: ScopeFlags,
    pub scope: Scope,
}

impl Statement {
    pub fn new(kind: StatementKind) -> Self {
        Self {
            kind,
            expressions: Vec::new(),
            statements: Vec::new(),
            objects: Vec::new(),
            flags: ScopeFlags::empty(),
            scope: Scope::default(),
        }
    }

    #[must_use]
    pub fn with_expressions(mut self, expressions: Vec<NodeIndex>) -> Self {
        self.expressions = expressions;
        self
    }

    #[must_use]
    pub fn with_statements(mut self, statements: Vec<NodeIndex>) -> Self {
        self.statements = statements;
        self
    }

    #[must_use]
    pub fn with_object(mut self, object: StatementObject) -> Self {
        self.objects.push(object);
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: ScopeFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn asm(&self) -> Option<&InlineAsmBlock> {
        self.objects.iter().find_map(|object| match object {
            StatementObject::Asm(block) => Some(block),
            _ => None,
        })
    }

    pub fn asm_mut(&mut self) -> Option<&mut InlineAsmBlock> {
        self.objects.iter_mut().find_map(|object| match object {
            StatementObject::Asm(block) => Some(block),
            _ => None,
        })
    }

    pub fn label(&self) -> Option<Label> {
        self.objects.iter().find_map(|object| match *object {
            StatementObject::Label(label) => Some(label),
            _ => None,
        })
    }

    pub fn variable(&self) -> Option<&Variable> {
        self.objects.iter().find_map(|object| match object {
            StatementObject::Variable(variable) => Some(variable),
            _ => None,
        })
    }

    pub fn variable_mut(&mut self) -> Option<&mut Variable> {
        self.objects.iter_mut().find_map(|object| match object {
            StatementObject::Variable(variable) => Some(variable),
            _ => None,
        })
    }

    pub fn case_value(&self) -> Option<Literal> {
        self.objects.iter().find_map(|object| match *object {
            StatementObject::CaseValue(value) => Some(value),
            _ => None,
        })
    }

    /// Whether a jump leaves the statement unconditionally.
    pub fn diverges(&self) -> bool {
        matches!(
            self.kind,
            StatementKind::Return
                | StatementKind::Break
                | StatementKind::Continue
                | StatementKind::Goto
        )
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Str)]
#[format(dash_case)]
pub enum StatementKind {
    /// `{ ... }`.
    Block,
    /// `NAME:`. Carries a [`Label`].
    Label,
    /// Condition, then-block and optionally an else-statement.
    If,
    /// Condition and body.
    While,
    /// Body and condition.
    DoWhile,
    /// An initializer statement and a body. The condition and the step are
    /// [decorated](crate::Expression::decorations) expressions.
    For,
    /// Scrutinee and a block of case statements.
    Switch,
    /// Carries the [`Literal`] matched. The statements up to the next case form its body.
    Case,
    Default,
    Break,
    Continue,
    /// The label referenced as an identifier expression.
    Goto,
    Return,
    /// Carries an [`InlineAsmBlock`].
    Asm,
    /// Carries a [`Variable`] and optionally the initializing expression.
    VariableInit,
    Expression,
    Assert,
    /// The empty statement.
    Placeholder,
}

bitflags::bitflags! {
    /// Control-flow permissions of statements.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
    pub struct ScopeFlags: u8 {
        const BREAK = 1 << 0;
        const CONTINUE = 1 << 1;
        const CASE = 1 << 2;
    }
}

/// The typed payload of a statement.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum StatementObject {
    CaseValue(Literal),
    Label(Label),
    Variable(Variable),
    Asm(InlineAsmBlock),
}

/// A jump target, unique by name within its function.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Label {
    pub name: Atom,
    /// The position among the labels of the function.
    pub index: u32,
}

impl Label {
    pub const fn new(name: Atom, index: u32) -> Self {
        Self { name, index }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Variable {
    pub name: Atom,
    /// The declared type. After analysis, the inferred one if none was declared.
    pub type_: Option<Type>,
}

/// A literal that a `switch` can match against.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub enum Literal {
    Integer(i64),
    Character(char),
    Boolean(bool),
}

impl Literal {
    pub fn type_(self) -> Type {
        match self {
            Self::Integer(_) => Type::Int,
            Self::Character(_) => Type::Char,
            Self::Boolean(_) => Type::Bool,
        }
    }

    /// The value as stored on the machine.
    pub fn value(self) -> i64 {
        match self {
            Self::Integer(value) => value,
            Self::Character(character) => i64::from(u32::from(character)),
            Self::Boolean(value) => i64::from(value),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Character(character) => write!(f, "{character:?}"),
            Self::Boolean(value) => write!(f, "{value}"),
        }
    }
}
