//! Attributes like `@inline` or `@deprecated("use g")`.
//!
//! Attributes are stored in the [`AttributeRegistry`] of the session at the moment
//! they are parsed, independently of whether the [`AttributeClause`] of their node
//! accepts them. At the end of compilation, the registry reports every attribute
//! that no one asked for.

use diagnostics::{Class, Diagnostic, Engine, error::Result};
use span::Location;
use std::{cell::RefCell, fmt};
use utility::{Atom, QuoteExt, SmallVec};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, index_map::Index)]
pub struct AttributeIndex(u32);

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Attribute {
    pub name: Atom,
    pub arguments: Arguments,
    /// The location of the `@` and the name.
    pub origin: Location,
    pub used: bool,
}

pub type Arguments = SmallVec<AttributeArgument, 1>;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AttributeArgument {
    Integer(u64),
    Boolean(bool),
    Text(Atom),
    Identifier(Atom),
}

impl AttributeArgument {
    pub const fn kind(self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Boolean(_) => "boolean",
            Self::Text(_) => "text",
            Self::Identifier(_) => "identifier",
        }
    }
}

impl fmt::Display for AttributeArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{:?}", value.to_str()),
            Self::Identifier(name) => write!(f, "{name}"),
        }
    }
}

/// Every attribute registered during a compilation.
#[derive(Default)]
pub struct AttributeRegistry {
    attributes: RefCell<index_map::IndexMap<AttributeIndex, Attribute>>,
}

impl AttributeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: Atom, arguments: Arguments, origin: Location) -> AttributeIndex {
        self.attributes.borrow_mut().insert(Attribute { name, arguments, origin, used: false })
    }

    pub fn get(&self, index: AttributeIndex) -> Attribute {
        self.attributes.borrow()[index].clone()
    }

    pub fn name(&self, index: AttributeIndex) -> Atom {
        self.attributes.borrow()[index].name
    }

    pub fn is_used(&self, index: AttributeIndex) -> bool {
        self.attributes.borrow()[index].used
    }

    pub fn mark_used(&self, index: AttributeIndex) {
        self.attributes.borrow_mut()[index].used = true;
    }

    pub fn len(&self) -> usize {
        self.attributes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Warn about every attribute that was never queried, in the order of registration.
    pub fn report_unused(&self, engine: &Engine) {
        for attribute in self.attributes.borrow().values().filter(|attribute| !attribute.used) {
            Diagnostic::warning()
                .class(Class::UnusedAttribute)
                .message(format!("unused attribute {}", attribute.name.quote()))
                .at(attribute.origin)
                .report(engine);
        }
    }

    /// Forget every attribute.
    pub fn reset(&self) {
        self.attributes.borrow_mut().clear();
    }
}

/// The attributes attached to a single node.
///
/// Names are unique within a clause.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct AttributeClause(Vec<AttributeIndex>);

impl AttributeClause {
    /// Attach an attribute rejecting duplicates.
    ///
    /// On a clash, the attribute already present is kept.
    pub fn add(
        &mut self,
        attribute: AttributeIndex,
        registry: &AttributeRegistry,
        engine: &Engine,
    ) -> Result {
        let name = registry.name(attribute);

        if self.0.iter().any(|&present| registry.name(present) == name) {
            return Err(Diagnostic::error()
                .class(Class::DuplicateAttribute)
                .message(format!("the attribute {} is already present", name.quote()))
                .at(registry.get(attribute).origin)
                .help("remove the duplicate attribute")
                .report(engine));
        }

        self.0.push(attribute);
        Ok(())
    }

    /// Look for an attribute by name marking it as used.
    ///
    /// Returns the arguments of the attribute if present.
    pub fn has(&self, name: Atom, registry: &AttributeRegistry) -> Option<Arguments> {
        let attribute = self.0.iter().copied().find(|&attribute| registry.name(attribute) == name)?;
        registry.mark_used(attribute);
        Some(registry.get(attribute).arguments)
    }

    pub fn iter(&self) -> impl Iterator<Item = AttributeIndex> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod test;
