//! The code generator.
//!
//! Translates every function of the lowered tree into a [`Unit`] of a textual
//! stack-machine assembly. Every expression leaves at most one value on the
//! stack: a value unless its type is `void`. Parameters and locals live in
//! named slots; `store` and `storev` leave the stored value on the stack.
//!
//! The generator expects a tree free of errors. Constructs rejected by the
//! analyzer are internal errors here.

use ast::Tree;
use emitter::Emitter;
use session::Session;
use std::{
    fmt,
    path::{Path, PathBuf},
};
use utility::{Atom, pluralize};

mod emitter;

#[cfg(test)]
mod test;

/// Generate one unit per function of the program, in order.
pub fn generate(tree: &Tree, session: &Session, source_path: &Path) -> Module {
    let mut module = Module::new(source_path.to_owned());

    for &function in tree.functions() {
        let unit = Emitter::new(tree, session, function).emit();
        log::trace!("generated the unit {}", unit.name);
        module.units.push(unit);
    }

    log::debug!(
        "generated {} {} for ‘{}’",
        module.units.len(),
        pluralize!(module.units.len(), "unit"),
        source_path.display(),
    );

    module
}

/// The output of the code generator for a whole program.
pub struct Module {
    /// The root source file the module was generated from.
    pub source: PathBuf,
    pub units: Vec<Unit>,
}

impl Module {
    pub fn new(source: PathBuf) -> Self {
        Self { source, units: Vec::new() }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; generated from {}", self.source.display())?;

        for unit in &self.units {
            writeln!(f)?;
            write!(f, "{unit}")?;
        }

        Ok(())
    }
}

/// The generated code of a single function.
pub struct Unit {
    pub name: Atom,
    text: String,
}

impl Unit {
    /// The assembly text from `.unit` up to and including `.end`.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
