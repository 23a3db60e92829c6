use crate::NodeIndex;
use utility::{Atom, HashSet};

/// The payload of an `asm` statement.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct InlineAsmBlock {
    /// The assembly text. Symbols are referenced as `{name}`.
    pub template: Atom,
    /// Registers to be saved before and restored after the block.
    pub preserve: Vec<Atom>,
    /// Registers the block may clobber without them being saved.
    pub ignore: Vec<Atom>,
    /// One identifier expression per symbol reference, in template order.
    pub symbols: Vec<NodeIndex>,
}

impl InlineAsmBlock {
    pub fn new(template: Atom) -> Self {
        Self { template, preserve: Vec::new(), ignore: Vec::new(), symbols: Vec::new() }
    }

    /// The registers to save around the block.
    ///
    /// A register both preserved and ignored is not saved.
    pub fn saved_registers(&self) -> impl Iterator<Item = Atom> + '_ {
        let ignored: HashSet<_> = self.ignore.iter().copied().collect();
        let mut seen = HashSet::default();

        self.preserve
            .iter()
            .copied()
            .filter(move |register| !ignored.contains(register) && seen.insert(*register))
    }

    /// The names referenced as `{name}` in the template, in order.
    pub fn referenced_symbols(template: &str) -> Vec<&str> {
        let mut symbols = Vec::new();
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            let after = &rest[start + 1..];
            let Some(end) = after.find('}') else { break };
            let name = after[..end].trim();
            if !name.is_empty() {
                symbols.push(name);
            }
            rest = &after[end + 1..];
        }

        symbols
    }

    /// Rewrite `{name}` references to the form `[name]` expected by the assembler.
    pub fn expand_template(&self) -> String {
        let template = self.template.to_str();
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            result += &rest[..start];
            let after = &rest[start + 1..];
            match after.find('}') {
                Some(end) => {
                    result += "[";
                    result += after[..end].trim();
                    result += "]";
                    rest = &after[end + 1..];
                }
                None => {
                    result += &rest[start..];
                    rest = "";
                }
            }
        }

        result += rest;
        result
    }
}
