//! The state shared by every phase of a compilation.

use ast::AttributeRegistry;
use derivation::{Elements, FromStr, Str};
use diagnostics::{Engine, Policy};
use span::{SourceFile, SourceFileIndex, SourceMap};
use std::{
    cell::{Ref, RefCell, RefMut},
    path::PathBuf,
    rc::Rc,
};
use utility::{default, paint::ColorChoice};

/// The compilation context.
///
/// Owns the source map, the diagnostic engine and the attribute registry.
/// A session can be [reset](Self::reset) to compile another unit from scratch.
pub struct Session {
    map: Rc<RefCell<SourceMap>>,
    engine: Engine,
    attributes: AttributeRegistry,
    options: Options,
}

impl Session {
    pub fn new(options: Options) -> Self {
        let map: Rc<RefCell<SourceMap>> = default();
        let engine = Engine::new(options.policy.clone(), map.clone()).with_color(options.color);

        Self { map, engine, attributes: default(), options }
    }

    /// A session with default options whose diagnostics are never painted.
    pub fn test() -> Self {
        Self::new(Options { color: ColorChoice::Never, ..default() })
    }

    pub fn map(&self) -> Ref<'_, SourceMap> {
        self.map.borrow()
    }

    pub fn map_mut(&self) -> RefMut<'_, SourceMap> {
        self.map.borrow_mut()
    }

    /// The source file with the given index.
    ///
    /// # Panics
    ///
    /// Panics if the file does not belong to the source map of this session.
    pub fn file(&self, index: SourceFileIndex) -> Ref<'_, SourceFile> {
        Ref::map(self.map(), |map| &map[index])
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn attributes(&self) -> &AttributeRegistry {
        &self.attributes
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Forget all diagnostics and attributes.
    ///
    /// Source files stay loaded since locations handed out earlier point into them.
    pub fn reset(&self) {
        log::debug!("resetting the session");

        self.engine.clear();
        self.attributes.reset();
    }
}

#[derive(Clone, Default, Debug)]
pub struct Options {
    /// Directories searched for included files after the directory of the including file.
    pub include_paths: Vec<PathBuf>,
    pub policy: Policy,
    pub color: ColorChoice,
    /// Hide the timings and the success message.
    pub quiet: bool,
    pub unstable: UnstableOptions,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct UnstableOptions {
    pub emit_tokens: bool,
    pub emit_tree: bool,
    pub emit_lowered_tree: bool,
}

impl UnstableOptions {
    pub fn set(&mut self, option: UnstableOption) {
        match option {
            UnstableOption::EmitTokens => self.emit_tokens = true,
            UnstableOption::EmitTree => self.emit_tree = true,
            UnstableOption::EmitLoweredTree => self.emit_lowered_tree = true,
            UnstableOption::Help => {}
        }
    }
}

/// An option passed via `-Z`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Str, FromStr, Elements)]
#[format(dash_case)]
pub enum UnstableOption {
    EmitTokens,
    EmitTree,
    EmitLoweredTree,
    Help,
}

impl UnstableOption {
    pub const fn description(self) -> &'static str {
        match self {
            Self::EmitTokens => "Print the tokens of the root file",
            Self::EmitTree => "Print the syntax tree after analysis",
            Self::EmitLoweredTree => "Print the syntax tree after lowering",
            Self::Help => "Print help information about unstable options",
        }
    }
}

#[cfg(test)]
mod test;
