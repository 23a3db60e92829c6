//! The lowering stage.
//!
//! Passes rewriting the analyzed tree in place into the subset of the language
//! the code generator understands:
//!
//! * [`Expand`] desugars `nameof`, `sizeof`, increments and compound assignments
//! * [`O0`] removes placeholders and makes implicit returns explicit

use ast::{NodeIndex, Tree};
use session::Session;

pub use expand::Expand;
pub use o0::O0;

mod expand;
mod o0;

#[cfg(test)]
mod test;

/// A rewrite of the whole tree.
pub trait Pass {
    fn name(&self) -> &'static str;

    fn run(&mut self, tree: &mut Tree, session: &Session);
}

/// Run the mandatory passes in order.
pub fn lower(tree: &mut Tree, session: &Session) {
    let passes: [&mut dyn Pass; 2] = [&mut Expand::default(), &mut O0::default()];

    for pass in passes {
        log::debug!("running the pass {}", pass.name());
        pass.run(tree, session);
    }
}

/// Every node below the given one in pre-order.
fn descendants(tree: &Tree, node: NodeIndex) -> Vec<NodeIndex> {
    let mut nodes = Vec::new();
    let mut stack: Vec<_> = tree.children(node).collect();
    stack.reverse();

    while let Some(node) = stack.pop() {
        nodes.push(node);
        let start = stack.len();
        stack.extend(tree.children(node));
        stack[start..].reverse();
    }

    nodes
}
