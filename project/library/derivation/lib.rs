// Lets the derived code name `::derivation` from within this crate's own tests.
extern crate self as derivation;

pub use macros::{Elements, FromStr, Str};

/// Enumerate every variant of a fieldless enum.
pub trait Elements: Sized {
    type Iter: Iterator<Item = Self> + Clone;

    fn elements() -> Self::Iter;
}

#[cfg(test)]
mod test;
