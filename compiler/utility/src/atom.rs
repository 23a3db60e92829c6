//! Interned strings.
//!
//! Identifiers, attribute names and register names are compared far more
//! often than they are created, so they are interned once and passed around
//! as a `u32`.

use crate::HashMap;
use index_map::{Index, IndexMap};
use std::{
    fmt,
    sync::{LazyLock, Mutex, MutexGuard, PoisonError},
};

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Atom(u32);

impl Atom {
    pub fn to_str(self) -> &'static str {
        Interner::the().get(self)
    }
}

impl From<&str> for Atom {
    fn from(value: &str) -> Self {
        Interner::the().intern_borrowed(value)
    }
}

impl From<String> for Atom {
    fn from(value: String) -> Self {
        Interner::the().intern_owned(value)
    }
}

impl Index for Atom {
    fn new(index: usize) -> Self {
        match index.try_into() {
            Ok(index) => Self(index),
            Err(_) => panic!("too many atoms"),
        }
    }

    fn value(self) -> usize {
        self.0 as _
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_str())
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

// No `Ord` on purpose: ordering by index is meaningless and ordering by
// content should be spelled out via `Atom::to_str`.

struct Interner {
    atoms: HashMap<&'static str, Atom>,
    strings: IndexMap<Atom, &'static str>,
}

impl Interner {
    fn the() -> MutexGuard<'static, Self> {
        static SELF: LazyLock<Mutex<Interner>> = LazyLock::new(|| Mutex::new(Interner::new()));

        // The interner is never left in an inconsistent state, so a poisoned lock is still usable.
        SELF.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with(values: &[&'static str]) -> Self {
        let mut this = Self {
            atoms: HashMap::default(),
            strings: IndexMap::with_capacity(values.len()),
        };

        for &value in values {
            this.insert(value);
        }

        this
    }

    fn intern_borrowed(&mut self, value: &str) -> Atom {
        if let Some(&atom) = self.atoms.get(value) {
            return atom;
        }

        self.insert(Box::leak(Box::from(value)))
    }

    fn intern_owned(&mut self, value: String) -> Atom {
        if let Some(&atom) = self.atoms.get(&*value) {
            return atom;
        }

        self.insert(String::leak(value))
    }

    fn insert(&mut self, value: &'static str) -> Atom {
        let atom = self.strings.insert(value);
        self.atoms.insert(value, atom);
        atom
    }

    fn get(&self, atom: Atom) -> &'static str {
        self.strings[atom]
    }
}

macro_rules! atoms {
    ($( $atom:ident => $string:literal ),* $(,)?) => {
        #[allow(non_camel_case_types, clippy::upper_case_acronyms)]
        #[repr(u32)]
        enum Predefined { $( $atom ),* }

        impl Atom {
            $( pub const $atom: Self = Self(Predefined::$atom as u32); )*
        }

        impl Interner {
            fn new() -> Self {
                Self::with(&[ $( $string ),* ])
            }
        }
    };
}

atoms! {
    DEPRECATED => "deprecated",
    EXPORT => "export",
    FP => "fp",
    INLINE => "inline",
    SP => "sp",
    UNUSED => "unused",
}

#[cfg(test)]
mod test;
