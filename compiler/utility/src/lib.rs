//! Utility functionality and definitions.

use difference::{Changeset, Difference};
use std::{fmt, fmt::Write as _};

pub use atom::Atom;
pub use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
pub use smallvec::smallvec;

pub mod atom;
pub mod paint;

pub type Str = std::borrow::Cow<'static, str>;

pub type SmallVec<T, const N: usize> = smallvec::SmallVec<[T; N]>;

pub fn default<T: Default>() -> T {
    T::default()
}

/// Render the line-wise difference between two texts.
///
/// Used by golden tests to explain mismatches. Unchanged lines are prefixed
/// with a space, additions with `+` and removals with `-`.
pub fn difference(original: &str, edit: &str) -> String {
    let mut buffer = String::new();

    for difference in Changeset::new(original, edit, "\n").diffs {
        let (marker, lines) = match &difference {
            Difference::Same(lines) => (' ', lines),
            Difference::Add(lines) => ('+', lines),
            Difference::Rem(lines) => ('-', lines),
        };

        for line in lines.lines().chain(lines.is_empty().then_some("")) {
            let _ = writeln!(buffer, "{marker} {line}");
        }
    }

    buffer
}

/// Assert that two texts are equal, panicking with a line diff otherwise.
#[track_caller]
pub fn assert_text_eq(actual: &str, expected: &str) {
    if actual != expected {
        panic!(
            "the actual text differs from the expected one:\n{}",
            difference(expected, actual)
        );
    }
}

pub trait ListingExt {
    fn list(self, conjunction: Conjunction) -> String;
}

impl<I> ListingExt for I
where
    I: Iterator,
    I::Item: fmt::Display,
{
    fn list(self, conjunction: Conjunction) -> String {
        let mut this = self.peekable();
        let mut first = true;
        let mut result = String::new();

        while let Some(item) = this.next() {
            if !first {
                if this.peek().is_some() {
                    result += ", ";
                } else {
                    let _ = write!(result, " {conjunction} ");
                }
            }

            let _ = write!(result, "{item}");
            first = false;
        }

        result
    }
}

#[derive(Clone, Copy)]
pub enum Conjunction {
    And,
    Or,
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::And => "and",
            Self::Or => "or",
        })
    }
}

/// Use the singular or the plural form of the given word depending on the given amount.
///
/// # Examples
///
/// ```
/// # use utility::pluralize;
/// assert_eq!(pluralize!(1, "error"), "error");
/// assert_eq!(pluralize!(3, "warning"), "warnings");
/// ```
#[macro_export]
macro_rules! pluralize {
    ($amount:expr, $singular:literal $(,)?) => {
        match $amount {
            1 => $singular,
            _ => concat!($singular, "s"),
        }
    };
}

pub trait QuoteExt {
    fn quote(self) -> String;
}

impl<D: fmt::Display> QuoteExt for D {
    fn quote(self) -> String {
        format!("‘{self}’")
    }
}

#[cfg(test)]
mod test;
