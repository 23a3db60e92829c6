//! Error handling mechanisms.

/// A witness that an error diagnostic has been filed.
///
/// Only obtainable by reporting a [`Diagnostic`](crate::Diagnostic) of error severity.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ErasedReportedError(());

impl ErasedReportedError {
    pub(crate) const fn new() -> Self {
        Self(())
    }

    /// Obtain a witness for errors known to have been filed elsewhere.
    pub const fn new_unchecked() -> Self {
        Self(())
    }
}

pub type Result<T = (), E = ErasedReportedError> = std::result::Result<T, E>;

/// Whether a computation that recovers from errors encountered any.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[must_use]
pub enum Health {
    #[default]
    Untainted,
    Tainted(ErasedReportedError),
}

impl Health {
    pub fn taint(&mut self, error: ErasedReportedError) {
        if *self == Self::Untainted {
            *self = Self::Tainted(error);
        }
    }

    pub fn is_tainted(self) -> bool {
        matches!(self, Self::Tainted(_))
    }

    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::Untainted, Self::Untainted) => Self::Untainted,
            (Self::Tainted(error), _) | (_, Self::Tainted(error)) => Self::Tainted(error),
        }
    }
}

impl From<Result> for Health {
    fn from(result: Result) -> Self {
        match result {
            Ok(()) => Self::Untainted,
            Err(error) => Self::Tainted(error),
        }
    }
}

impl From<Health> for Result {
    fn from(health: Health) -> Self {
        match health {
            Health::Untainted => Ok(()),
            Health::Tainted(error) => Err(error),
        }
    }
}

/// A value together with the health of the computation that produced it.
#[derive(Debug)]
#[must_use]
pub struct Outcome<T> {
    pub bare: T,
    pub health: Health,
}

impl<T> Outcome<T> {
    pub const fn new(bare: T, health: Health) -> Self {
        Self { bare, health }
    }

    pub const fn untainted(bare: T) -> Self {
        Self::new(bare, Health::Untainted)
    }

    /// Merge the health into the given one and hand out the value.
    pub fn stain(self, health: &mut Health) -> T {
        *health = health.and(self.health);
        self.bare
    }
}

impl<T> From<Outcome<T>> for Result<T> {
    fn from(outcome: Outcome<T>) -> Self {
        match outcome.health {
            Health::Untainted => Ok(outcome.bare),
            Health::Tainted(error) => Err(error),
        }
    }
}
