//! The diagnostic engine.
//!
//! Diagnostics are constructed with a builder that is tagged with its severity
//! at the type level:
//!
//! ```ignore
//! Diagnostic::error()
//!     .class(Class::UndefinedName)
//!     .message(format!("the name {} is not defined", name.quote()))
//!     .at(location)
//!     .report(&engine)
//! ```
//!
//! Reporting an error hands back an [`ErasedReportedError`](error::ErasedReportedError)
//! which can be propagated with `?`. Every diagnostic funnels into [`Engine::throw`]
//! which decides on escalation and on the bucket the diagnostic is filed into.

use derivation::{Elements, Str};
use span::Location;
use std::marker::PhantomData;
use utility::Str;

pub use engine::{Engine, FATAL_EXIT_STATUS, Mode, Policy, RestorationPoint};
pub use render::render;

mod engine;
mod render;

pub mod error;

/// A diagnostic under construction.
#[must_use]
pub struct Diagnostic<T: Tag = tag::Error> {
    untagged: UntaggedDiagnostic,
    _tag: PhantomData<T>,
}

impl<T: Tag> Diagnostic<T> {
    fn new() -> Self {
        Self {
            untagged: UntaggedDiagnostic::new(T::SEVERITY, Str::Borrowed(""), Str::Borrowed("")),
            _tag: PhantomData,
        }
    }

    /// Add a text message describing the issue.
    ///
    /// The message should not start with an upper case letter, should not end in a period
    /// and should quote source code snippets with `‘` and `’`.
    pub fn message(mut self, message: impl Into<Str>) -> Self {
        self.untagged.message = message.into();
        self
    }

    /// Set the class used for selective suppression.
    pub fn class(mut self, class: impl Into<Str>) -> Self {
        self.untagged.class = class.into();
        self
    }

    /// Point the diagnostic at a source location.
    pub fn at(mut self, location: Location) -> Self {
        self.untagged.location = Some(location);
        self
    }

    pub fn at_optional(mut self, location: Option<Location>) -> Self {
        self.untagged.location = location;
        self
    }

    /// Add further clarifying information.
    pub fn note(mut self, message: impl Into<Str>) -> Self {
        self.untagged.subdiagnostics.push(Subdiagnostic {
            severity: Subseverity::Note,
            message: message.into(),
        });
        self
    }

    /// Add steps or tips to solve the diagnosed issue.
    pub fn help(mut self, message: impl Into<Str>) -> Self {
        self.untagged.subdiagnostics.push(Subdiagnostic {
            severity: Subseverity::Help,
            message: message.into(),
        });
        self
    }

    pub fn with(self, builder: impl FnOnce(Self) -> Self) -> Self {
        builder(self)
    }

    /// File the diagnostic with the engine.
    pub fn report(self, engine: &Engine) -> T::Output {
        engine.throw(self.untagged);
        T::witness()
    }

    pub fn untagged(self) -> UntaggedDiagnostic {
        self.untagged
    }
}

impl Diagnostic<tag::Info> {
    /// Create an advisory diagnostic.
    pub fn info() -> Self {
        Self::new()
    }
}

impl Diagnostic<tag::Warning> {
    /// Create a diagnostic for a warning.
    pub fn warning() -> Self {
        Self::new()
    }
}

impl Diagnostic<tag::Error> {
    /// Create a diagnostic for a user error.
    pub fn error() -> Self {
        Self::new()
    }
}

impl Diagnostic<tag::Fatal> {
    /// Create a diagnostic for an unrecoverable internal failure.
    ///
    /// Reporting it terminates the process.
    pub fn fatal() -> Self {
        Self::new()
    }
}

/// Type-level severities of [`Diagnostic`]s.
pub mod tag {
    use crate::{Severity, error::ErasedReportedError};
    use std::convert::Infallible;

    pub struct Info;
    pub struct Warning;
    pub struct Error;
    pub struct Fatal;

    pub trait Tag {
        const SEVERITY: Severity;

        /// What reporting a diagnostic of this severity evaluates to.
        type Output;

        fn witness() -> Self::Output;
    }

    impl Tag for Info {
        const SEVERITY: Severity = Severity::Info;
        type Output = ();

        fn witness() {}
    }

    impl Tag for Warning {
        const SEVERITY: Severity = Severity::Warning;
        type Output = ();

        fn witness() {}
    }

    impl Tag for Error {
        const SEVERITY: Severity = Severity::Error;
        type Output = ErasedReportedError;

        fn witness() -> ErasedReportedError {
            ErasedReportedError::new()
        }
    }

    impl Tag for Fatal {
        const SEVERITY: Severity = Severity::Fatal;
        type Output = Infallible;

        fn witness() -> Infallible {
            unreachable!("reporting a fatal diagnostic terminates the process")
        }
    }
}

pub use tag::Tag;

/// A diagnostic as stored by the [`Engine`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct UntaggedDiagnostic {
    pub severity: Severity,
    pub class: Str,
    pub message: Str,
    pub location: Option<Location>,
    pub subdiagnostics: Vec<Subdiagnostic>,
}

impl UntaggedDiagnostic {
    pub fn new(severity: Severity, class: impl Into<Str>, message: impl Into<Str>) -> Self {
        Self {
            severity,
            class: class.into(),
            message: message.into(),
            location: None,
            subdiagnostics: Vec::new(),
        }
    }

    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

/// Level of severity of a diagnostic.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Str)]
#[format(dash_case)]
pub enum Severity {
    /// Advisory, escalatable to a warning.
    Info,
    /// Escalatable to an error.
    Warning,
    /// A user error blocking code generation.
    Error,
    /// An internal compiler error. Rendered immediately, then the process exits.
    Fatal,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Subdiagnostic {
    pub severity: Subseverity,
    pub message: Str,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Str)]
#[format(dash_case)]
pub enum Subseverity {
    Note,
    Help,
}

/// The diagnostic classes emitted by the compiler.
///
/// Classes are plain strings to the engine. This enum merely
/// catalogs the ones in use so they can be listed and not misspelled.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Str, Elements)]
#[format(dash_case)]
pub enum Class {
    ArgumentCount,
    AssertionFailed,
    BreakOutsideLoop,
    CaseOutsideSwitch,
    ConflictingRegister,
    ConstantCondition,
    ContinueOutsideLoop,
    Deprecated,
    DuplicateAttribute,
    DuplicateCase,
    DuplicateDefinition,
    DuplicateLabel,
    ImplicitConversion,
    InitializerCount,
    InternalError,
    InvalidAttributeArgument,
    InvalidCast,
    InvalidInitializer,
    Io,
    Lexical,
    MissingReturnValue,
    NotAssignable,
    NotCallable,
    ReferenceKindMismatch,
    Syntax,
    TypeMismatch,
    TypeTooLarge,
    UndefinedLabel,
    UndefinedName,
    UnexpectedReturnValue,
    UnknownRegister,
    UnresolvedInclude,
    UnsupportedExpression,
    UnusedAttribute,
    UnusedVariable,
}

impl From<Class> for Str {
    fn from(class: Class) -> Self {
        Str::Borrowed(class.name())
    }
}

#[cfg(test)]
mod test;
