use crate::{Severity, UntaggedDiagnostic, render::render};
use derivation::{Elements, FromStr, Str};
use log::{debug, trace};
use span::SourceMap;
use std::{
    cell::{Ref, RefCell},
    io::{self, Write},
    rc::Rc,
};
use utility::{
    HashSet, Str, pluralize,
    paint::{ColorChoice, Effects, Painter, epaint, paint_to_string},
};

#[cfg(test)]
mod test;

/// The exit status of the process after a fatal diagnostic.
pub const FATAL_EXIT_STATUS: i32 = 101;

/// The sink for every diagnostic of a compilation.
///
/// Diagnostics are filed into one of two buckets, *active* and *suppressed*,
/// once at the time they are thrown. Nothing is rendered until [`Self::display`]
/// except for fatal diagnostics which are rendered right away before the
/// process is terminated.
pub struct Engine {
    policy: Policy,
    color: ColorChoice,
    buckets: RefCell<Buckets>,
    map: Rc<RefCell<SourceMap>>,
}

#[derive(Default)]
struct Buckets {
    active: Vec<UntaggedDiagnostic>,
    suppressed: Vec<UntaggedDiagnostic>,
    errors_encountered: bool,
}

impl Engine {
    pub fn new(policy: Policy, map: Rc<RefCell<SourceMap>>) -> Self {
        Self {
            policy,
            color: ColorChoice::Auto,
            buckets: RefCell::default(),
            map,
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn set_policy(&mut self, policy: Policy) {
        self.policy = policy;
    }

    /// File a diagnostic.
    ///
    /// The severity is escalated first according to the policy. Fatal diagnostics are
    /// rendered to stderr and terminate the process.
    pub fn throw(&self, mut diagnostic: UntaggedDiagnostic) {
        let severity = self.policy.escalate(diagnostic.severity);

        if severity != diagnostic.severity {
            trace!(
                "escalated {} {:?} to {}",
                diagnostic.severity.name(),
                diagnostic.class,
                severity.name(),
            );
            diagnostic.severity = severity;
        }

        if severity == Severity::Fatal {
            self.abort(&diagnostic);
        }

        let mut buckets = self.buckets.borrow_mut();

        if self.policy.suppresses(&diagnostic) {
            trace!("suppressed {} {:?}", severity.name(), diagnostic.class);
            buckets.suppressed.push(diagnostic);
        } else {
            trace!("filed {} {:?}", severity.name(), diagnostic.class);
            buckets.errors_encountered |= severity == Severity::Error;
            buckets.active.push(diagnostic);
        }
    }

    fn abort(&self, diagnostic: &UntaggedDiagnostic) -> ! {
        // The map might be mutably borrowed if the failure happened while loading a file.
        let map = self.map.try_borrow().ok();
        let _ = epaint(|painter| render(diagnostic, map.as_deref(), painter), self.color);

        std::process::exit(FATAL_EXIT_STATUS)
    }

    /// Whether an error has been filed into the active bucket.
    pub fn errors_encountered(&self) -> bool {
        self.buckets.borrow().errors_encountered
    }

    pub fn active(&self) -> Ref<'_, [UntaggedDiagnostic]> {
        Ref::map(self.buckets.borrow(), |buckets| buckets.active.as_slice())
    }

    pub fn suppressed(&self) -> Ref<'_, [UntaggedDiagnostic]> {
        Ref::map(self.buckets.borrow(), |buckets| buckets.suppressed.as_slice())
    }

    /// Capture the current state of the buckets.
    pub fn create_restoration_point(&self) -> RestorationPoint {
        let buckets = self.buckets.borrow();

        RestorationPoint {
            active: buckets.active.len(),
            suppressed: buckets.suppressed.len(),
            errors_encountered: buckets.errors_encountered,
        }
    }

    /// Discard every diagnostic filed since the given point was created.
    pub fn load_restoration_point(&self, point: RestorationPoint) {
        let mut buckets = self.buckets.borrow_mut();

        debug!(
            "discarding {} active and {} suppressed diagnostics",
            buckets.active.len().saturating_sub(point.active),
            buckets.suppressed.len().saturating_sub(point.suppressed),
        );

        buckets.active.truncate(point.active);
        buckets.suppressed.truncate(point.suppressed);
        buckets.errors_encountered = point.errors_encountered;
    }

    /// Reset the engine for a fresh compilation unit.
    pub fn clear(&self) {
        *self.buckets.borrow_mut() = Buckets::default();
    }

    /// Render every active diagnostic, the suppressed ones if requested, and a summary.
    pub fn display(&self, painter: &mut Painter) -> io::Result<()> {
        let map = self.map.borrow();
        let buckets = self.buckets.borrow();

        for diagnostic in &buckets.active {
            render(diagnostic, Some(&map), painter)?;
            writeln!(painter)?;
        }

        if self.policy.show_suppressed && !buckets.suppressed.is_empty() {
            painter.paint(Effects::BOLD, "suppressed diagnostics:")?;
            writeln!(painter)?;

            for diagnostic in &buckets.suppressed {
                render(diagnostic, Some(&map), painter)?;
                writeln!(painter)?;
            }
        }

        let errors = count(&buckets.active, Severity::Error);
        // Suppressed *errors* count towards the warnings. Errors are never filed as
        // suppressed, so currently this adds nothing.
        let warnings =
            count(&buckets.active, Severity::Warning) + count(&buckets.suppressed, Severity::Error);

        writeln!(
            painter,
            "{errors} {} and {warnings} {} emitted",
            pluralize!(errors, "error"),
            pluralize!(warnings, "warning"),
        )
    }

    /// Display into a string without colors.
    pub fn display_to_string(&self) -> String {
        paint_to_string(|painter| self.display(painter), ColorChoice::Never)
    }

    /// Display to stderr.
    pub fn display_to_stderr(&self) -> io::Result<()> {
        epaint(|painter| self.display(painter), self.color)
    }
}

fn count(diagnostics: &[UntaggedDiagnostic], severity: Severity) -> usize {
    diagnostics
        .iter()
        .filter(|diagnostic| diagnostic.severity == severity)
        .count()
}

/// A checkpoint of the [`Engine`] buckets.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RestorationPoint {
    active: usize,
    suppressed: usize,
    errors_encountered: bool,
}

/// How diagnostics of a certain severity are treated.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Str, FromStr, Elements)]
#[format(dash_case)]
pub enum Mode {
    #[default]
    Default,
    /// Promote to the next higher severity.
    IncreasedPriority,
    /// File into the suppressed bucket.
    Suppressed,
}

#[derive(Clone, Default, Debug)]
pub struct Policy {
    pub info: Mode,
    pub warning: Mode,
    pub suppressed_classes: HashSet<Str>,
    pub show_suppressed: bool,
}

impl Policy {
    /// Apply the escalation rules.
    ///
    /// An info can become a warning and then an error within the same call.
    pub fn escalate(&self, mut severity: Severity) -> Severity {
        if severity == Severity::Info && self.info == Mode::IncreasedPriority {
            severity = Severity::Warning;
        }

        if severity == Severity::Warning && self.warning == Mode::IncreasedPriority {
            severity = Severity::Error;
        }

        severity
    }

    /// Whether an already escalated diagnostic belongs into the suppressed bucket.
    pub fn suppresses(&self, diagnostic: &UntaggedDiagnostic) -> bool {
        let suppressed_by_mode = match diagnostic.severity {
            Severity::Info => self.info == Mode::Suppressed,
            Severity::Warning => self.info == Mode::Suppressed || self.warning == Mode::Suppressed,
            Severity::Error | Severity::Fatal => return false,
        };

        suppressed_by_mode || self.suppressed_classes.contains(&diagnostic.class)
    }
}
