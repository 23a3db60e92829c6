use crate::{Diagnostic, Engine, Mode, Policy, Severity, UntaggedDiagnostic};
use span::{Location, SourceMap, span};
use std::{cell::RefCell, rc::Rc};
use utility::assert_text_eq;

fn engine(policy: Policy) -> Engine {
    Engine::new(policy, Rc::default())
}

fn diagnostic(severity: Severity, class: &'static str) -> UntaggedDiagnostic {
    UntaggedDiagnostic::new(severity, class, format!("a {} of class {class}", severity.name()))
}

#[track_caller]
fn assert_severities(diagnostics: &[UntaggedDiagnostic], expected: &[Severity]) {
    let actual: Vec<_> = diagnostics.iter().map(|diagnostic| diagnostic.severity).collect();
    assert_eq!(actual, expected);
}

#[test]
fn default_policy_files_everything_as_active() {
    let engine = engine(Policy::default());

    engine.throw(diagnostic(Severity::Info, "a"));
    engine.throw(diagnostic(Severity::Warning, "b"));

    assert_severities(&engine.active(), &[Severity::Info, Severity::Warning]);
    assert!(engine.suppressed().is_empty());
    assert!(!engine.errors_encountered());

    engine.throw(diagnostic(Severity::Error, "c"));

    assert!(engine.errors_encountered());
}

#[test]
fn info_escalates_to_warning() {
    let engine = engine(Policy {
        info: Mode::IncreasedPriority,
        ..Policy::default()
    });

    engine.throw(diagnostic(Severity::Info, "constant-condition"));

    assert_severities(&engine.active(), &[Severity::Warning]);
    assert!(!engine.errors_encountered());
}

#[test]
fn escalation_composes_from_info_to_error() {
    let engine = engine(Policy {
        info: Mode::IncreasedPriority,
        warning: Mode::IncreasedPriority,
        ..Policy::default()
    });

    engine.throw(diagnostic(Severity::Info, "implicit-conversion"));

    assert_severities(&engine.active(), &[Severity::Error]);
    assert!(engine.errors_encountered());
}

#[test]
fn warnings_as_errors_leave_infos_alone() {
    let engine = engine(Policy {
        warning: Mode::IncreasedPriority,
        ..Policy::default()
    });

    engine.throw(diagnostic(Severity::Info, "x"));
    engine.throw(diagnostic(Severity::Warning, "y"));

    assert_severities(&engine.active(), &[Severity::Info, Severity::Error]);
}

#[test]
fn suppressed_info_mode_suppresses_infos_and_warnings() {
    let engine = engine(Policy {
        info: Mode::Suppressed,
        ..Policy::default()
    });

    engine.throw(diagnostic(Severity::Info, "a"));
    engine.throw(diagnostic(Severity::Warning, "b"));
    engine.throw(diagnostic(Severity::Error, "c"));

    assert_severities(&engine.suppressed(), &[Severity::Info, Severity::Warning]);
    assert_severities(&engine.active(), &[Severity::Error]);
}

#[test]
fn suppressed_class_wins_over_default_warning_mode() {
    let engine = engine(Policy {
        suppressed_classes: ["unused-variable".into()].into_iter().collect(),
        ..Policy::default()
    });

    engine.throw(diagnostic(Severity::Warning, "unused-variable"));
    engine.throw(diagnostic(Severity::Error, "unused-variable"));
    engine.throw(diagnostic(Severity::Warning, "deprecated"));

    assert_severities(&engine.suppressed(), &[Severity::Warning]);
    assert_severities(&engine.active(), &[Severity::Error, Severity::Warning]);
    assert_eq!(engine.active()[1].class, "deprecated");
}

#[test]
fn escalated_errors_are_never_suppressed_by_class() {
    let engine = engine(Policy {
        warning: Mode::IncreasedPriority,
        suppressed_classes: ["deprecated".into()].into_iter().collect(),
        ..Policy::default()
    });

    engine.throw(diagnostic(Severity::Warning, "deprecated"));

    assert_severities(&engine.active(), &[Severity::Error]);
    assert!(engine.suppressed().is_empty());
}

#[test]
fn restoration_point_discards_later_diagnostics() {
    let engine = engine(Policy {
        info: Mode::Suppressed,
        ..Policy::default()
    });

    engine.throw(diagnostic(Severity::Warning, "a"));
    engine.throw(diagnostic(Severity::Info, "b"));
    engine.throw(diagnostic(Severity::Info, "c"));

    let active = engine.active().to_vec();
    let suppressed = engine.suppressed().to_vec();
    let point = engine.create_restoration_point();

    engine.throw(diagnostic(Severity::Error, "d"));
    engine.throw(diagnostic(Severity::Warning, "e"));
    assert!(engine.errors_encountered());

    engine.load_restoration_point(point);

    assert_eq!(*engine.active(), *active);
    assert_eq!(*engine.suppressed(), *suppressed);
    assert!(!engine.errors_encountered());
}

#[test]
fn restoration_point_on_an_empty_engine() {
    let engine = engine(Policy::default());
    let point = engine.create_restoration_point();

    Diagnostic::error().class("x").message("speculative").report(&engine);
    engine.load_restoration_point(point);

    assert!(engine.active().is_empty());
    assert!(!engine.errors_encountered());
}

#[test]
fn clear_resets_everything() {
    let engine = engine(Policy {
        info: Mode::Suppressed,
        ..Policy::default()
    });

    engine.throw(diagnostic(Severity::Error, "a"));
    engine.throw(diagnostic(Severity::Info, "b"));
    engine.clear();

    assert!(engine.active().is_empty());
    assert!(engine.suppressed().is_empty());
    assert!(!engine.errors_encountered());
}

#[test]
fn display_renders_active_diagnostics_and_summary() {
    let map = Rc::new(RefCell::new(SourceMap::default()));
    let file = map.borrow_mut().add_str("break;\n");
    let engine = Engine::new(Policy::default(), map);

    Diagnostic::error()
        .class("break-outside-loop")
        .message("‘break’ outside of a loop or switch")
        .at(Location::new(file, span(0, 5)))
        .report(&engine);
    Diagnostic::warning().class("io").message("disk is almost full").report(&engine);
    Diagnostic::warning().class("io").message("disk is full").report(&engine);

    assert_text_eq(
        &engine.display_to_string(),
        "\
⟨anonymous⟩:1:1: error[break-outside-loop]: ‘break’ outside of a loop or switch
break;
^

warning[io]: disk is almost full

warning[io]: disk is full

1 error and 2 warnings emitted
",
    );
}

#[test]
fn display_shows_suppressed_diagnostics_on_request() {
    let mut engine = engine(Policy {
        suppressed_classes: ["unused-variable".into()].into_iter().collect(),
        ..Policy::default()
    });

    Diagnostic::warning().class("unused-variable").message("unused variable ‘x’").report(&engine);

    assert_text_eq(&engine.display_to_string(), "0 errors and 0 warnings emitted\n");

    engine.set_policy(Policy {
        show_suppressed: true,
        ..engine.policy().clone()
    });

    assert_text_eq(
        &engine.display_to_string(),
        "\
suppressed diagnostics:
warning[unused-variable]: unused variable ‘x’

0 errors and 0 warnings emitted
",
    );
}
