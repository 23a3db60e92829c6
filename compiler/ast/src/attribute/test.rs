use crate::{AttributeArgument, AttributeClause, AttributeRegistry};
use diagnostics::{Engine, Policy, Severity};
use span::{Location, SourceMap, span};
use std::{cell::RefCell, rc::Rc};
use utility::{Atom, smallvec};

fn engine() -> (Engine, Location) {
    let mut map = SourceMap::default();
    let file = map.add_str("@inline @inline fn f();\n");
    let engine = Engine::new(Policy::default(), Rc::new(RefCell::new(map)));
    (engine, Location::new(file, span(0, 7)))
}

#[test]
fn duplicate_attributes_are_rejected() {
    let (engine, location) = engine();
    let registry = AttributeRegistry::new();
    let mut clause = AttributeClause::default();

    let first = registry.register(Atom::INLINE, smallvec![], location);
    let second = registry.register(Atom::INLINE, smallvec![AttributeArgument::Boolean(true)], location);

    assert!(clause.add(first, &registry, &engine).is_ok());
    assert!(clause.add(second, &registry, &engine).is_err());

    assert_eq!(clause.iter().collect::<Vec<_>>(), [first]);
    let active = engine.active();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].severity, Severity::Error);
    assert_eq!(active[0].class, "duplicate-attribute");
    assert_eq!(clause.has(Atom::INLINE, &registry), Some(smallvec![]));
}

#[test]
fn unused_attributes_are_reported_once() {
    let (engine, location) = engine();
    let registry = AttributeRegistry::new();
    let mut clause = AttributeClause::default();

    let inline = registry.register(Atom::INLINE, smallvec![], location);
    let export = registry.register(Atom::EXPORT, smallvec![], location);
    clause.add(inline, &registry, &engine).unwrap();
    clause.add(export, &registry, &engine).unwrap();

    assert_eq!(clause.has(Atom::INLINE, &registry), Some(smallvec![]));
    assert_eq!(clause.has(Atom::DEPRECATED, &registry), None);

    registry.report_unused(&engine);

    let active = engine.active();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].severity, Severity::Warning);
    assert_eq!(active[0].class, "unused-attribute");
    assert_eq!(active[0].message, "unused attribute ‘export’");
    assert_eq!(active[0].location, Some(location));
}

#[test]
fn rejected_duplicates_are_still_reported_as_unused() {
    let (engine, location) = engine();
    let registry = AttributeRegistry::new();
    let mut clause = AttributeClause::default();

    let first = registry.register(Atom::INLINE, smallvec![], location);
    let second = registry.register(Atom::INLINE, smallvec![], location);
    clause.add(first, &registry, &engine).unwrap();
    let _ = clause.add(second, &registry, &engine);
    let _ = clause.has(Atom::INLINE, &registry);

    assert!(registry.is_used(first));
    assert!(!registry.is_used(second));

    registry.report_unused(&engine);
    assert_eq!(engine.active().len(), 2);
}

#[test]
fn reset_drains_the_registry() {
    let (engine, location) = engine();
    let registry = AttributeRegistry::new();
    registry.register(Atom::EXPORT, smallvec![], location);
    assert_eq!(registry.len(), 1);

    registry.reset();

    assert!(registry.is_empty());
    registry.report_unused(&engine);
    assert!(engine.active().is_empty());
}
