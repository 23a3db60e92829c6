use crate::{Elements, FromStr, Str};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Str, FromStr, Elements)]
#[format(dash_case)]
enum Mode {
    Default,
    IncreasedPriority,
    Suppressed,
}

#[derive(Str)]
#[format(snake_case)]
#[str(label)]
enum Shape {
    Circle { radius: u32 },
    UnitSquare,
}

#[test]
fn names_are_dash_cased() {
    assert_eq!(Mode::IncreasedPriority.name(), "increased-priority");
    assert_eq!(Mode::Default.name(), "default");
}

#[test]
fn parsing_accepts_exactly_the_names() {
    assert_eq!("suppressed".parse(), Ok(Mode::Suppressed));
    assert_eq!("increased-priority".parse(), Ok(Mode::IncreasedPriority));
    assert_eq!("IncreasedPriority".parse::<Mode>(), Err(()));
}

#[test]
fn elements_follow_declaration_order() {
    let elements: Vec<_> = Mode::elements().collect();

    assert_eq!(elements, [Mode::Default, Mode::IncreasedPriority, Mode::Suppressed]);
}

#[test]
fn custom_method_ignores_fields() {
    assert_eq!(Shape::Circle { radius: 3 }.label(), "circle");
    assert_eq!(Shape::UnitSquare.label(), "unit_square");
}
