use super::{FileName, Position, SourceMap};
use crate::{ByteIndex, span};

fn position(line: u32, column: u32) -> Position {
    Position { line, column }
}

#[test]
fn offsets_map_to_lines_and_columns() {
    let mut map = SourceMap::default();
    let file = map.add_str("fn main() {\n    return;\n}\n");
    let file = &map[file];

    assert_eq!(file.position(ByteIndex::new(0)), position(1, 1));
    assert_eq!(file.position(ByteIndex::new(3)), position(1, 4));
    assert_eq!(file.position(ByteIndex::new(16)), position(2, 5));
    assert_eq!(file.position(ByteIndex::new(24)), position(3, 1));
}

#[test]
fn columns_count_characters_not_bytes() {
    let mut map = SourceMap::default();
    let file = map.add_str("var ä = 'ö';");
    let file = &map[file];

    // `=` sits at byte 7 but is the seventh character.
    assert_eq!(file.position(ByteIndex::new(7)), position(1, 7));
}

#[test]
fn offsets_past_the_end_are_clamped() {
    let mut map = SourceMap::default();
    let file = map.add_str("ab\ncd");

    assert_eq!(map[file].position(ByteIndex::new(99)), position(2, 3));
}

#[test]
fn lines_exclude_their_terminator() {
    let mut map = SourceMap::default();
    let file = map.add_str("first\r\nsecond\nthird");
    let file = &map[file];

    assert_eq!(file.line(1), Some("first"));
    assert_eq!(file.line(2), Some("second"));
    assert_eq!(file.line(3), Some("third"));
    assert_eq!(file.line(0), None);
    assert_eq!(file.line(4), None);
    assert_eq!(file.line_count(), 3);
}

#[test]
fn snippets_and_names() {
    let mut map = SourceMap::default();
    let file = map.add(FileName::Path("lib.food".into()), "include \"x.food\";");

    assert_eq!(map.snippet(file, span(0, 7)), "include");
    assert_eq!(map[file].name().to_string(), "lib.food");
    assert_eq!(map.len(), 1);
}
