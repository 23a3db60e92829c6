use crate::{Index, IndexMap};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Key(u16);

impl Index for Key {
    fn new(index: usize) -> Self {
        Self(index.try_into().unwrap())
    }

    fn value(self) -> usize {
        self.0.into()
    }
}

#[test]
fn indices_are_handed_out_in_insertion_order() {
    let mut map = IndexMap::<Key, &str>::new();

    let alpha = map.insert("alpha");
    let beta = map.insert("beta");

    assert_eq!(alpha, Key(0));
    assert_eq!(beta, Key(1));
    assert_eq!(map[beta], "beta");
    assert_eq!(map.last_index(), Some(Key(1)));
}

#[test]
fn insert_with_observes_own_index() {
    let mut map = IndexMap::<Key, Key>::new();
    map.insert(Key(99));

    let index = map.insert_with(|index| index);

    assert_eq!(map[index], index);
    assert_eq!(map.next_index(), Key(2));
}

#[test]
fn iteration_pairs_indices_with_values() {
    let map = IndexMap::<Key, char>::bare(vec!['x', 'y']);

    let entries: Vec<_> = map.iter().collect();

    assert_eq!(entries, [(Key(0), &'x'), (Key(1), &'y')]);
}
