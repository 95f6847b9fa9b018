//! Flattening of arbitrarily nested ordered data.

use filterable_types::Collection;

/// An ordered tree of records: either a record or a list of further nodes.
///
/// Ownership makes cyclic structures unrepresentable, so flattening always
/// terminates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Nested<T> {
    Item(T),
    List(Vec<Nested<T>>),
}

impl<T> Nested<T> {
    /// Flattens this node depth-first, left to right.
    #[must_use]
    pub fn into_flat(self) -> Vec<T> {
        let mut out = Vec::new();
        // Stack of pending siblings, deepest list on top.
        let mut stack = vec![vec![self].into_iter()];
        while let Some(top) = stack.last_mut() {
            match top.next() {
                Some(Nested::Item(record)) => out.push(record),
                Some(Nested::List(children)) => stack.push(children.into_iter()),
                None => {
                    stack.pop();
                }
            }
        }
        out
    }
}

impl<T> From<Collection<T>> for Nested<T> {
    fn from(collection: Collection<T>) -> Self {
        match collection {
            Collection::Flat(records) => Nested::List(records.into_iter().map(Nested::Item).collect()),
            Collection::Sectioned(sections) => Nested::List(
                sections
                    .into_iter()
                    .map(|section| Nested::List(section.into_iter().map(Nested::Item).collect()))
                    .collect(),
            ),
        }
    }
}

/// Flattens a list of nested nodes into one list, depth-first, left to right.
#[must_use]
pub fn flatten<T: Clone>(nodes: &[Nested<T>]) -> Vec<T> {
    Nested::List(nodes.to_vec()).into_flat()
}
