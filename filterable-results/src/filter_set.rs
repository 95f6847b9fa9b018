//! The ordered set of active filters.

use crate::Filter;
use filterable_types::Sections;
use std::fmt;

/// Active filters, in the order they were added.
///
/// A record is visible when every filter accepts it. At most one filter per
/// group is active at a time.
pub struct FilterSet<T> {
    filters: Vec<Filter<T>>,
}

impl<T> Default for FilterSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for FilterSet<T> {
    fn clone(&self) -> Self {
        Self {
            filters: self.filters.clone(),
        }
    }
}

impl<T> fmt::Debug for FilterSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.filters).finish()
    }
}

impl<T> FilterSet<T> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Adds a filter, replacing any active filter in the same group.
    ///
    /// The new filter is appended at the end. Returns the replaced filter.
    pub fn add(&mut self, filter: Filter<T>) -> Option<Filter<T>> {
        let replaced = self
            .filters
            .iter()
            .position(|existing| existing.shares_group_with(&filter))
            .map(|index| self.filters.remove(index));
        self.filters.push(filter);
        replaced
    }

    /// Adds each filter in order.
    pub fn add_all(&mut self, filters: impl IntoIterator<Item = Filter<T>>) {
        for filter in filters {
            self.add(filter);
        }
    }

    /// Removes an equal filter. Returns true if one was removed.
    pub fn remove(&mut self, filter: &Filter<T>) -> bool {
        match self.filters.iter().position(|existing| existing == filter) {
            Some(index) => {
                self.filters.remove(index);
                true
            }
            None => false,
        }
    }

    /// Clears the set, then adds each filter in order.
    pub fn replace_all(&mut self, filters: impl IntoIterator<Item = Filter<T>>) {
        self.filters.clear();
        self.add_all(filters);
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Filter<T>> {
        self.filters.iter()
    }

    pub fn filters(&self) -> &[Filter<T>] {
        &self.filters
    }

    /// Returns true if every active filter accepts the record.
    pub fn matches(&self, record: &T) -> bool {
        self.filters.iter().all(|filter| filter.matches(record))
    }

    /// Computes the visible projection of `sections`.
    ///
    /// With no active filters the result is a plain copy. Otherwise each
    /// section keeps, in order, the records every filter accepts, and
    /// sections left empty are kept only if `retain_empty` is set.
    pub fn apply(&self, sections: &[Vec<T>], retain_empty: bool) -> Sections<T>
    where
        T: Clone,
    {
        if self.filters.is_empty() {
            return sections.to_vec();
        }
        sections
            .iter()
            .map(|section| {
                section
                    .iter()
                    .filter(|record| self.matches(record))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .filter(|section| retain_empty || !section.is_empty())
            .collect()
    }
}
