//! Named, grouped record predicates.

use std::fmt;
use std::rc::Rc;

/// A shared record predicate.
pub type Predicate<T> = Rc<dyn Fn(&T) -> bool>;

/// A filter applied to the records of a results controller.
///
/// The title is informational only (useful when letting users pick filters).
/// The group makes filters mutually exclusive: adding a filter replaces any
/// active filter of the same group. Filters without a group never replace
/// each other.
///
/// Two filters are equal when their titles and groups are equal and they
/// share the same predicate allocation. Cloning a filter keeps it equal to
/// the original; building a second filter from an identical closure does
/// not.
pub struct Filter<T> {
    title: Option<String>,
    group: Option<String>,
    predicate: Predicate<T>,
}

impl<T> Filter<T> {
    /// Creates an untitled, ungrouped filter.
    #[must_use]
    pub fn new(predicate: impl Fn(&T) -> bool + 'static) -> Self {
        Self {
            title: None,
            group: None,
            predicate: Rc::new(predicate),
        }
    }

    /// Creates a filter with a title and group.
    #[must_use]
    pub fn with_title(
        title: impl Into<String>,
        group: impl Into<String>,
        predicate: impl Fn(&T) -> bool + 'static,
    ) -> Self {
        Self {
            title: Some(title.into()),
            group: Some(group.into()),
            predicate: Rc::new(predicate),
        }
    }

    /// Creates a filter from an existing shared predicate.
    #[must_use]
    pub fn from_predicate(predicate: Predicate<T>) -> Self {
        Self {
            title: None,
            group: None,
            predicate,
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the group.
    #[must_use]
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn predicate(&self) -> &Predicate<T> {
        &self.predicate
    }

    /// Returns true if the record passes this filter.
    pub fn matches(&self, record: &T) -> bool {
        (self.predicate)(record)
    }

    /// Returns true if both filters have the same non-`None` group.
    pub fn shares_group_with(&self, other: &Self) -> bool {
        self.group.is_some() && self.group == other.group
    }
}

impl<T> Clone for Filter<T> {
    fn clone(&self) -> Self {
        Self {
            title: self.title.clone(),
            group: self.group.clone(),
            predicate: Rc::clone(&self.predicate),
        }
    }
}

impl<T> PartialEq for Filter<T> {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title
            && self.group == other.group
            && Rc::ptr_eq(&self.predicate, &other.predicate)
    }
}

impl<T> Eq for Filter<T> {}

impl<T> fmt::Debug for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("title", &self.title)
            .field("group", &self.group)
            .finish_non_exhaustive()
    }
}
