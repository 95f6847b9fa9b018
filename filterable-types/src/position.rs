//! Two-component addressing into sectioned collections.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A (section, item) address.
///
/// Raw and visible (filtered) collections have independent address spaces;
/// a position obtained from one must not be used against the other.
///
/// Ordering is lexicographic: by section, then by item.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    /// Index of the section.
    pub section: usize,
    /// Index of the item within its section.
    pub item: usize,
}

impl Position {
    /// Creates a position from a section and item index.
    #[must_use]
    pub const fn new(section: usize, item: usize) -> Self {
        Self { section, item }
    }

    /// Creates a position in the first (and, for flat data, only) section.
    #[must_use]
    pub const fn item(item: usize) -> Self {
        Self { section: 0, item }
    }

    /// Returns this position with the section forced to zero.
    ///
    /// Flat collections ignore the section component of supplied positions.
    #[must_use]
    pub const fn flattened(self) -> Self {
        Self {
            section: 0,
            item: self.item,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.section, self.item)
    }
}

impl From<(usize, usize)> for Position {
    fn from((section, item): (usize, usize)) -> Self {
        Self { section, item }
    }
}
