//! Record identity resolution.
//!
//! Two records are "the same" logical entity either because a key extractor
//! yields equal keys for both, or, with no extractor, because the records
//! themselves compare equal. When an extractor is configured it is used
//! exclusively: records with equal keys match even if every other field
//! differs, which is what lets an updated version replace its old one.
//!
//! Lookups are linear scans and return the first match. With duplicate keys
//! (or duplicate equal records) which one is found is not guaranteed beyond
//! "the first in section order"; callers relying on anything more are on
//! their own.

use filterable_types::{Error, Position, Result};
use std::fmt;
use std::rc::Rc;

/// A shared key extractor.
pub type KeyFn<T, K> = Rc<dyn Fn(&T) -> K>;

/// Identity policy for records of type `T` with keys of type `K`.
pub struct Identity<T, K = ()> {
    key: Option<KeyFn<T, K>>,
}

impl<T, K> Clone for Identity<T, K> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
        }
    }
}

impl<T, K> fmt::Debug for Identity<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("keyed", &self.key.is_some())
            .finish()
    }
}

impl<T> Identity<T, ()> {
    /// Identity by full equality of records.
    #[must_use]
    pub fn by_equality() -> Self {
        Self { key: None }
    }
}

impl<T> Default for Identity<T, ()> {
    fn default() -> Self {
        Self::by_equality()
    }
}

impl<T, K> Identity<T, K>
where
    T: PartialEq,
    K: PartialEq,
{
    /// Identity by key equality.
    #[must_use]
    pub fn by_key(key: impl Fn(&T) -> K + 'static) -> Self {
        Self {
            key: Some(Rc::new(key)),
        }
    }

    /// Identity from an optional shared extractor.
    #[must_use]
    pub fn from_key_fn(key: Option<KeyFn<T, K>>) -> Self {
        Self { key }
    }

    /// Returns true if a key extractor is configured.
    #[must_use]
    pub fn is_keyed(&self) -> bool {
        self.key.is_some()
    }

    /// Extracts the key of a record, if an extractor is configured.
    #[must_use]
    pub fn key_of(&self, record: &T) -> Option<K> {
        self.key.as_ref().map(|key| key(record))
    }

    /// Returns true if both records denote the same entity.
    #[must_use]
    pub fn equal(&self, a: &T, b: &T) -> bool {
        match &self.key {
            Some(key) => key(a) == key(b),
            None => a == b,
        }
    }

    /// Finds the first position holding the same entity as `record`.
    #[must_use]
    pub fn position_of(&self, record: &T, sections: &[Vec<T>]) -> Option<Position> {
        find(sections, |candidate| self.equal(candidate, record))
    }

    /// Finds the first position whose record has the given key.
    ///
    /// Fails with [`Error::MissingKeyExtractor`] when identity is by
    /// equality, since there are no keys to compare.
    pub fn position_of_key(&self, wanted: &K, sections: &[Vec<T>]) -> Result<Option<Position>> {
        let key = self.key.as_ref().ok_or(Error::MissingKeyExtractor)?;
        Ok(find(sections, |candidate| key(candidate) == *wanted))
    }
}

fn find<T>(sections: &[Vec<T>], mut matches: impl FnMut(&T) -> bool) -> Option<Position> {
    sections.iter().enumerate().find_map(|(section, records)| {
        records
            .iter()
            .position(&mut matches)
            .map(|item| Position::new(section, item))
    })
}
